//! Toolbar and gesture commands

use super::screen::{fresh_snapshot, get_screen};
use crate::controls::ControlAction;
use crate::screen::ScreenSnapshot;
use crate::types::FocusPoint;
use tauri::command;

/// Apply a toolbar button press
#[command]
pub async fn apply_control(
    screen_id: String,
    action: ControlAction,
) -> Result<ScreenSnapshot, String> {
    let screen = get_screen(&screen_id).await?;
    let mut screen = screen.lock().await;
    screen.pump_events();

    if let Err(e) = screen.apply_control(action) {
        log::warn!("Control {:?} rejected on {}: {}", action, screen_id, e);
        return Err(e.to_string());
    }
    Ok(fresh_snapshot(&mut screen))
}

/// Pinch start; returns the baseline zoom
#[command]
pub async fn begin_pinch(screen_id: String) -> Result<f32, String> {
    let screen = get_screen(&screen_id).await?;
    let mut screen = screen.lock().await;
    screen.begin_pinch().map_err(|e| e.to_string())
}

/// Pinch update with the gesture's cumulative scale; returns the applied zoom
#[command]
pub async fn update_pinch(screen_id: String, scale: f32) -> Result<f32, String> {
    let screen = get_screen(&screen_id).await?;
    let mut screen = screen.lock().await;
    screen.update_pinch(scale).map_err(|e| e.to_string())
}

#[command]
pub async fn end_pinch(screen_id: String) -> Result<(), String> {
    let screen = get_screen(&screen_id).await?;
    let mut screen = screen.lock().await;
    screen.end_pinch();
    Ok(())
}

/// Tap-to-focus at normalized preview coordinates
#[command]
pub async fn tap_to_focus(screen_id: String, x: f32, y: f32) -> Result<(), String> {
    let screen = get_screen(&screen_id).await?;
    let mut screen = screen.lock().await;
    screen
        .tap_to_focus(FocusPoint::new(x, y))
        .await
        .map_err(|e| e.to_string())
}
