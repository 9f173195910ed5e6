//! Shutter and review commands

use super::screen::{current_host, fresh_snapshot, get_screen};
use crate::review::{DirectorySink, UploadSink};
use crate::screen::{ScreenSnapshot, ShutterOutcome};
use std::sync::Arc;
use tauri::command;

/// Shutter tap: photo while live, stop request while recording
#[command]
pub async fn press_shutter(screen_id: String) -> Result<ShutterOutcome, String> {
    let screen = get_screen(&screen_id).await?;
    let mut screen = screen.lock().await;
    screen.pump_events();

    match screen.press_shutter().await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            log::error!("Shutter press failed on {}: {}", screen_id, e);
            Err(e.to_string())
        }
    }
}

/// Shutter hold: start recording
#[command]
pub async fn long_press_shutter(screen_id: String) -> Result<ScreenSnapshot, String> {
    let screen = get_screen(&screen_id).await?;
    let mut screen = screen.lock().await;
    screen.pump_events();

    screen.long_press_shutter().await.map_err(|e| {
        log::error!("Failed to start recording on {}: {}", screen_id, e);
        e.to_string()
    })?;
    Ok(fresh_snapshot(&mut screen))
}

/// Leave the review view
#[command]
pub async fn dismiss_review(screen_id: String) -> Result<ScreenSnapshot, String> {
    let screen = get_screen(&screen_id).await?;
    let mut screen = screen.lock().await;
    screen.pump_events();
    screen.dismiss_review().map_err(|e| e.to_string())?;
    Ok(fresh_snapshot(&mut screen))
}

/// Upload the asset under review. `false` means there was nothing to upload.
#[command]
pub async fn upload_review(screen_id: String) -> Result<bool, String> {
    let screen = get_screen(&screen_id).await?;
    let mut screen = screen.lock().await;
    screen.pump_events();

    let sink: Arc<dyn UploadSink> = match current_host()?.uploader {
        Some(sink) => sink,
        None => match &screen.config().upload.directory {
            Some(dir) => Arc::new(DirectorySink::new(dir)),
            None => return Err("No upload destination configured".to_string()),
        },
    };

    screen.upload_review(sink.as_ref()).await.map_err(|e| {
        log::error!("Upload failed on {}: {}", screen_id, e);
        e.to_string()
    })
}
