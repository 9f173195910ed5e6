//! Screen lifecycle commands and the process-wide screen registry

use crate::backend::CameraBackend;
use crate::config::ScreenConfig;
use crate::permissions::PermissionProvider;
use crate::review::UploadSink;
use crate::screen::{CameraScreen, ScreenSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, RwLock as SyncRwLock};
use tauri::command;
use tokio::sync::{Mutex as AsyncMutex, RwLock};

/// Collaborators every screen opened through the plugin is wired to
#[derive(Clone)]
pub struct ScreenHost {
    pub backend: Arc<dyn CameraBackend>,
    pub permissions: Arc<dyn PermissionProvider>,
    pub uploader: Option<Arc<dyn UploadSink>>,
}

impl ScreenHost {
    pub fn new(backend: Arc<dyn CameraBackend>, permissions: Arc<dyn PermissionProvider>) -> Self {
        Self {
            backend,
            permissions,
            uploader: None,
        }
    }

    pub fn with_uploader(mut self, uploader: Arc<dyn UploadSink>) -> Self {
        self.uploader = Some(uploader);
        self
    }
}

lazy_static::lazy_static! {
    static ref SCREEN_HOST: SyncRwLock<Option<ScreenHost>> = SyncRwLock::new(None);
    static ref SCREEN_REGISTRY: Arc<RwLock<HashMap<String, Arc<AsyncMutex<CameraScreen>>>>> =
        Arc::new(RwLock::new(HashMap::new()));
}

/// Install (or replace) the collaborators used for newly opened screens
pub fn install_host(host: ScreenHost) {
    match SCREEN_HOST.write() {
        Ok(mut slot) => *slot = Some(host),
        Err(poisoned) => *poisoned.into_inner() = Some(host),
    }
    log::info!("Screen host installed");
}

pub(crate) fn current_host() -> Result<ScreenHost, String> {
    SCREEN_HOST
        .read()
        .map_err(|e| e.to_string())?
        .clone()
        .ok_or_else(|| "Screen host not installed; call camscreen::init first".to_string())
}

pub(crate) async fn get_screen(screen_id: &str) -> Result<Arc<AsyncMutex<CameraScreen>>, String> {
    let registry = SCREEN_REGISTRY.read().await;
    registry
        .get(screen_id)
        .cloned()
        .ok_or_else(|| format!("Camera screen not found: {}", screen_id))
}

/// Snapshot after applying any plugin events that arrived meanwhile
pub(crate) fn fresh_snapshot(screen: &mut CameraScreen) -> ScreenSnapshot {
    let applied = screen.pump_events();
    if applied > 0 {
        log::debug!("Applied {} pending screen events", applied);
    }
    screen.snapshot()
}

/// Open a screen and start the permission flow. Returns the screen id.
#[command]
pub async fn open_camera_screen(config: Option<ScreenConfig>) -> Result<String, String> {
    let host = current_host()?;
    let config = match config {
        Some(config) => config,
        None => super::config::current_config()?,
    };

    let mut screen = CameraScreen::new(config, host.backend, host.permissions)
        .map_err(|e| format!("Failed to open camera screen: {}", e))?;
    let state = screen.request_permissions().await.name();

    let screen_id = format!("screen_{}", uuid::Uuid::new_v4());
    log::info!("Opened camera screen {} in state {}", screen_id, state);

    let mut registry = SCREEN_REGISTRY.write().await;
    registry.insert(screen_id.clone(), Arc::new(AsyncMutex::new(screen)));
    Ok(screen_id)
}

/// Close a screen; its session and any asset reference are dropped
#[command]
pub async fn close_camera_screen(screen_id: String) -> Result<(), String> {
    let removed = SCREEN_REGISTRY.write().await.remove(&screen_id);
    match removed {
        Some(screen) => {
            // release anyone waiting for an event on this screen, including
            // a waiter that has not started polling yet
            let signal = screen.lock().await.event_signal();
            signal.notify_waiters();
            signal.notify_one();
            log::info!("Closed camera screen {}", screen_id);
            Ok(())
        }
        None => {
            let msg = format!("Camera screen not found: {}", screen_id);
            log::warn!("{}", msg);
            Err(msg)
        }
    }
}

/// List open screens
#[command]
pub async fn list_camera_screens() -> Result<Vec<String>, String> {
    let registry = SCREEN_REGISTRY.read().await;
    Ok(registry.keys().cloned().collect())
}

/// Full render state of a screen
#[command]
pub async fn get_screen_snapshot(screen_id: String) -> Result<ScreenSnapshot, String> {
    let screen = get_screen(&screen_id).await?;
    let mut screen = screen.lock().await;
    Ok(fresh_snapshot(&mut screen))
}

/// Request missing permissions again and re-evaluate readiness
#[command]
pub async fn request_screen_permissions(screen_id: String) -> Result<ScreenSnapshot, String> {
    let screen = get_screen(&screen_id).await?;
    let mut screen = screen.lock().await;
    screen.request_permissions().await;
    Ok(fresh_snapshot(&mut screen))
}

/// Re-evaluate readiness without prompting (e.g. after returning from settings)
#[command]
pub async fn refresh_screen_permissions(screen_id: String) -> Result<ScreenSnapshot, String> {
    let screen = get_screen(&screen_id).await?;
    let mut screen = screen.lock().await;
    screen.refresh_permissions();
    Ok(fresh_snapshot(&mut screen))
}

/// Wait for the next plugin event on a screen, then return the new state.
/// The screen stays unlocked while waiting so other commands (such as the
/// shutter press that stops a recording) can run.
#[command]
pub async fn wait_for_screen_event(screen_id: String) -> Result<ScreenSnapshot, String> {
    let signal = get_screen(&screen_id).await?.lock().await.event_signal();

    loop {
        signal.notified().await;

        // the screen may have been closed while we were waiting
        let screen = get_screen(&screen_id).await?;
        let mut screen = screen.lock().await;
        if screen.pump_events() > 0 {
            return Ok(screen.snapshot());
        }
        log::debug!("Woken on {} with no pending events", screen_id);
    }
}
