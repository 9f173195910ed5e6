//! camscreen: capture-screen logic for camera apps, packaged as a Tauri plugin
//!
//! This crate drives a full-screen camera view: permission gating, live
//! preview, photo and video capture from a single shutter, pinch zoom,
//! tap-to-focus, code scanning and a review step that can upload the captured
//! asset. The native camera and permission APIs sit behind the
//! [`CameraBackend`] and [`PermissionProvider`] traits.
//!
//! # Features
//! - Explicit screen state machine with at most one capture in flight
//! - Pinch gesture to zoom mapping clamped to device bounds
//! - Flash, HDR, frame rate, shutter sound and lens toggles
//! - Review view with upload through a pluggable [`UploadSink`]
//! - TOML configuration with environment overrides
//!
//! # Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! camscreen = "0.1"
//! tauri = { version = "2.0", features = ["protocol-asset"] }
//! ```
//!
//! Then in your Tauri app:
//! ```rust,ignore
//! use std::sync::Arc;
//! use camscreen::{ScreenHost, SystemPermissions};
//!
//! fn main() {
//!     let host = ScreenHost::new(Arc::new(MyNativeCamera::new()), Arc::new(SystemPermissions));
//!     tauri::Builder::default()
//!         .plugin(camscreen::init(host))
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
pub mod backend;
pub mod commands;
pub mod config;
pub mod controls;
pub mod errors;
pub mod permissions;
pub mod review;
pub mod screen;
pub mod session;
pub mod types;
pub mod zoom;

// Testing utilities - fakes and synthetic devices for offline testing
pub mod testing;

// Re-exports for convenience
pub use backend::{CameraBackend, EventSink, PhotoOptions, RecordingOptions, ScreenEvent};
pub use commands::ScreenHost;
pub use config::ScreenConfig;
pub use controls::{ControlAction, Toolbar};
pub use errors::CameraError;
pub use permissions::{PermissionProvider, SystemPermissions};
pub use review::{DirectorySink, ReviewView, UploadSink};
pub use screen::{CameraScreen, ScreenSnapshot, ScreenState, ShutterOutcome};
pub use session::{CameraConfiguration, CaptureSession};
pub use types::{
    CameraDevice, CameraFormat, CaptureMode, CapturedAsset, DevicePosition, FlashMode,
    PhotoFile, VideoFile,
};
pub use zoom::{ZoomBounds, ZoomGesture};

use tauri::{
    plugin::{Builder, TauriPlugin},
    Runtime,
};

/// Initialize the camscreen plugin with all commands
pub fn init<R: Runtime>(host: ScreenHost) -> TauriPlugin<R> {
    commands::install_host(host);

    Builder::new("camscreen")
        .invoke_handler(tauri::generate_handler![
            // Screen lifecycle commands
            commands::screen::open_camera_screen,
            commands::screen::close_camera_screen,
            commands::screen::list_camera_screens,
            commands::screen::get_screen_snapshot,
            commands::screen::request_screen_permissions,
            commands::screen::refresh_screen_permissions,
            commands::screen::wait_for_screen_event,
            // Capture and review commands
            commands::capture::press_shutter,
            commands::capture::long_press_shutter,
            commands::capture::dismiss_review,
            commands::capture::upload_review,
            // Control and gesture commands
            commands::controls::apply_control,
            commands::controls::begin_pinch,
            commands::controls::update_pinch,
            commands::controls::end_pinch,
            commands::controls::tap_to_focus,
            // Configuration commands
            commands::config::get_config,
            commands::config::update_config,
            commands::config::reset_config,
            commands::config::validate_config,
            commands::config::get_camera_settings,
            commands::config::update_camera_settings,
            commands::config::get_feature_flags,
            commands::config::update_feature_flags,
        ])
        .build()
}

/// Initialize logging for the capture screen
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "camscreen=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}
