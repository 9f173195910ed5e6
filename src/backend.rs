//! Capture plugin seam
//!
//! [`CameraBackend`] is everything the screen needs from the native camera
//! plugin. Callback-driven completions (recording finished or failed, codes
//! scanned) come back as [`ScreenEvent`]s through an [`EventSink`], which
//! the screen drains between user actions.

use crate::errors::CameraError;
use crate::types::{
    CameraDevice, CameraFormat, DevicePosition, FlashMode, FocusPoint, FormatConstraints,
    PhotoFile, PhysicalDeviceType, ScannedCode, VideoFile,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

/// Options for a single photo capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoOptions {
    pub flash: FlashMode,
    pub enable_shutter_sound: bool,
}

/// Options fixed for the lifetime of one recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingOptions {
    pub flash: FlashMode,
}

/// Asynchronous completions delivered back to the screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScreenEvent {
    RecordingFinished { video: VideoFile },
    RecordingFailed { message: String },
    CodesScanned { codes: Vec<ScannedCode> },
}

/// Cloneable handle the plugin uses to report completions
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<ScreenEvent>,
    ready: Arc<Notify>,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<ScreenEvent>, ready: Arc<Notify>) -> Self {
        Self { tx, ready }
    }

    pub fn recording_finished(&self, video: VideoFile) {
        self.send(ScreenEvent::RecordingFinished { video });
    }

    pub fn recording_failed(&self, error: impl ToString) {
        self.send(ScreenEvent::RecordingFailed {
            message: error.to_string(),
        });
    }

    pub fn codes_scanned(&self, codes: Vec<ScannedCode>) {
        self.send(ScreenEvent::CodesScanned { codes });
    }

    fn send(&self, event: ScreenEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("Screen closed before event delivery; event dropped");
            return;
        }
        // stores a permit when nobody is waiting yet
        self.ready.notify_one();
    }
}

/// Native capture plugin contract
#[async_trait]
pub trait CameraBackend: Send + Sync {
    /// All devices the plugin can open
    fn available_devices(&self) -> Vec<CameraDevice>;

    /// Pick a device for a position, preferring the given physical lenses
    fn select_device(
        &self,
        position: DevicePosition,
        preferred: &[PhysicalDeviceType],
    ) -> Option<CameraDevice> {
        pick_device(&self.available_devices(), position, preferred)
    }

    /// Negotiate a format for a device
    fn select_format(
        &self,
        device: &CameraDevice,
        constraints: &FormatConstraints,
    ) -> Option<CameraFormat> {
        pick_format(device, constraints)
    }

    async fn take_photo(&self, options: PhotoOptions) -> Result<PhotoFile, CameraError>;

    /// Begin recording. The outcome arrives later through `events`.
    async fn start_recording(
        &self,
        options: RecordingOptions,
        events: EventSink,
    ) -> Result<(), CameraError>;

    /// Ask the plugin to stop. Completion is still reported through the sink.
    async fn stop_recording(&self) -> Result<(), CameraError>;

    async fn focus(&self, point: FocusPoint) -> Result<(), CameraError>;
}

/// Device selection: position must match; devices exposing every preferred
/// lens win, otherwise the first device at that position is used.
pub fn pick_device(
    devices: &[CameraDevice],
    position: DevicePosition,
    preferred: &[PhysicalDeviceType],
) -> Option<CameraDevice> {
    let mut at_position = devices.iter().filter(|d| d.position == position).peekable();
    let first = at_position.peek().copied().cloned();

    at_position
        .find(|d| d.has_physical_devices(preferred))
        .cloned()
        .or(first)
}

/// Format negotiation, in priority order:
/// 1. reaches the target frame rate (otherwise the highest rate available)
/// 2. closest to the requested aspect ratio
/// 3. largest resolution
pub fn pick_format(device: &CameraDevice, constraints: &FormatConstraints) -> Option<CameraFormat> {
    let aspect_distance = |f: &CameraFormat| -> u64 {
        constraints
            .aspect_ratio
            .map(|ratio| ((f.aspect_ratio() - ratio).abs() * 1000.0) as u64)
            .unwrap_or(0)
    };

    device
        .formats
        .iter()
        .max_by(|a, b| {
            let fps_a = a.max_fps.min(constraints.target_fps);
            let fps_b = b.max_fps.min(constraints.target_fps);
            fps_a
                .cmp(&fps_b)
                .then_with(|| aspect_distance(b).cmp(&aspect_distance(a)))
                .then_with(|| a.pixel_count().cmp(&b.pixel_count()))
        })
        .cloned()
}
