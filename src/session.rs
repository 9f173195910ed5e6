//! Capture session state and the derived camera configuration

use crate::backend::{PhotoOptions, RecordingOptions};
use crate::config::ScreenConfig;
use crate::types::{
    CameraDevice, CameraFormat, CaptureMode, CodeType, DeviceCapabilities, DevicePosition,
    FlashMode, FormatConstraints,
};
use serde::{Deserialize, Serialize};

/// Mutable screen-level capture settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSession {
    pub device_position: DevicePosition,
    pub is_active: bool,
    pub flash: FlashMode,
    pub hdr_enabled: bool,
    pub shutter_sound_enabled: bool,
    pub target_frame_rate: u32,
    pub zoom_level: f32,
    pub is_recording: bool,
    pub mode: CaptureMode,
}

impl CaptureSession {
    pub fn from_config(config: &ScreenConfig) -> Self {
        Self {
            device_position: config.camera.initial_position,
            is_active: false,
            flash: config.camera.initial_flash,
            hdr_enabled: config.camera.hdr_enabled,
            shutter_sound_enabled: config.camera.shutter_sound,
            target_frame_rate: config.initial_frame_rate(),
            zoom_level: 1.0,
            is_recording: false,
            mode: CaptureMode::Camera,
        }
    }

    /// Next entry in the option list, wrapping around
    pub fn next_frame_rate(&self, options: &[u32]) -> u32 {
        match options.iter().position(|&fps| fps == self.target_frame_rate) {
            Some(i) => options[(i + 1) % options.len()],
            None => options.first().copied().unwrap_or(self.target_frame_rate),
        }
    }

    pub fn effective_frame_rate(&self, caps: &DeviceCapabilities) -> u32 {
        self.target_frame_rate.min(caps.max_fps.max(1))
    }

    pub fn effective_flash(&self, caps: &DeviceCapabilities) -> FlashMode {
        if caps.has_flash {
            self.flash
        } else {
            FlashMode::Off
        }
    }

    pub fn photo_options(&self, caps: &DeviceCapabilities) -> PhotoOptions {
        PhotoOptions {
            flash: self.effective_flash(caps),
            enable_shutter_sound: self.shutter_sound_enabled,
        }
    }

    pub fn recording_options(&self, caps: &DeviceCapabilities) -> RecordingOptions {
        RecordingOptions {
            flash: self.effective_flash(caps),
        }
    }

    pub fn format_constraints(&self, config: &ScreenConfig) -> FormatConstraints {
        FormatConstraints {
            target_fps: self.target_frame_rate,
            aspect_ratio: config.camera.aspect_ratio,
        }
    }
}

/// Device, negotiated format and the capabilities derived from both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDevice {
    pub device: CameraDevice,
    pub format: Option<CameraFormat>,
    pub capabilities: DeviceCapabilities,
}

impl ResolvedDevice {
    pub fn new(device: CameraDevice, format: Option<CameraFormat>) -> Self {
        let capabilities = DeviceCapabilities::resolve(&device, format.as_ref());
        Self {
            device,
            format,
            capabilities,
        }
    }
}

/// Declarative configuration the host hands to the camera view on every render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfiguration {
    pub device_id: String,
    pub position: DevicePosition,
    pub format: Option<CameraFormat>,
    pub is_active: bool,
    pub mode: CaptureMode,
    pub photo: bool,
    pub video: bool,
    pub audio: bool,
    pub photo_hdr: bool,
    pub video_hdr: bool,
    pub fps: u32,
    pub zoom: f32,
    pub code_types: Option<Vec<CodeType>>,
    pub zoom_gesture_enabled: bool,
}

/// Pure derivation from session + resolved device + config
pub fn derive_configuration(
    session: &CaptureSession,
    resolved: &ResolvedDevice,
    config: &ScreenConfig,
) -> CameraConfiguration {
    let caps = &resolved.capabilities;
    let capturing = session.mode == CaptureMode::Camera;
    let hdr = config.features.hdr && session.hdr_enabled;

    CameraConfiguration {
        device_id: resolved.device.id.clone(),
        position: session.device_position,
        format: resolved.format.clone(),
        is_active: session.is_active,
        mode: session.mode,
        photo: capturing,
        video: capturing,
        audio: capturing && config.camera.record_audio,
        photo_hdr: capturing && hdr && caps.supports_photo_hdr,
        video_hdr: capturing && hdr && caps.supports_video_hdr,
        fps: session.effective_frame_rate(caps),
        zoom: caps.zoom_bounds().clamp(session.zoom_level),
        code_types: match session.mode {
            CaptureMode::CodeScan => Some(config.code_scan.code_types.clone()),
            CaptureMode::Camera => None,
        },
        zoom_gesture_enabled: config.features.zoom_gesture,
    }
}
