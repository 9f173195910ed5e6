//! Shared value types for the capture screen
//!
//! Devices and formats are described the way a capture plugin reports them.
//! Everything here is plain data: no type in this module talks to hardware.

use crate::zoom::ZoomBounds;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which side of the handset a camera faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePosition {
    Front,
    #[default]
    Back,
}

impl DevicePosition {
    pub fn flipped(self) -> Self {
        match self {
            DevicePosition::Front => DevicePosition::Back,
            DevicePosition::Back => DevicePosition::Front,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DevicePosition::Front => "front",
            DevicePosition::Back => "back",
        }
    }
}

/// Flash setting applied to the next capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    #[default]
    Off,
    On,
}

impl FlashMode {
    pub fn toggled(self) -> Self {
        match self {
            FlashMode::Off => FlashMode::On,
            FlashMode::On => FlashMode::Off,
        }
    }
}

/// What the live preview is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    /// Photo and video capture
    #[default]
    Camera,
    /// Barcode / QR scanning, no capture
    CodeScan,
}

impl CaptureMode {
    pub fn toggled(self) -> Self {
        match self {
            CaptureMode::Camera => CaptureMode::CodeScan,
            CaptureMode::CodeScan => CaptureMode::Camera,
        }
    }
}

/// Physical lens types a logical device can be composed of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhysicalDeviceType {
    #[serde(rename = "wide-angle-camera")]
    WideAngle,
    #[serde(rename = "ultra-wide-angle-camera")]
    UltraWideAngle,
    #[serde(rename = "telephoto-camera")]
    Telephoto,
}

/// A capture format offered by a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraFormat {
    pub width: u32,
    pub height: u32,
    pub max_fps: u32,
    pub supports_photo_hdr: bool,
    pub supports_video_hdr: bool,
}

impl CameraFormat {
    pub fn new(width: u32, height: u32, max_fps: u32) -> Self {
        Self {
            width,
            height,
            max_fps,
            supports_photo_hdr: false,
            supports_video_hdr: false,
        }
    }

    pub fn with_hdr(mut self, photo: bool, video: bool) -> Self {
        self.supports_photo_hdr = photo;
        self.supports_video_hdr = video;
        self
    }

    /// Long side over short side, so portrait and landscape compare equal
    pub fn aspect_ratio(&self) -> f32 {
        let long = self.width.max(self.height) as f32;
        let short = self.width.min(self.height).max(1) as f32;
        long / short
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A camera device as enumerated by the capture plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDevice {
    pub id: String,
    pub name: String,
    pub position: DevicePosition,
    pub physical_devices: Vec<PhysicalDeviceType>,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub neutral_zoom: f32,
    pub has_flash: bool,
    pub supports_focus: bool,
    pub formats: Vec<CameraFormat>,
}

impl CameraDevice {
    pub fn has_physical_devices(&self, wanted: &[PhysicalDeviceType]) -> bool {
        wanted.iter().all(|w| self.physical_devices.contains(w))
    }
}

/// Constraints handed to format negotiation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatConstraints {
    pub target_fps: u32,
    /// Long side over short side; `None` accepts any shape
    pub aspect_ratio: Option<f32>,
}

/// Read-only capabilities of the selected device + format
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub neutral_zoom: f32,
    pub has_flash: bool,
    pub supports_focus: bool,
    pub supports_photo_hdr: bool,
    pub supports_video_hdr: bool,
    pub max_fps: u32,
}

impl DeviceCapabilities {
    pub fn resolve(device: &CameraDevice, format: Option<&CameraFormat>) -> Self {
        // a missing end of the zoom range falls back to the neutral zoom
        let or_neutral = |zoom: f32| if zoom.is_finite() { zoom } else { device.neutral_zoom };
        let bounds = ZoomBounds::new(or_neutral(device.min_zoom), or_neutral(device.max_zoom));
        Self {
            min_zoom: bounds.min,
            max_zoom: bounds.max,
            neutral_zoom: bounds.clamp(device.neutral_zoom),
            has_flash: device.has_flash,
            supports_focus: device.supports_focus,
            supports_photo_hdr: format.is_some_and(|f| f.supports_photo_hdr),
            supports_video_hdr: format.is_some_and(|f| f.supports_video_hdr),
            max_fps: format.map(|f| f.max_fps).unwrap_or(30),
        }
    }

    pub fn zoom_bounds(&self) -> ZoomBounds {
        ZoomBounds::new(self.min_zoom, self.max_zoom)
    }
}

/// A photo written by the capture plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoFile {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// A finished video written by the capture plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoFile {
    pub path: PathBuf,
    pub duration_secs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Photo,
    Video,
}

/// The media under review. Photo and video are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CapturedAsset {
    Photo(PhotoFile),
    Video(VideoFile),
}

impl CapturedAsset {
    pub fn path(&self) -> &Path {
        match self {
            CapturedAsset::Photo(p) => &p.path,
            CapturedAsset::Video(v) => &v.path,
        }
    }

    pub fn kind(&self) -> AssetKind {
        match self {
            CapturedAsset::Photo(_) => AssetKind::Photo,
            CapturedAsset::Video(_) => AssetKind::Video,
        }
    }
}

/// Barcode symbologies the scanner is asked to look for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodeType {
    Qr,
    #[serde(rename = "ean-13")]
    Ean13,
    #[serde(rename = "ean-8")]
    Ean8,
    #[serde(rename = "code-128")]
    Code128,
    DataMatrix,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedCode {
    pub code_type: CodeType,
    pub value: Option<String>,
}

/// Normalized tap position in the preview, both axes in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusPoint {
    pub x: f32,
    pub y: f32,
}

impl FocusPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_flip() {
        assert_eq!(DevicePosition::Back.flipped(), DevicePosition::Front);
        assert_eq!(DevicePosition::Front.flipped().flipped(), DevicePosition::Front);
    }

    #[test]
    fn test_aspect_ratio_is_orientation_free() {
        let landscape = CameraFormat::new(1920, 1080, 60);
        let portrait = CameraFormat::new(1080, 1920, 60);
        assert_eq!(landscape.aspect_ratio(), portrait.aspect_ratio());
    }

    #[test]
    fn test_capabilities_from_format() {
        let device = CameraDevice {
            id: "cam0".to_string(),
            name: "Back".to_string(),
            position: DevicePosition::Back,
            physical_devices: vec![PhysicalDeviceType::WideAngle],
            min_zoom: 1.0,
            max_zoom: 8.0,
            neutral_zoom: 1.0,
            has_flash: true,
            supports_focus: true,
            formats: vec![],
        };
        let format = CameraFormat::new(3840, 2160, 60).with_hdr(true, false);

        let caps = DeviceCapabilities::resolve(&device, Some(&format));
        assert_eq!(caps.max_fps, 60);
        assert!(caps.supports_photo_hdr);
        assert!(!caps.supports_video_hdr);

        let caps = DeviceCapabilities::resolve(&device, None);
        assert_eq!(caps.max_fps, 30);
        assert!(!caps.supports_photo_hdr);
    }

    #[test]
    fn test_capabilities_with_nan_zoom_range() {
        let device = CameraDevice {
            id: "cam1".to_string(),
            name: "Broken".to_string(),
            position: DevicePosition::Back,
            physical_devices: vec![],
            min_zoom: f32::NAN,
            max_zoom: 10.0,
            neutral_zoom: 2.0,
            has_flash: false,
            supports_focus: false,
            formats: vec![],
        };

        let caps = DeviceCapabilities::resolve(&device, None);
        assert_eq!((caps.min_zoom, caps.max_zoom), (2.0, 10.0));
        assert_eq!(caps.neutral_zoom, 2.0);
        assert_eq!(caps.zoom_bounds().clamp(f32::NAN), 2.0);
    }

    #[test]
    fn test_code_type_serde_names() {
        let json = serde_json::to_string(&CodeType::Ean13).unwrap();
        assert_eq!(json, "\"ean-13\"");
        let json = serde_json::to_string(&PhysicalDeviceType::UltraWideAngle).unwrap();
        assert_eq!(json, "\"ultra-wide-angle-camera\"");
    }
}
