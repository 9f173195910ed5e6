//! Synthetic device descriptions
//!
//! Device and format tables shaped like what a phone camera plugin reports:
//! a back multi-lens module with flash and focus, and a fixed-focus selfie
//! camera without flash.

use crate::types::{CameraDevice, CameraFormat, DevicePosition, PhysicalDeviceType};

/// Back triple-lens module, zoom 1x..10x with the wide lens as neutral
pub fn synthetic_back_camera() -> CameraDevice {
    CameraDevice {
        id: "synthetic-back-0".to_string(),
        name: "Back Triple Camera".to_string(),
        position: DevicePosition::Back,
        physical_devices: vec![
            PhysicalDeviceType::UltraWideAngle,
            PhysicalDeviceType::WideAngle,
            PhysicalDeviceType::Telephoto,
        ],
        min_zoom: 1.0,
        max_zoom: 10.0,
        neutral_zoom: 2.0,
        has_flash: true,
        supports_focus: true,
        formats: vec![
            CameraFormat::new(4032, 3024, 30).with_hdr(true, false),
            CameraFormat::new(3840, 2160, 30).with_hdr(true, true),
            CameraFormat::new(1920, 1080, 60).with_hdr(false, true),
        ],
    }
}

/// Front camera, zoom 1x..4x, no flash, no focus
pub fn synthetic_front_camera() -> CameraDevice {
    CameraDevice {
        id: "synthetic-front-0".to_string(),
        name: "Front Camera".to_string(),
        position: DevicePosition::Front,
        physical_devices: vec![PhysicalDeviceType::WideAngle],
        min_zoom: 1.0,
        max_zoom: 4.0,
        neutral_zoom: 1.0,
        has_flash: false,
        supports_focus: false,
        formats: vec![
            CameraFormat::new(3088, 2316, 30),
            CameraFormat::new(1920, 1080, 30),
        ],
    }
}

pub fn synthetic_devices() -> Vec<CameraDevice> {
    vec![synthetic_back_camera(), synthetic_front_camera()]
}
