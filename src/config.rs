//! Configuration management for the capture screen
//!
//! One parameterized screen replaces the separate screen variants: feature
//! flags switch zoom gestures, tap-to-focus, code scanning, HDR and the frame
//! rate toggle on or off. Configuration is stored as TOML and can be
//! overlaid with `CAMSCREEN__*` environment variables.

use crate::errors::CameraError;
use crate::types::{CodeType, DevicePosition, FlashMode, PhysicalDeviceType};
use crate::zoom::ZOOM_REFERENCE_DOMAIN;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScreenConfig {
    pub features: FeatureFlags,
    pub camera: CameraSettings,
    pub code_scan: CodeScanSettings,
    pub controls: ControlStyle,
    pub upload: UploadSettings,
}

/// Optional screen features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub zoom_gesture: bool,
    pub focus_gesture: bool,
    pub code_scan: bool,
    pub hdr: bool,
    pub frame_rate_toggle: bool,
}

/// Initial capture settings and device preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub initial_position: DevicePosition,
    /// Lenses the selected device should expose, e.g. the ultra-wide camera
    pub preferred_physical_devices: Vec<PhysicalDeviceType>,
    pub initial_flash: FlashMode,
    pub shutter_sound: bool,
    pub hdr_enabled: bool,
    /// Selectable target frame rates, the first one is the initial rate
    pub frame_rate_options: Vec<u32>,
    /// Preferred aspect ratio (long side over short side)
    pub aspect_ratio: Option<f32>,
    /// Input domain the pinch mapping interpolates from
    pub zoom_reference_domain: [f32; 2],
    pub record_audio: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeScanSettings {
    pub code_types: Vec<CodeType>,
}

/// Visual defaults for the button primitives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlStyle {
    pub icon_size: u32,
    pub icon_color: String,
    pub text_button_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UploadSettings {
    /// Directory used by the built-in directory sink; `None` disables it
    pub directory: Option<String>,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            zoom_gesture: true,
            focus_gesture: true,
            code_scan: true,
            hdr: true,
            frame_rate_toggle: true,
        }
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            initial_position: DevicePosition::Back,
            preferred_physical_devices: vec![PhysicalDeviceType::UltraWideAngle],
            initial_flash: FlashMode::Off,
            shutter_sound: true,
            hdr_enabled: false,
            frame_rate_options: vec![30, 60],
            aspect_ratio: None,
            zoom_reference_domain: ZOOM_REFERENCE_DOMAIN,
            record_audio: true,
        }
    }
}

impl Default for CodeScanSettings {
    fn default() -> Self {
        Self {
            code_types: vec![CodeType::Qr, CodeType::Ean13],
        }
    }
}

impl Default for ControlStyle {
    fn default() -> Self {
        Self {
            icon_size: 30,
            icon_color: "black".to_string(),
            text_button_size: 35,
        }
    }
}

impl ScreenConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CameraError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            CameraError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        let config: ScreenConfig = toml::from_str(&contents)?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load the TOML file (if present) and overlay `CAMSCREEN__SECTION__KEY` variables
    pub fn load_layered<P: AsRef<Path>>(path: P) -> Result<Self, CameraError> {
        let path = path.as_ref();
        let layered = config::Config::builder()
            .add_source(
                config::File::from(path.to_path_buf())
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix("CAMSCREEN")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ScreenConfig = layered.try_deserialize()?;
        log::debug!("Layered configuration resolved from {:?} and environment", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CameraError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    CameraError::ConfigError(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            CameraError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, toml_string).map_err(|e| {
            CameraError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("camscreen.toml")
    }

    /// Load from default location or fall back to defaults
    pub fn load_or_default() -> Self {
        Self::load_layered(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        let rates = &self.camera.frame_rate_options;
        if rates.is_empty() {
            return Err("At least one frame rate option is required".to_string());
        }
        if rates.iter().any(|&fps| fps == 0 || fps > 240) {
            return Err("Invalid frame rate option (must be 1-240)".to_string());
        }

        let [d0, d1] = self.camera.zoom_reference_domain;
        if !(d0.is_finite() && d1.is_finite()) || d1 <= d0 {
            return Err("Zoom reference domain must be an increasing finite range".to_string());
        }

        if let Some(ratio) = self.camera.aspect_ratio {
            if !ratio.is_finite() || ratio < 1.0 {
                return Err("Aspect ratio must be long side over short side (>= 1.0)".to_string());
            }
        }

        if self.features.code_scan && self.code_scan.code_types.is_empty() {
            return Err("Code scanning is enabled but no code types are configured".to_string());
        }

        if self.controls.icon_size == 0 || self.controls.text_button_size == 0 {
            return Err("Control sizes must be non-zero".to_string());
        }

        Ok(())
    }

    /// Initial target frame rate
    pub fn initial_frame_rate(&self) -> u32 {
        self.camera.frame_rate_options.first().copied().unwrap_or(30)
    }
}
