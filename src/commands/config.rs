use crate::config::{CameraSettings, FeatureFlags, ScreenConfig};
use std::sync::{Arc, RwLock};
use tauri::command;

lazy_static::lazy_static! {
    static ref GLOBAL_CONFIG: Arc<RwLock<ScreenConfig>> = Arc::new(RwLock::new(ScreenConfig::load_or_default()));
}

/// Configuration new screens are opened with
pub(crate) fn current_config() -> Result<ScreenConfig, String> {
    let config = GLOBAL_CONFIG.read().map_err(|e| e.to_string())?;
    Ok(config.clone())
}

fn store(new_config: ScreenConfig) -> Result<(), String> {
    {
        let mut config = GLOBAL_CONFIG
            .write()
            .map_err(|e| format!("Failed to write config: {}", e))?;
        *config = new_config.clone();
    }

    new_config
        .save_to_file(ScreenConfig::default_path())
        .map_err(|e| e.to_string())
}

/// Get the current configuration
#[command]
pub async fn get_config() -> Result<ScreenConfig, String> {
    current_config()
}

/// Update configuration. Screens already open keep the config they were opened with.
#[command]
pub async fn update_config(new_config: ScreenConfig) -> Result<(), String> {
    new_config.validate()?;
    store(new_config)?;
    log::info!("Configuration updated");
    Ok(())
}

/// Reset configuration to defaults
#[command]
pub async fn reset_config() -> Result<ScreenConfig, String> {
    let default_config = ScreenConfig::default();
    store(default_config.clone())?;
    log::info!("Configuration reset to defaults");
    Ok(default_config)
}

/// Check a configuration without applying it
#[command]
pub async fn validate_config(config: ScreenConfig) -> Result<(), String> {
    config.validate()
}

/// Get camera settings
#[command]
pub async fn get_camera_settings() -> Result<CameraSettings, String> {
    let config = GLOBAL_CONFIG.read().map_err(|e| e.to_string())?;
    Ok(config.camera.clone())
}

/// Update camera settings
#[command]
pub async fn update_camera_settings(camera: CameraSettings) -> Result<(), String> {
    let mut config = current_config()?;
    config.camera = camera;
    config.validate()?;
    store(config)
}

/// Get feature flags
#[command]
pub async fn get_feature_flags() -> Result<FeatureFlags, String> {
    let config = GLOBAL_CONFIG.read().map_err(|e| e.to_string())?;
    Ok(config.features.clone())
}

/// Update feature flags
#[command]
pub async fn update_feature_flags(features: FeatureFlags) -> Result<(), String> {
    let mut config = current_config()?;
    config.features = features;
    config.validate()?;
    store(config)
}
