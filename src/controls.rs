//! Button primitives and the capture toolbar
//!
//! Controls are render-agnostic descriptors: the host draws them with its own
//! icon library and sends the attached [`ControlAction`] back to the screen.

use crate::config::{FeatureFlags, ScreenConfig};
use crate::session::CaptureSession;
use crate::types::{CaptureMode, FlashMode};
use serde::{Deserialize, Serialize};

/// Icon font a glyph name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconSet {
    Ionicons,
    MaterialCommunity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icon {
    pub set: IconSet,
    pub name: String,
}

impl Icon {
    pub fn ionicon(name: &str) -> Self {
        Self {
            set: IconSet::Ionicons,
            name: name.to_string(),
        }
    }

    pub fn material(name: &str) -> Self {
        Self {
            set: IconSet::MaterialCommunity,
            name: name.to_string(),
        }
    }
}

/// Everything a control can ask the screen to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    SwitchCamera,
    ToggleFlash,
    ToggleMode,
    ToggleShutterSound,
    ToggleHdr,
    ToggleFrameRate,
}

/// Icon-triggered action button
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconButton {
    pub icon: Icon,
    pub size: u32,
    pub color: String,
    pub action: ControlAction,
}

impl IconButton {
    pub fn new(icon: Icon, action: ControlAction, style: &crate::config::ControlStyle) -> Self {
        Self {
            icon,
            size: style.icon_size,
            color: style.icon_color.clone(),
            action,
        }
    }
}

/// Toggle-style text button with a pressed state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextButton {
    pub text: String,
    pub pressed: bool,
    pub size: u32,
    pub action: ControlAction,
}

/// Shutter: tap for a photo, hold to record, tap again to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShutterButton {
    pub recording: bool,
    pub enabled: bool,
}

impl ShutterButton {
    pub fn fill_color(&self) -> &'static str {
        if self.recording {
            "red"
        } else {
            "white"
        }
    }
}

/// Controls shown over the live preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toolbar {
    pub icon_buttons: Vec<IconButton>,
    pub text_buttons: Vec<TextButton>,
    pub shutter: ShutterButton,
}

impl Toolbar {
    pub fn for_session(session: &CaptureSession, config: &ScreenConfig) -> Self {
        let style = &config.controls;
        let FeatureFlags {
            code_scan,
            hdr,
            frame_rate_toggle,
            ..
        } = config.features;

        let flash_icon = match session.flash {
            FlashMode::Off => "flash-off",
            FlashMode::On => "flash",
        };
        let sound_icon = if session.shutter_sound_enabled {
            "volume-high-outline"
        } else {
            "volume-mute-outline"
        };

        let mut icon_buttons = vec![
            IconButton::new(Icon::ionicon("sync-outline"), ControlAction::SwitchCamera, style),
            IconButton::new(Icon::ionicon(flash_icon), ControlAction::ToggleFlash, style),
            IconButton::new(Icon::ionicon(sound_icon), ControlAction::ToggleShutterSound, style),
        ];
        if code_scan && !session.is_recording {
            let mode_icon = match session.mode {
                CaptureMode::Camera => "qrcode-scan",
                CaptureMode::CodeScan => "camera-outline",
            };
            icon_buttons.push(IconButton::new(Icon::material(mode_icon), ControlAction::ToggleMode, style));
        }

        let mut text_buttons = Vec::new();
        if hdr {
            text_buttons.push(TextButton {
                text: "HDR".to_string(),
                pressed: session.hdr_enabled,
                size: style.text_button_size,
                action: ControlAction::ToggleHdr,
            });
        }
        if frame_rate_toggle {
            let lowest = config.camera.frame_rate_options.iter().min().copied().unwrap_or(0);
            text_buttons.push(TextButton {
                text: format!("{}fps", session.target_frame_rate),
                pressed: session.target_frame_rate > lowest,
                size: style.text_button_size,
                action: ControlAction::ToggleFrameRate,
            });
        }

        Self {
            icon_buttons,
            text_buttons,
            shutter: ShutterButton {
                recording: session.is_recording,
                enabled: session.mode == CaptureMode::Camera,
            },
        }
    }

    pub fn actions(&self) -> Vec<ControlAction> {
        self.icon_buttons
            .iter()
            .map(|b| b.action)
            .chain(self.text_buttons.iter().map(|b| b.action))
            .collect()
    }
}
