//! Camera and microphone permission gate
//!
//! The screen never reads permission singletons directly. It goes through a
//! [`PermissionProvider`], so hosts plug in their platform prompt and tests
//! plug in a fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Permission status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    /// Permission granted
    Granted,
    /// Permission denied
    Denied,
    /// Permission not determined (user hasn't been asked yet)
    NotDetermined,
    /// Permission restricted (parental controls, etc)
    Restricted,
}

impl std::fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionStatus::Granted => write!(f, "granted"),
            PermissionStatus::Denied => write!(f, "denied"),
            PermissionStatus::NotDetermined => write!(f, "not_determined"),
            PermissionStatus::Restricted => write!(f, "restricted"),
        }
    }
}

/// The two permissions a capture screen needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionKind {
    Camera,
    Microphone,
}

impl PermissionKind {
    pub const ALL: [PermissionKind; 2] = [PermissionKind::Camera, PermissionKind::Microphone];
}

/// Detailed permission information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermissionInfo {
    pub status: PermissionStatus,
    pub message: String,
    pub can_request: bool,
}

impl PermissionInfo {
    pub fn granted(message: impl Into<String>) -> Self {
        Self {
            status: PermissionStatus::Granted,
            message: message.into(),
            can_request: false,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.status == PermissionStatus::Granted
    }

    /// Refused and no prompt can change that from inside the app
    pub fn is_permanently_refused(&self) -> bool {
        matches!(
            self.status,
            PermissionStatus::Denied | PermissionStatus::Restricted
        ) && !self.can_request
    }
}

/// Outcome of evaluating camera + microphone together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "readiness", content = "missing", rename_all = "snake_case")]
pub enum PermissionReadiness {
    Ready,
    Waiting,
    Refused(Vec<PermissionKind>),
}

/// Combine per-permission answers into one readiness verdict
pub fn evaluate(camera: &PermissionInfo, microphone: &PermissionInfo) -> PermissionReadiness {
    if camera.is_granted() && microphone.is_granted() {
        return PermissionReadiness::Ready;
    }

    let refused: Vec<PermissionKind> = [
        (PermissionKind::Camera, camera),
        (PermissionKind::Microphone, microphone),
    ]
    .into_iter()
    .filter(|(_, info)| info.is_permanently_refused())
    .map(|(kind, _)| kind)
    .collect();

    if refused.is_empty() {
        PermissionReadiness::Waiting
    } else {
        PermissionReadiness::Refused(refused)
    }
}

/// Platform permission queries and prompts
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Current status without prompting
    fn status(&self, kind: PermissionKind) -> PermissionInfo;

    /// Prompt the user (or the platform) and report the resulting status
    async fn request(&self, kind: PermissionKind) -> PermissionInfo;
}

/// Desktop provider: group membership and device nodes on Linux
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPermissions;

#[async_trait]
impl PermissionProvider for SystemPermissions {
    fn status(&self, kind: PermissionKind) -> PermissionInfo {
        check_permission_detailed(kind)
    }

    async fn request(&self, kind: PermissionKind) -> PermissionInfo {
        // No programmatic prompt exists on desktop, re-checking is all we can do
        let info = check_permission_detailed(kind);
        if !info.is_granted() {
            log::warn!("Cannot request {:?} permission: {}", kind, info.message);
        }
        info
    }
}

/// Check permission status with detailed information
pub fn check_permission_detailed(kind: PermissionKind) -> PermissionInfo {
    #[cfg(target_os = "linux")]
    {
        check_permission_linux(kind)
    }

    #[cfg(not(target_os = "linux"))]
    {
        PermissionInfo {
            status: PermissionStatus::NotDetermined,
            message: format!("No {:?} permission check for this platform", kind),
            can_request: false,
        }
    }
}

#[cfg(target_os = "linux")]
fn check_permission_linux(kind: PermissionKind) -> PermissionInfo {
    use std::path::Path;

    let (nodes, group): (Vec<String>, &str) = match kind {
        PermissionKind::Camera => ((0..10).map(|i| format!("/dev/video{}", i)).collect(), "video"),
        PermissionKind::Microphone => (vec!["/dev/snd".to_string()], "audio"),
    };

    let Some(node) = nodes.iter().find(|path| Path::new(path).exists()) else {
        return PermissionInfo {
            status: PermissionStatus::NotDetermined,
            message: format!("No {:?} device nodes found", kind),
            can_request: false,
        };
    };

    if check_linux_group_membership(group) {
        PermissionInfo::granted(format!("Access granted (user in {} group, {} found)", group, node))
    } else {
        PermissionInfo {
            status: PermissionStatus::Denied,
            message: format!(
                "{} exists but user not in {} group - run: sudo usermod -a -G {} $USER",
                node, group, group
            ),
            can_request: false,
        }
    }
}

#[cfg(target_os = "linux")]
fn check_linux_group_membership(group: &str) -> bool {
    use std::process::Command;

    let Ok(output) = Command::new("groups").output() else {
        return false;
    };

    String::from_utf8(output.stdout)
        .map(|groups| groups.split_whitespace().any(|g| g == group || g == "plugdev"))
        .unwrap_or(false)
}
