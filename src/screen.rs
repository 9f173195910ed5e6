//! Capture-screen state machine
//!
//! [`CameraScreen`] owns the screen state, the capture session and the
//! resolved device. Every transition takes `&mut self`; async captures hold
//! that borrow until the plugin answers, so only one capture can be in flight.
//! Plugin callbacks arrive as [`ScreenEvent`]s and are applied by
//! [`CameraScreen::pump_events`] or [`CameraScreen::wait_for_event`].
//!
//! ```text
//! AwaitingPermission ──granted──▶ Live ◀──────── dismiss ─────────┐
//!        │                      │  │ press ─▶ PhotoReview ─────────┤
//!        ▼                      │  └ long press ─▶ Recording       │
//! PermissionDenied              │        press ─▶ stop requested   │
//! DeviceUnavailable ◀─no device─┘        finished ─▶ VideoReview ──┘
//!                                        failed ─▶ Live
//! ```

use crate::backend::{CameraBackend, EventSink, ScreenEvent};
use crate::config::ScreenConfig;
use crate::controls::{ControlAction, Toolbar};
use crate::errors::CameraError;
use crate::permissions::{self, PermissionKind, PermissionProvider, PermissionReadiness};
use crate::review::{self, ReviewView, UploadSink};
use crate::session::{derive_configuration, CameraConfiguration, CaptureSession, ResolvedDevice};
use crate::types::{
    CaptureMode, CapturedAsset, DeviceCapabilities, DevicePosition, FocusPoint, PhotoFile,
    ScannedCode, VideoFile,
};
use crate::zoom::ZoomGesture;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

/// Visible screen state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScreenState {
    /// Waiting for camera and microphone permission
    AwaitingPermission,
    /// A permission was refused and cannot be re-requested from the app
    PermissionDenied { missing: Vec<PermissionKind> },
    /// No camera matches the requested position
    DeviceUnavailable,
    Live,
    Recording,
    PhotoReview(PhotoFile),
    VideoReview(VideoFile),
}

impl ScreenState {
    pub fn name(&self) -> &'static str {
        match self {
            ScreenState::AwaitingPermission => "awaiting_permission",
            ScreenState::PermissionDenied { .. } => "permission_denied",
            ScreenState::DeviceUnavailable => "device_unavailable",
            ScreenState::Live => "live",
            ScreenState::Recording => "recording",
            ScreenState::PhotoReview(_) => "photo_review",
            ScreenState::VideoReview(_) => "video_review",
        }
    }

    /// Live preview or recording: the states that accept capture controls
    pub fn is_capturing(&self) -> bool {
        matches!(self, ScreenState::Live | ScreenState::Recording)
    }

    pub fn is_reviewing(&self) -> bool {
        matches!(self, ScreenState::PhotoReview(_) | ScreenState::VideoReview(_))
    }
}

/// What a shutter tap did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ShutterOutcome {
    PhotoCaptured { photo: PhotoFile },
    StopRequested,
    /// The shutter is inert in code-scan mode
    Ignored,
}

/// Serializable view of the whole screen for the host renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenSnapshot {
    pub state: ScreenState,
    pub session: CaptureSession,
    pub capabilities: Option<DeviceCapabilities>,
    pub camera: Option<CameraConfiguration>,
    pub toolbar: Option<Toolbar>,
    pub review: Option<ReviewView>,
    pub scanned_codes: Vec<ScannedCode>,
    pub last_error: Option<String>,
}

pub struct CameraScreen {
    config: ScreenConfig,
    backend: Arc<dyn CameraBackend>,
    permissions: Arc<dyn PermissionProvider>,
    state: ScreenState,
    session: CaptureSession,
    resolved: Option<ResolvedDevice>,
    gesture: Option<ZoomGesture>,
    review: Option<ReviewView>,
    scanned_codes: Vec<ScannedCode>,
    last_error: Option<String>,
    events_tx: mpsc::UnboundedSender<ScreenEvent>,
    events_rx: mpsc::UnboundedReceiver<ScreenEvent>,
    events_ready: Arc<Notify>,
}

impl CameraScreen {
    pub fn new(
        config: ScreenConfig,
        backend: Arc<dyn CameraBackend>,
        permissions: Arc<dyn PermissionProvider>,
    ) -> Result<Self, CameraError> {
        config.validate().map_err(CameraError::ConfigError)?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let session = CaptureSession::from_config(&config);

        Ok(Self {
            config,
            backend,
            permissions,
            state: ScreenState::AwaitingPermission,
            session,
            resolved: None,
            gesture: None,
            review: None,
            scanned_codes: Vec::new(),
            last_error: None,
            events_tx,
            events_rx,
            events_ready: Arc::new(Notify::new()),
        })
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Option<&DeviceCapabilities> {
        self.resolved.as_ref().map(|r| &r.capabilities)
    }

    pub fn resolved_device(&self) -> Option<&ResolvedDevice> {
        self.resolved.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn scanned_codes(&self) -> &[ScannedCode] {
        &self.scanned_codes
    }

    /// The asset under review, if any
    pub fn captured_asset(&self) -> Option<CapturedAsset> {
        match &self.state {
            ScreenState::PhotoReview(photo) => Some(CapturedAsset::Photo(photo.clone())),
            ScreenState::VideoReview(video) => Some(CapturedAsset::Video(video.clone())),
            _ => None,
        }
    }

    pub fn review(&self) -> Option<&ReviewView> {
        self.review.as_ref()
    }

    /// Handle the plugin uses for asynchronous completions
    pub fn event_sink(&self) -> EventSink {
        EventSink::new(self.events_tx.clone(), self.events_ready.clone())
    }

    /// Signalled whenever an event is delivered. Lets a caller that shares
    /// the screen behind a lock wait for events without holding that lock.
    pub fn event_signal(&self) -> Arc<Notify> {
        self.events_ready.clone()
    }

    /// Camera view configuration, once a device is resolved
    pub fn configuration(&self) -> Option<CameraConfiguration> {
        self.resolved
            .as_ref()
            .map(|resolved| derive_configuration(&self.session, resolved, &self.config))
    }

    /// Controls over the preview; hidden outside Live/Recording
    pub fn toolbar(&self) -> Option<Toolbar> {
        self.state
            .is_capturing()
            .then(|| Toolbar::for_session(&self.session, &self.config))
    }

    pub fn snapshot(&self) -> ScreenSnapshot {
        ScreenSnapshot {
            state: self.state.clone(),
            session: self.session.clone(),
            capabilities: self.capabilities().copied(),
            camera: self.configuration(),
            toolbar: self.toolbar(),
            review: self.review.clone(),
            scanned_codes: self.scanned_codes.clone(),
            last_error: self.last_error.clone(),
        }
    }

    // ── permissions ──────────────────────────────────────────────────────

    /// Request whatever is missing and still requestable, then re-evaluate
    pub async fn request_permissions(&mut self) -> &ScreenState {
        for kind in PermissionKind::ALL {
            let info = self.permissions.status(kind);
            if !info.is_granted() && info.can_request {
                log::info!("Requesting {:?} permission", kind);
                let answer = self.permissions.request(kind).await;
                log::debug!("{:?} permission answered: {}", kind, answer.status);
            }
        }
        self.refresh_permissions()
    }

    /// Re-evaluate readiness from current permission status
    pub fn refresh_permissions(&mut self) -> &ScreenState {
        if !matches!(
            self.state,
            ScreenState::AwaitingPermission | ScreenState::PermissionDenied { .. }
        ) {
            return &self.state;
        }

        let camera = self.permissions.status(PermissionKind::Camera);
        let microphone = self.permissions.status(PermissionKind::Microphone);

        match permissions::evaluate(&camera, &microphone) {
            PermissionReadiness::Ready => {
                log::info!("Camera and microphone permissions granted");
                if self.resolve_device() {
                    self.session.is_active = true;
                    self.transition(ScreenState::Live);
                }
            }
            PermissionReadiness::Waiting => {
                self.transition(ScreenState::AwaitingPermission);
            }
            PermissionReadiness::Refused(missing) => {
                log::warn!("Permissions refused: {:?}", missing);
                self.last_error = Some(
                    CameraError::PermissionDenied(format!("{:?}", missing)).to_string(),
                );
                self.transition(ScreenState::PermissionDenied { missing });
            }
        }
        &self.state
    }

    // ── shutter ──────────────────────────────────────────────────────────

    /// Tap: photo in Live, stop request while Recording
    pub async fn press_shutter(&mut self) -> Result<ShutterOutcome, CameraError> {
        match self.state {
            ScreenState::Recording => {
                log::info!("Shutter pressed while recording, stopping");
                if let Err(e) = self.backend.stop_recording().await {
                    // the plugin still owns the recording; stay in Recording
                    log::error!("Failed to stop recording: {}", e);
                    return Err(self.fail(reported_as(e, CameraError::RecordingFailure)));
                }
                Ok(ShutterOutcome::StopRequested)
            }
            ScreenState::Live => {
                if self.session.mode == CaptureMode::CodeScan {
                    log::debug!("Shutter ignored in code-scan mode");
                    return Ok(ShutterOutcome::Ignored);
                }
                let caps = self.require_capabilities()?;
                let options = self.session.photo_options(&caps);

                match self.backend.take_photo(options).await {
                    Ok(photo) => {
                        let photo = review::with_header_dimensions(photo).await;
                        log::info!("Photo captured: {}", photo.path.display());
                        self.enter_review(CapturedAsset::Photo(photo.clone()));
                        Ok(ShutterOutcome::PhotoCaptured { photo })
                    }
                    Err(e) => {
                        log::error!("Failed to capture photo: {}", e);
                        Err(self.fail(reported_as(e, CameraError::CaptureFailure)))
                    }
                }
            }
            _ => Err(self.invalid("shutter press")),
        }
    }

    /// Hold: start recording with the current flash setting
    pub async fn long_press_shutter(&mut self) -> Result<(), CameraError> {
        match self.state {
            ScreenState::Live if self.session.mode == CaptureMode::Camera => {}
            ScreenState::Live => {
                return Err(CameraError::Unsupported(
                    "recording is unavailable in code-scan mode".to_string(),
                ))
            }
            ScreenState::Recording => {
                return Err(CameraError::InvalidState(
                    "a recording is already in progress".to_string(),
                ))
            }
            _ => return Err(self.invalid("shutter long-press")),
        }

        let caps = self.require_capabilities()?;
        let options = self.session.recording_options(&caps);
        let sink = self.event_sink();

        match self.backend.start_recording(options, sink).await {
            Ok(()) => {
                log::info!("Recording started (flash {:?})", options.flash);
                self.session.is_recording = true;
                self.transition(ScreenState::Recording);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to start recording: {}", e);
                Err(self.fail(reported_as(e, CameraError::RecordingFailure)))
            }
        }
    }

    // ── plugin events ────────────────────────────────────────────────────

    /// Apply every event already delivered; returns how many were applied
    pub fn pump_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next event and apply it. Holds `&mut self` while waiting;
    /// shared screens should wait on [`Self::event_signal`] instead.
    pub async fn wait_for_event(&mut self) {
        if let Some(event) = self.events_rx.recv().await {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: ScreenEvent) {
        match event {
            ScreenEvent::RecordingFinished { video } => {
                if self.state != ScreenState::Recording {
                    log::warn!(
                        "Recording finished in state {}; ignoring {}",
                        self.state.name(),
                        video.path.display()
                    );
                    return;
                }
                log::info!(
                    "Recording finished: {} ({:.2}s)",
                    video.path.display(),
                    video.duration_secs
                );
                self.session.is_recording = false;
                self.enter_review(CapturedAsset::Video(video));
            }
            ScreenEvent::RecordingFailed { message } => {
                if self.state != ScreenState::Recording {
                    log::warn!("Stale recording error ignored: {}", message);
                    return;
                }
                log::error!("Recording failed: {}", message);
                self.session.is_recording = false;
                self.last_error = Some(CameraError::RecordingFailure(message).to_string());
                self.transition(ScreenState::Live);
            }
            ScreenEvent::CodesScanned { codes } => {
                if self.state != ScreenState::Live || self.session.mode != CaptureMode::CodeScan {
                    log::debug!("Dropping {} scanned codes outside code-scan mode", codes.len());
                    return;
                }
                log::info!("Scanned {} codes!", codes.len());
                if let Some(first) = codes.first() {
                    log::info!("First code: {:?} {:?}", first.code_type, first.value);
                }
                self.scanned_codes = codes;
            }
        }
    }

    // ── review ───────────────────────────────────────────────────────────

    /// Leave photo/video review and return to the live preview
    pub fn dismiss_review(&mut self) -> Result<(), CameraError> {
        if !self.state.is_reviewing() {
            return Err(self.invalid("dismiss"));
        }
        log::debug!("Review dismissed");
        self.review = None;
        self.session.is_recording = false;
        self.session.is_active = true;
        self.transition(ScreenState::Live);
        Ok(())
    }

    /// Upload the asset under review; `Ok(false)` when there is none
    pub async fn upload_review(&self, sink: &dyn UploadSink) -> Result<bool, CameraError> {
        let asset = self.captured_asset();
        review::upload(asset.as_ref(), sink).await
    }

    // ── toggles ──────────────────────────────────────────────────────────

    pub fn apply_control(&mut self, action: ControlAction) -> Result<(), CameraError> {
        match action {
            ControlAction::SwitchCamera => self.toggle_device_position(),
            ControlAction::ToggleFlash => self.toggle_flash(),
            ControlAction::ToggleMode => self.toggle_mode(),
            ControlAction::ToggleShutterSound => self.toggle_shutter_sound(),
            ControlAction::ToggleHdr => self.toggle_hdr(),
            ControlAction::ToggleFrameRate => self.toggle_frame_rate(),
        }
    }

    /// Applies to the next capture; an ongoing recording keeps its flash
    pub fn toggle_flash(&mut self) -> Result<(), CameraError> {
        self.require_capturing("flash toggle")?;
        self.session.flash = self.session.flash.toggled();
        log::debug!("Flash set to {:?}", self.session.flash);
        Ok(())
    }

    pub fn toggle_hdr(&mut self) -> Result<(), CameraError> {
        self.require_feature(self.config.features.hdr, "HDR")?;
        self.require_capturing("HDR toggle")?;
        self.session.hdr_enabled = !self.session.hdr_enabled;
        log::debug!("HDR enabled: {}", self.session.hdr_enabled);
        Ok(())
    }

    pub fn toggle_shutter_sound(&mut self) -> Result<(), CameraError> {
        self.require_capturing("shutter sound toggle")?;
        self.session.shutter_sound_enabled = !self.session.shutter_sound_enabled;
        Ok(())
    }

    /// Cycle the target frame rate and renegotiate the format
    pub fn toggle_frame_rate(&mut self) -> Result<(), CameraError> {
        self.require_feature(self.config.features.frame_rate_toggle, "frame rate toggle")?;
        self.require_capturing("frame rate toggle")?;

        self.session.target_frame_rate = self
            .session
            .next_frame_rate(&self.config.camera.frame_rate_options);

        if let Some(resolved) = self.resolved.take() {
            let constraints = self.session.format_constraints(&self.config);
            let format = self.backend.select_format(&resolved.device, &constraints);
            let resolved = ResolvedDevice::new(resolved.device, format);
            let bounds = resolved.capabilities.zoom_bounds();
            self.session.zoom_level = bounds.clamp(self.session.zoom_level);
            self.resolved = Some(resolved);
        }
        log::debug!("Target frame rate {}", self.session.target_frame_rate);
        Ok(())
    }

    /// Flip front/back; zoom resets to the new device's neutral zoom.
    /// When the other side has no camera the current device is kept and an
    /// in-progress recording carries on.
    pub fn toggle_device_position(&mut self) -> Result<(), CameraError> {
        self.require_capturing("device switch")?;
        let target = self.session.device_position.flipped();

        let Some(resolved) = self.negotiate(target) else {
            log::warn!(
                "No {} camera; staying on {}",
                target.as_str(),
                self.session.device_position.as_str()
            );
            return Err(self.fail(CameraError::DeviceUnavailable(target.as_str().to_string())));
        };

        log::info!("Switching to {} camera", target.as_str());
        self.gesture = None;
        self.session.device_position = target;
        self.adopt(resolved);
        Ok(())
    }

    /// Switch between capture and code scanning
    pub fn toggle_mode(&mut self) -> Result<(), CameraError> {
        self.require_feature(self.config.features.code_scan, "code scanning")?;
        if self.state != ScreenState::Live {
            return Err(self.invalid("mode toggle"));
        }
        self.session.mode = self.session.mode.toggled();
        self.scanned_codes.clear();
        log::debug!("Capture mode {:?}", self.session.mode);
        Ok(())
    }

    // ── gestures ─────────────────────────────────────────────────────────

    /// Pinch began: baseline is the zoom at this instant
    pub fn begin_pinch(&mut self) -> Result<f32, CameraError> {
        self.require_feature(self.config.features.zoom_gesture, "zoom gesture")?;
        self.require_capturing("pinch")?;
        let caps = self.require_capabilities()?;
        let gesture = ZoomGesture::begin(Some(self.session.zoom_level), caps.neutral_zoom);
        self.gesture = Some(gesture);
        Ok(gesture.baseline())
    }

    /// Pinch moved: apply the mapped zoom immediately
    pub fn update_pinch(&mut self, scale: f32) -> Result<f32, CameraError> {
        self.require_feature(self.config.features.zoom_gesture, "zoom gesture")?;
        self.require_capturing("pinch")?;
        let caps = self.require_capabilities()?;
        let gesture = match self.gesture {
            Some(g) => g,
            None => {
                // an update without a begin starts from the current zoom
                let g = ZoomGesture::begin(Some(self.session.zoom_level), caps.neutral_zoom);
                self.gesture = Some(g);
                g
            }
        };

        let zoom = gesture.update(
            scale,
            self.config.camera.zoom_reference_domain,
            caps.zoom_bounds(),
        );
        self.session.zoom_level = zoom;
        Ok(zoom)
    }

    pub fn end_pinch(&mut self) {
        self.gesture = None;
    }

    /// Tap-to-focus; a no-op when the device cannot focus
    pub async fn tap_to_focus(&mut self, point: FocusPoint) -> Result<(), CameraError> {
        self.require_feature(self.config.features.focus_gesture, "focus gesture")?;
        self.require_capturing("focus")?;
        let caps = self.require_capabilities()?;
        if !caps.supports_focus {
            log::debug!("Device does not support focus; tap ignored");
            return Ok(());
        }
        self.backend.focus(point).await.map_err(|e| {
            log::warn!("Focus failed: {}", e);
            reported_as(e, CameraError::FocusFailure)
        })
    }

    // ── internals ────────────────────────────────────────────────────────

    /// Initial device resolution. No camera at the session's position is
    /// terminal: the screen moves to `DeviceUnavailable`.
    fn resolve_device(&mut self) -> bool {
        let position = self.session.device_position;
        let Some(resolved) = self.negotiate(position) else {
            log::error!("Camera device not found for position {}", position.as_str());
            self.resolved = None;
            self.session.is_active = false;
            self.session.is_recording = false;
            self.last_error =
                Some(CameraError::DeviceUnavailable(position.as_str().to_string()).to_string());
            self.transition(ScreenState::DeviceUnavailable);
            return false;
        };

        self.adopt(resolved);
        true
    }

    /// Select device + format for a position without touching screen state
    fn negotiate(&self, position: DevicePosition) -> Option<ResolvedDevice> {
        let device = self
            .backend
            .select_device(position, &self.config.camera.preferred_physical_devices)?;

        let constraints = self.session.format_constraints(&self.config);
        let format = self.backend.select_format(&device, &constraints);
        if format.is_none() {
            log::warn!("No format negotiated for {}; using device defaults", device.id);
        }
        Some(ResolvedDevice::new(device, format))
    }

    fn adopt(&mut self, resolved: ResolvedDevice) {
        self.session.zoom_level = resolved.capabilities.neutral_zoom;
        log::info!(
            "Using {} ({}), zoom {}..{}",
            resolved.device.name,
            resolved.device.id,
            resolved.capabilities.min_zoom,
            resolved.capabilities.max_zoom
        );
        self.resolved = Some(resolved);
    }

    fn enter_review(&mut self, asset: CapturedAsset) {
        self.session.is_active = false;
        self.gesture = None;
        let captured_at: DateTime<Utc> = Utc::now();
        let next = match &asset {
            CapturedAsset::Photo(p) => ScreenState::PhotoReview(p.clone()),
            CapturedAsset::Video(v) => ScreenState::VideoReview(v.clone()),
        };
        self.review = Some(ReviewView::for_asset(asset, captured_at));
        self.transition(next);
    }

    fn transition(&mut self, next: ScreenState) {
        if self.state != next {
            log::debug!("Screen {} -> {}", self.state.name(), next.name());
        }
        self.state = next;
    }

    fn require_capturing(&self, what: &str) -> Result<(), CameraError> {
        if self.state.is_capturing() {
            Ok(())
        } else {
            Err(self.invalid(what))
        }
    }

    fn require_feature(&self, enabled: bool, what: &str) -> Result<(), CameraError> {
        if enabled {
            Ok(())
        } else {
            Err(CameraError::Unsupported(format!("{} is disabled", what)))
        }
    }

    fn require_capabilities(&self) -> Result<DeviceCapabilities, CameraError> {
        self.capabilities()
            .copied()
            .ok_or_else(|| CameraError::DeviceUnavailable("no device resolved".to_string()))
    }

    fn invalid(&self, what: &str) -> CameraError {
        CameraError::InvalidState(format!("{} not allowed in state {}", what, self.state.name()))
    }

    /// Record a recoverable failure for display and hand it back
    fn fail(&mut self, error: CameraError) -> CameraError {
        self.last_error = Some(error.to_string());
        error
    }
}

/// Keep a plugin error that already has the expected kind, wrap anything else
fn reported_as(error: CameraError, kind: fn(String) -> CameraError) -> CameraError {
    if std::mem::discriminant(&error) == std::mem::discriminant(&kind(String::new())) {
        error
    } else {
        kind(error.to_string())
    }
}

impl std::fmt::Debug for CameraScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraScreen")
            .field("state", &self.state)
            .field("session", &self.session)
            .field("resolved", &self.resolved)
            .finish_non_exhaustive()
    }
}
