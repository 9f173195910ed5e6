//! In-memory collaborators for driving a screen without hardware

use crate::backend::{CameraBackend, EventSink, PhotoOptions, RecordingOptions};
use crate::errors::CameraError;
use crate::permissions::{PermissionInfo, PermissionKind, PermissionProvider, PermissionStatus};
use crate::review::{UploadRequest, UploadSink};
use crate::types::{CameraDevice, FocusPoint, PhotoFile, VideoFile};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Default)]
struct BackendLog {
    photo_results: VecDeque<Result<PhotoFile, CameraError>>,
    photo_calls: Vec<PhotoOptions>,
    recording: Option<(RecordingOptions, EventSink)>,
    recordings_started: usize,
    stop_calls: usize,
    focus_calls: Vec<FocusPoint>,
    fail_next_start: Option<String>,
}

/// Scriptable capture plugin
pub struct FakeCameraBackend {
    devices: Mutex<Vec<CameraDevice>>,
    log: Mutex<BackendLog>,
}

impl FakeCameraBackend {
    pub fn new(devices: Vec<CameraDevice>) -> Self {
        Self {
            devices: Mutex::new(devices),
            log: Mutex::new(BackendLog::default()),
        }
    }

    /// Back + front synthetic devices
    pub fn with_synthetic_devices() -> Self {
        Self::new(super::synthetic_devices())
    }

    pub fn set_devices(&self, devices: Vec<CameraDevice>) {
        *self.devices.lock().expect("lock poisoned") = devices;
    }

    /// Result for the next `take_photo`; unscripted calls succeed
    pub fn queue_photo_result(&self, result: Result<PhotoFile, CameraError>) {
        self.log.lock().expect("lock poisoned").photo_results.push_back(result);
    }

    pub fn fail_next_recording_start(&self, message: &str) {
        self.log.lock().expect("lock poisoned").fail_next_start = Some(message.to_string());
    }

    pub fn photo_calls(&self) -> Vec<PhotoOptions> {
        self.log.lock().expect("lock poisoned").photo_calls.clone()
    }

    pub fn recordings_started(&self) -> usize {
        self.log.lock().expect("lock poisoned").recordings_started
    }

    pub fn stop_calls(&self) -> usize {
        self.log.lock().expect("lock poisoned").stop_calls
    }

    pub fn focus_calls(&self) -> Vec<FocusPoint> {
        self.log.lock().expect("lock poisoned").focus_calls.clone()
    }

    /// Options the in-progress recording was started with
    pub fn active_recording(&self) -> Option<RecordingOptions> {
        self.log
            .lock()
            .expect("lock poisoned")
            .recording
            .as_ref()
            .map(|(options, _)| *options)
    }

    /// Deliver the finished-callback for the in-progress recording
    pub fn finish_recording(&self, video: VideoFile) -> bool {
        match self.log.lock().expect("lock poisoned").recording.take() {
            Some((_, sink)) => {
                sink.recording_finished(video);
                true
            }
            None => false,
        }
    }

    /// Deliver the error-callback for the in-progress recording
    pub fn fail_recording(&self, message: &str) -> bool {
        match self.log.lock().expect("lock poisoned").recording.take() {
            Some((_, sink)) => {
                sink.recording_failed(message);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CameraBackend for FakeCameraBackend {
    fn available_devices(&self) -> Vec<CameraDevice> {
        self.devices.lock().expect("lock poisoned").clone()
    }

    async fn take_photo(&self, options: PhotoOptions) -> Result<PhotoFile, CameraError> {
        let mut log = self.log.lock().expect("lock poisoned");
        log.photo_calls.push(options);
        let n = log.photo_calls.len();
        log.photo_results.pop_front().unwrap_or_else(|| {
            Ok(PhotoFile {
                path: PathBuf::from(format!("/tmp/camscreen-fake-photo-{}.jpg", n)),
                width: 4032,
                height: 3024,
            })
        })
    }

    async fn start_recording(
        &self,
        options: RecordingOptions,
        events: EventSink,
    ) -> Result<(), CameraError> {
        let mut log = self.log.lock().expect("lock poisoned");
        if let Some(message) = log.fail_next_start.take() {
            return Err(CameraError::RecordingFailure(message));
        }
        log.recordings_started += 1;
        log.recording = Some((options, events));
        Ok(())
    }

    async fn stop_recording(&self) -> Result<(), CameraError> {
        self.log.lock().expect("lock poisoned").stop_calls += 1;
        Ok(())
    }

    async fn focus(&self, point: FocusPoint) -> Result<(), CameraError> {
        self.log.lock().expect("lock poisoned").focus_calls.push(point);
        Ok(())
    }
}

/// Permission provider with scripted answers
pub struct FakePermissions {
    statuses: Mutex<HashMap<PermissionKind, PermissionInfo>>,
    grant_on_request: bool,
}

impl FakePermissions {
    /// Nothing decided yet; requests are granted
    pub fn undetermined() -> Self {
        let pending = PermissionInfo {
            status: PermissionStatus::NotDetermined,
            message: "not asked yet".to_string(),
            can_request: true,
        };
        Self {
            statuses: Mutex::new(
                PermissionKind::ALL
                    .into_iter()
                    .map(|k| (k, pending.clone()))
                    .collect(),
            ),
            grant_on_request: true,
        }
    }

    pub fn granted() -> Self {
        let fake = Self::undetermined();
        for kind in PermissionKind::ALL {
            fake.set(kind, PermissionInfo::granted("granted"));
        }
        fake
    }

    /// Requests leave the status untouched (the user never answers)
    pub fn unanswered() -> Self {
        Self {
            grant_on_request: false,
            ..Self::undetermined()
        }
    }

    pub fn set(&self, kind: PermissionKind, info: PermissionInfo) {
        self.statuses.lock().expect("lock poisoned").insert(kind, info);
    }

    pub fn deny_permanently(&self, kind: PermissionKind) {
        self.set(
            kind,
            PermissionInfo {
                status: PermissionStatus::Denied,
                message: "denied in settings".to_string(),
                can_request: false,
            },
        );
    }
}

#[async_trait]
impl PermissionProvider for FakePermissions {
    fn status(&self, kind: PermissionKind) -> PermissionInfo {
        self.statuses
            .lock()
            .expect("lock poisoned")
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| PermissionInfo {
                status: PermissionStatus::NotDetermined,
                message: String::new(),
                can_request: true,
            })
    }

    async fn request(&self, kind: PermissionKind) -> PermissionInfo {
        if self.grant_on_request {
            self.set(kind, PermissionInfo::granted("granted on request"));
        }
        self.status(kind)
    }
}

/// Upload sink that keeps every request in memory
#[derive(Default)]
pub struct MemoryUploadSink {
    requests: Mutex<Vec<UploadRequest>>,
}

impl MemoryUploadSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<UploadRequest> {
        self.requests.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl UploadSink for MemoryUploadSink {
    async fn upload(&self, request: UploadRequest) -> Result<(), CameraError> {
        self.requests.lock().expect("lock poisoned").push(request);
        Ok(())
    }
}
