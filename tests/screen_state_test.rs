#[cfg(test)]
mod screen_state_tests {
    use camscreen::config::ScreenConfig;
    use camscreen::errors::CameraError;
    use camscreen::permissions::{PermissionInfo, PermissionKind};
    use camscreen::screen::{CameraScreen, ScreenState, ShutterOutcome};
    use camscreen::testing::{
        synthetic_front_camera, FakeCameraBackend, FakePermissions,
    };
    use camscreen::types::{
        CaptureMode, CodeType, DevicePosition, FlashMode, PhotoFile, ScannedCode, VideoFile,
    };
    use std::path::PathBuf;
    use std::sync::Arc;

    fn open(
        config: ScreenConfig,
        backend: &Arc<FakeCameraBackend>,
        permissions: &Arc<FakePermissions>,
    ) -> CameraScreen {
        CameraScreen::new(config, backend.clone(), permissions.clone())
            .expect("default config should be valid")
    }

    async fn live_screen_with(config: ScreenConfig) -> (CameraScreen, Arc<FakeCameraBackend>) {
        let backend = Arc::new(FakeCameraBackend::with_synthetic_devices());
        let permissions = Arc::new(FakePermissions::undetermined());
        let mut screen = open(config, &backend, &permissions);
        screen.request_permissions().await;
        assert_eq!(screen.state(), &ScreenState::Live);
        (screen, backend)
    }

    async fn live_screen() -> (CameraScreen, Arc<FakeCameraBackend>) {
        live_screen_with(ScreenConfig::default()).await
    }

    fn video(name: &str) -> VideoFile {
        VideoFile {
            path: PathBuf::from(format!("/tmp/{}.mp4", name)),
            duration_secs: 3.5,
        }
    }

    // ── permissions ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_screen_starts_awaiting_permission() {
        let backend = Arc::new(FakeCameraBackend::with_synthetic_devices());
        let permissions = Arc::new(FakePermissions::undetermined());
        let screen = open(ScreenConfig::default(), &backend, &permissions);

        assert_eq!(screen.state(), &ScreenState::AwaitingPermission);
        assert!(!screen.session().is_active);
        assert!(screen.toolbar().is_none(), "No controls before permission");
        assert!(screen.configuration().is_none());
    }

    #[tokio::test]
    async fn test_granting_permissions_enters_live() {
        let (screen, _backend) = live_screen().await;

        assert!(screen.session().is_active);
        assert_eq!(screen.session().device_position, DevicePosition::Back);
        assert_eq!(screen.session().zoom_level, 2.0, "Zoom starts at neutral");
        assert!(screen.toolbar().is_some());

        let camera = screen.configuration().expect("configuration once live");
        assert_eq!(camera.device_id, "synthetic-back-0");
        assert!(camera.is_active);
        assert!(camera.photo && camera.video && camera.audio);
    }

    #[tokio::test]
    async fn test_unanswered_permission_keeps_waiting() {
        let backend = Arc::new(FakeCameraBackend::with_synthetic_devices());
        let permissions = Arc::new(FakePermissions::unanswered());
        let mut screen = open(ScreenConfig::default(), &backend, &permissions);

        screen.request_permissions().await;
        assert_eq!(screen.state(), &ScreenState::AwaitingPermission);
        assert!(screen.last_error().is_none(), "Waiting is not an error");
    }

    #[tokio::test]
    async fn test_permanent_denial_is_reachable_and_recoverable() {
        let backend = Arc::new(FakeCameraBackend::with_synthetic_devices());
        let permissions = Arc::new(FakePermissions::undetermined());
        permissions.deny_permanently(PermissionKind::Microphone);
        let mut screen = open(ScreenConfig::default(), &backend, &permissions);

        screen.request_permissions().await;
        assert_eq!(
            screen.state(),
            &ScreenState::PermissionDenied {
                missing: vec![PermissionKind::Microphone]
            }
        );

        // user flips the switch in system settings and comes back
        permissions.set(PermissionKind::Microphone, PermissionInfo::granted("settings"));
        screen.refresh_permissions();
        assert_eq!(screen.state(), &ScreenState::Live);
    }

    #[tokio::test]
    async fn test_missing_device_is_terminal_state() {
        let backend = Arc::new(FakeCameraBackend::new(vec![synthetic_front_camera()]));
        let permissions = Arc::new(FakePermissions::granted());
        let mut screen = open(ScreenConfig::default(), &backend, &permissions);

        screen.request_permissions().await;
        assert_eq!(screen.state(), &ScreenState::DeviceUnavailable);
        assert!(screen.last_error().unwrap_or("").contains("back"));

        let err = screen.press_shutter().await.unwrap_err();
        assert!(matches!(err, CameraError::InvalidState(_)));
    }

    // ── photo ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_photo_capture_enters_review() {
        let (mut screen, backend) = live_screen().await;

        let outcome = screen.press_shutter().await.expect("photo should succeed");
        let ShutterOutcome::PhotoCaptured { photo } = outcome else {
            panic!("Expected a captured photo, got {:?}", outcome);
        };

        assert_eq!(screen.state(), &ScreenState::PhotoReview(photo.clone()));
        assert!(!screen.session().is_active, "Preview inactive during review");
        assert!(screen.captured_asset().is_some());
        assert!(screen.toolbar().is_none());
        assert_eq!(backend.photo_calls().len(), 1);

        let review = screen.review().expect("review view");
        assert_eq!(review.dimensions, Some((4032, 3024)));
        assert!(!review.looping);
    }

    #[tokio::test]
    async fn test_photo_failure_stays_live() {
        let (mut screen, backend) = live_screen().await;
        backend.queue_photo_result(Err(CameraError::CaptureFailure("sensor busy".into())));

        let err = screen.press_shutter().await.unwrap_err();
        assert!(matches!(err, CameraError::CaptureFailure(_)));
        assert_eq!(screen.state(), &ScreenState::Live);
        assert!(screen.captured_asset().is_none());
        assert!(screen.session().is_active);
        assert!(screen.last_error().unwrap_or("").contains("sensor busy"));

        // the next press is a fresh attempt, nothing retried automatically
        assert_eq!(backend.photo_calls().len(), 1);
        screen.press_shutter().await.expect("second press should succeed");
        assert_eq!(backend.photo_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_dismiss_returns_to_live() {
        let (mut screen, _backend) = live_screen().await;
        screen.press_shutter().await.unwrap();

        screen.dismiss_review().expect("dismiss from review");
        assert_eq!(screen.state(), &ScreenState::Live);
        assert!(screen.captured_asset().is_none());
        assert!(screen.review().is_none());
        assert!(screen.session().is_active);
        assert!(!screen.session().is_recording);
    }

    #[tokio::test]
    async fn test_dismiss_outside_review_is_rejected() {
        let (mut screen, _backend) = live_screen().await;
        let err = screen.dismiss_review().unwrap_err();
        assert!(matches!(err, CameraError::InvalidState(_)));
        assert_eq!(screen.state(), &ScreenState::Live);
    }

    // ── recording ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_long_press_starts_recording() {
        let (mut screen, backend) = live_screen().await;

        screen.long_press_shutter().await.expect("recording should start");
        assert_eq!(screen.state(), &ScreenState::Recording);
        assert!(screen.session().is_recording);
        assert_eq!(backend.recordings_started(), 1);

        let toolbar = screen.toolbar().expect("controls while recording");
        assert!(toolbar.shutter.recording);
        assert_eq!(toolbar.shutter.fill_color(), "red");
    }

    #[tokio::test]
    async fn test_shutter_while_recording_stops_instead_of_capturing() {
        let (mut screen, backend) = live_screen().await;
        screen.long_press_shutter().await.unwrap();

        let outcome = screen.press_shutter().await.unwrap();
        assert_eq!(outcome, ShutterOutcome::StopRequested);
        assert_eq!(backend.stop_calls(), 1);
        assert!(backend.photo_calls().is_empty(), "No photo during recording");
        assert_eq!(
            screen.state(),
            &ScreenState::Recording,
            "Stays recording until the plugin reports completion"
        );
    }

    #[tokio::test]
    async fn test_recording_completion_enters_video_review() {
        let (mut screen, backend) = live_screen().await;
        screen.long_press_shutter().await.unwrap();
        screen.press_shutter().await.unwrap();

        assert!(backend.finish_recording(video("clip")));
        assert_eq!(screen.pump_events(), 1);

        assert_eq!(screen.state(), &ScreenState::VideoReview(video("clip")));
        assert!(!screen.session().is_recording);
        assert!(!screen.session().is_active);

        let review = screen.review().expect("review view");
        assert!(review.looping);
        assert!(review.native_controls);
    }

    #[tokio::test]
    async fn test_wait_for_event_applies_completion() {
        let (mut screen, backend) = live_screen().await;
        screen.long_press_shutter().await.unwrap();

        let plugin = backend.clone();
        let finisher = tokio::spawn(async move {
            tokio::task::yield_now().await;
            plugin.finish_recording(video("waited"))
        });

        screen.wait_for_event().await;
        assert!(finisher.await.unwrap());
        assert_eq!(screen.state(), &ScreenState::VideoReview(video("waited")));
    }

    #[tokio::test]
    async fn test_recording_error_returns_to_live() {
        let (mut screen, backend) = live_screen().await;
        screen.long_press_shutter().await.unwrap();

        assert!(backend.fail_recording("disk full"));
        screen.pump_events();

        assert_eq!(screen.state(), &ScreenState::Live);
        assert!(!screen.session().is_recording);
        assert!(screen.last_error().unwrap_or("").contains("disk full"));
    }

    #[tokio::test]
    async fn test_recording_start_failure_stays_live() {
        let (mut screen, backend) = live_screen().await;
        backend.fail_next_recording_start("encoder unavailable");

        let err = screen.long_press_shutter().await.unwrap_err();
        assert!(matches!(err, CameraError::RecordingFailure(_)));
        assert_eq!(screen.state(), &ScreenState::Live);
        assert!(!screen.session().is_recording);
    }

    #[tokio::test]
    async fn test_second_long_press_is_rejected() {
        let (mut screen, backend) = live_screen().await;
        screen.long_press_shutter().await.unwrap();

        let err = screen.long_press_shutter().await.unwrap_err();
        assert!(matches!(err, CameraError::InvalidState(_)));
        assert_eq!(backend.recordings_started(), 1);
    }

    #[tokio::test]
    async fn test_stale_completion_after_dismiss_is_ignored() {
        let (mut screen, backend) = live_screen().await;
        screen.long_press_shutter().await.unwrap();

        let sink = screen.event_sink();
        backend.finish_recording(video("first"));
        screen.pump_events();
        screen.dismiss_review().unwrap();

        sink.recording_finished(video("late"));
        sink.recording_failed("late error");
        screen.pump_events();
        assert_eq!(screen.state(), &ScreenState::Live);
        assert!(screen.last_error().is_none());
    }

    #[tokio::test]
    async fn test_flash_toggle_during_recording_applies_to_next_capture() {
        let (mut screen, backend) = live_screen().await;
        assert_eq!(screen.session().flash, FlashMode::Off);

        screen.long_press_shutter().await.unwrap();
        screen.toggle_flash().expect("flash toggle while recording");

        assert_eq!(screen.session().flash, FlashMode::On);
        assert_eq!(screen.state(), &ScreenState::Recording);
        assert_eq!(
            backend.active_recording().map(|o| o.flash),
            Some(FlashMode::Off),
            "In-progress recording keeps its flash"
        );

        backend.finish_recording(video("flash"));
        screen.pump_events();
        screen.dismiss_review().unwrap();
        screen.press_shutter().await.unwrap();

        assert_eq!(backend.photo_calls()[0].flash, FlashMode::On);
    }

    // ── toggles ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_device_toggle_resets_zoom_to_neutral() {
        let (mut screen, _backend) = live_screen().await;
        screen.begin_pinch().unwrap();
        screen.update_pinch(3.0).unwrap();
        assert!((screen.session().zoom_level - 6.0).abs() < 1e-4);

        screen.toggle_device_position().expect("front camera exists");
        assert_eq!(screen.session().device_position, DevicePosition::Front);
        assert_eq!(screen.session().zoom_level, 1.0);
        let caps = screen.capabilities().expect("front capabilities");
        assert_eq!(caps.max_zoom, 4.0);
        assert!(!caps.has_flash);

        screen.toggle_device_position().unwrap();
        assert_eq!(screen.session().zoom_level, 2.0);
        assert_eq!(screen.capabilities().unwrap().max_zoom, 10.0);
    }

    #[tokio::test]
    async fn test_device_toggle_without_device_keeps_current_camera() {
        let (mut screen, backend) = live_screen().await;
        screen.begin_pinch().unwrap();
        screen.update_pinch(2.0).unwrap();
        let zoom = screen.session().zoom_level;

        backend.set_devices(vec![camscreen::testing::synthetic_back_camera()]);
        let err = screen.toggle_device_position().unwrap_err();
        assert!(matches!(err, CameraError::DeviceUnavailable(_)));

        assert_eq!(screen.state(), &ScreenState::Live);
        assert!(screen.session().is_active);
        assert_eq!(screen.session().device_position, DevicePosition::Back);
        assert_eq!(screen.session().zoom_level, zoom, "Zoom untouched");
        assert_eq!(screen.configuration().unwrap().device_id, "synthetic-back-0");

        // the screen is still usable
        screen.toggle_flash().unwrap();
        screen.press_shutter().await.expect("capture on the kept camera");
    }

    #[tokio::test]
    async fn test_failed_device_toggle_during_recording_keeps_recording() {
        let backend = Arc::new(FakeCameraBackend::new(vec![
            camscreen::testing::synthetic_back_camera(),
        ]));
        let permissions = Arc::new(FakePermissions::granted());
        let mut screen = open(ScreenConfig::default(), &backend, &permissions);
        screen.request_permissions().await;
        screen.long_press_shutter().await.unwrap();

        assert!(screen.toggle_device_position().is_err());
        assert_eq!(screen.state(), &ScreenState::Recording);
        assert!(screen.session().is_recording);

        screen.press_shutter().await.unwrap();
        assert!(backend.finish_recording(video("kept")));
        screen.pump_events();
        assert_eq!(screen.state(), &ScreenState::VideoReview(video("kept")));
        assert!(screen.captured_asset().is_some());
    }

    #[tokio::test]
    async fn test_device_with_nan_zoom_range_can_pinch() {
        let mut device = camscreen::testing::synthetic_back_camera();
        device.min_zoom = f32::NAN;
        let backend = Arc::new(FakeCameraBackend::new(vec![device]));
        let permissions = Arc::new(FakePermissions::granted());
        let mut screen = open(ScreenConfig::default(), &backend, &permissions);
        screen.request_permissions().await;

        screen.begin_pinch().unwrap();
        let zoom = screen.update_pinch(0.1).unwrap();
        assert_eq!(zoom, 2.0, "Lower end falls back to the neutral zoom");
        assert!(screen.update_pinch(f32::NAN).unwrap().is_finite());
    }

    #[tokio::test]
    async fn test_flash_is_off_on_devices_without_flash() {
        let (mut screen, backend) = live_screen().await;
        screen.toggle_device_position().unwrap();
        screen.toggle_flash().unwrap();

        screen.press_shutter().await.unwrap();
        assert_eq!(backend.photo_calls()[0].flash, FlashMode::Off);
    }

    #[tokio::test]
    async fn test_shutter_sound_toggle_reaches_photo_options() {
        let (mut screen, backend) = live_screen().await;
        screen.toggle_shutter_sound().unwrap();
        screen.press_shutter().await.unwrap();
        assert!(!backend.photo_calls()[0].enable_shutter_sound);
    }

    #[tokio::test]
    async fn test_frame_rate_toggle_renegotiates_format() {
        let (mut screen, _backend) = live_screen().await;
        let camera = screen.configuration().unwrap();
        assert_eq!(camera.fps, 30);
        assert_eq!(camera.format.as_ref().map(|f| f.width), Some(4032));

        screen.toggle_frame_rate().unwrap();
        let camera = screen.configuration().unwrap();
        assert_eq!(screen.session().target_frame_rate, 60);
        assert_eq!(camera.fps, 60);
        assert_eq!(camera.format.as_ref().map(|f| f.width), Some(1920));

        screen.toggle_frame_rate().unwrap();
        assert_eq!(screen.configuration().unwrap().fps, 30);
    }

    #[tokio::test]
    async fn test_frame_rate_clamped_to_format() {
        let (mut screen, _backend) = live_screen().await;
        screen.toggle_device_position().unwrap();
        screen.toggle_frame_rate().unwrap();

        assert_eq!(screen.session().target_frame_rate, 60);
        assert_eq!(
            screen.configuration().unwrap().fps,
            30,
            "Front formats top out at 30fps"
        );
    }

    #[tokio::test]
    async fn test_hdr_follows_format_support() {
        let (mut screen, _backend) = live_screen().await;
        screen.toggle_hdr().unwrap();

        let camera = screen.configuration().unwrap();
        assert!(camera.photo_hdr);
        assert!(!camera.video_hdr, "4032x3024 has no video HDR");
    }

    #[tokio::test]
    async fn test_toggles_rejected_during_review() {
        let (mut screen, _backend) = live_screen().await;
        screen.press_shutter().await.unwrap();

        assert!(screen.toggle_flash().is_err());
        assert!(screen.toggle_device_position().is_err());
        assert!(screen.begin_pinch().is_err());
        assert!(screen.state().is_reviewing());
    }

    // ── code scanning ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_code_scan_mode() {
        let (mut screen, backend) = live_screen().await;
        screen.toggle_mode().expect("code scan enabled by default");
        assert_eq!(screen.session().mode, CaptureMode::CodeScan);

        let camera = screen.configuration().unwrap();
        assert!(!camera.photo && !camera.video);
        assert_eq!(camera.code_types, Some(vec![CodeType::Qr, CodeType::Ean13]));

        assert_eq!(screen.press_shutter().await.unwrap(), ShutterOutcome::Ignored);
        assert!(backend.photo_calls().is_empty());
        assert!(matches!(
            screen.long_press_shutter().await,
            Err(CameraError::Unsupported(_))
        ));

        screen.event_sink().codes_scanned(vec![ScannedCode {
            code_type: CodeType::Qr,
            value: Some("https://example.org".to_string()),
        }]);
        screen.pump_events();
        assert_eq!(screen.scanned_codes().len(), 1);

        screen.toggle_mode().unwrap();
        assert_eq!(screen.session().mode, CaptureMode::Camera);
        assert!(screen.scanned_codes().is_empty());
    }

    #[tokio::test]
    async fn test_codes_dropped_outside_scan_mode() {
        let (mut screen, _backend) = live_screen().await;
        screen.event_sink().codes_scanned(vec![ScannedCode {
            code_type: CodeType::Ean13,
            value: Some("4006381333931".to_string()),
        }]);
        screen.pump_events();
        assert!(screen.scanned_codes().is_empty());
    }

    #[tokio::test]
    async fn test_mode_toggle_not_allowed_while_recording() {
        let (mut screen, _backend) = live_screen().await;
        screen.long_press_shutter().await.unwrap();
        assert!(screen.toggle_mode().is_err());
        assert_eq!(screen.session().mode, CaptureMode::Camera);
    }

    // ── gestures and feature flags ───────────────────────────────────────

    #[tokio::test]
    async fn test_pinch_rebaselines_each_gesture() {
        let (mut screen, _backend) = live_screen().await;

        assert_eq!(screen.begin_pinch().unwrap(), 2.0);
        let zoom = screen.update_pinch(3.0).unwrap();
        assert!((zoom - 6.0).abs() < 1e-4);
        screen.end_pinch();

        let baseline = screen.begin_pinch().unwrap();
        assert!((baseline - 6.0).abs() < 1e-4);
        let zoom = screen.update_pinch(0.5).unwrap();
        assert!((zoom - 3.0).abs() < 1e-4);
        assert!((screen.configuration().unwrap().zoom - 3.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_disabled_features_are_rejected() {
        let mut config = ScreenConfig::default();
        config.features.zoom_gesture = false;
        config.features.code_scan = false;
        config.features.focus_gesture = false;
        let (mut screen, backend) = live_screen_with(config).await;

        assert!(matches!(screen.begin_pinch(), Err(CameraError::Unsupported(_))));
        assert!(matches!(screen.toggle_mode(), Err(CameraError::Unsupported(_))));
        assert!(screen.tap_to_focus(camscreen::types::FocusPoint::new(0.5, 0.5)).await.is_err());
        assert!(backend.focus_calls().is_empty());
        assert!(!screen.configuration().unwrap().zoom_gesture_enabled);
    }

    #[tokio::test]
    async fn test_tap_to_focus() {
        let (mut screen, backend) = live_screen().await;
        screen
            .tap_to_focus(camscreen::types::FocusPoint::new(1.5, 0.25))
            .await
            .unwrap();

        let calls = backend.focus_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].x, 1.0, "Focus point clamped into the preview");

        screen.toggle_device_position().unwrap();
        screen
            .tap_to_focus(camscreen::types::FocusPoint::new(0.5, 0.5))
            .await
            .expect("fixed-focus camera ignores taps");
        assert_eq!(backend.focus_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_serializes() {
        let (mut screen, _backend) = live_screen().await;
        backend_photo(&mut screen).await;

        let json = serde_json::to_value(screen.snapshot()).unwrap();
        assert_eq!(json["state"]["state"], "photo_review");
        assert_eq!(json["session"]["is_active"], false);
        assert!(json["toolbar"].is_null());
    }

    async fn backend_photo(screen: &mut CameraScreen) -> PhotoFile {
        match screen.press_shutter().await.unwrap() {
            ShutterOutcome::PhotoCaptured { photo } => photo,
            other => panic!("Expected photo, got {:?}", other),
        }
    }
}
