//! Testing utilities for camscreen
//!
//! Fake collaborators and synthetic device tables for driving a
//! [`CameraScreen`](crate::screen::CameraScreen) offline.

pub mod fakes;
pub mod synthetic_data;

pub use fakes::{FakeCameraBackend, FakePermissions, MemoryUploadSink};
pub use synthetic_data::{synthetic_back_camera, synthetic_devices, synthetic_front_camera};
