/// Camera backend abstraction
///
/// The webcam flow only needs three things from a camera: open a stream,
/// peek at the most recent frame, and stop. Backends implement these two
/// traits; `default_backend` picks the one compiled in.

use std::sync::Arc;

use crate::error::CameraAccessError;

/// Which camera to prefer when several are present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Front-facing (selfie) camera
    User,
    /// Rear camera
    #[cfg_attr(not(feature = "webcam-v4l"), allow(dead_code))]
    Environment,
}

/// A single RGBA8 frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA, `width * height * 4` bytes
    pub rgba: Vec<u8>,
}

/// Something that can hand out camera streams
pub trait CameraBackend: Send + Sync {
    /// Request access to a camera and start streaming
    fn open(&self, facing: Facing) -> Result<Box<dyn CameraStream>, CameraAccessError>;
}

/// A live camera stream
///
/// Holding one means the device is acquired. `stop` releases it and
/// must be safe to call more than once.
pub trait CameraStream: Send {
    fn latest_frame(&self) -> Option<Frame>;
    fn stop(&mut self);
}

/// Backend used when no camera support is compiled in
#[cfg_attr(feature = "webcam-v4l", allow(dead_code))]
#[derive(Debug, Default)]
pub struct UnavailableBackend;

impl CameraBackend for UnavailableBackend {
    fn open(&self, _facing: Facing) -> Result<Box<dyn CameraStream>, CameraAccessError> {
        Err(CameraAccessError::NoDevice)
    }
}

/// Get the camera backend for this build
pub fn default_backend() -> Arc<dyn CameraBackend> {
    #[cfg(feature = "webcam-v4l")]
    {
        Arc::new(super::v4l::V4lBackend::default())
    }

    #[cfg(not(feature = "webcam-v4l"))]
    {
        Arc::new(UnavailableBackend)
    }
}
