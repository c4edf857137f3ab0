/// Image capture module
///
/// Two producers feed the encoder with the same contract:
/// - Native file picker (file.rs)
/// - Webcam snapshot (webcam.rs, on top of the camera backends in camera.rs)

pub mod camera;
pub mod file;
pub mod webcam;

#[cfg(feature = "webcam-v4l")]
pub mod v4l;

use std::path::PathBuf;

/// Where the bytes of a raw image live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBody {
    /// Still on disk, read by the encoder
    File(PathBuf),
    /// Already in memory (webcam frames)
    Memory(Vec<u8>),
}

/// A user-supplied image before validation
///
/// `content_type` is what the source declares, not what the bytes contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub name: String,
    pub content_type: String,
    pub body: RawBody,
}

/// The two ways a photo enters the app
#[derive(Debug, Clone)]
pub enum CaptureSource {
    FilePick(PathBuf),
    WebcamCapture(RawImage),
}

impl CaptureSource {
    /// Normalize either source to a `RawImage`
    pub fn into_raw(self) -> RawImage {
        match self {
            CaptureSource::FilePick(path) => file::raw_image_from_path(path),
            CaptureSource::WebcamCapture(raw) => raw,
        }
    }
}
