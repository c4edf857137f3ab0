/// Error types for every stage of the editing flow
///
/// Each concern gets its own enum so the session can turn any of them
/// into a single user-facing message without losing the detailed cause
/// (which is logged where the error happens).

use std::sync::Arc;
use thiserror::Error;

/// Failure while turning a captured image into an `ImageAsset`
#[derive(Debug, Clone, Error)]
pub enum EncodeError {
    /// Declared content type is not jpeg, png or webp
    #[error("Unsupported file type '{0}'. Please use JPG, PNG, or WEBP.")]
    UnsupportedType(String),

    /// The image body could not be read
    #[error("Failed to read the image file. Please try again.")]
    Read(#[source] Arc<std::io::Error>),
}

impl From<std::io::Error> for EncodeError {
    fn from(err: std::io::Error) -> Self {
        EncodeError::Read(Arc::new(err))
    }
}

/// Camera could not be opened
#[cfg_attr(not(feature = "webcam-v4l"), allow(dead_code))]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraAccessError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera device found")]
    NoDevice,
    #[error("camera is already in use")]
    Busy,
    #[error("camera backend error: {0}")]
    Backend(String),
}

/// Failure anywhere in the webcam flow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Could not access your webcam. Please check your camera permissions.")]
    Camera(#[from] CameraAccessError),

    /// Capture was requested before the stream produced a frame
    #[error("The webcam has not produced a frame yet. Please try again.")]
    NoFrame,

    #[error("Failed to process the webcam photo. Please try again.")]
    Rasterize(String),
}

/// Failure of a single edit request against the remote model
///
/// `Display` is the stable, user-readable message. The detail carried by
/// the variants is for logs only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Well-formed response without any inline image part
    #[error("No image was generated. The model may have refused the request.")]
    NoImage,

    #[error("Failed to generate image with Gemini API. Please check your prompt or try again later.")]
    Transport(String),

    #[error("Failed to generate image with Gemini API. Please check your prompt or try again later.")]
    Status { status: u16, body: String },

    #[error("Failed to generate image with Gemini API. Please check your prompt or try again later.")]
    MalformedResponse(String),
}

/// Fatal startup configuration problem
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API_KEY environment variable is not set.")]
    MissingApiKey,
}

/// Failure writing the edited image to disk
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("The edited image could not be decoded: {0}")]
    Decode(String),

    #[error("Failed to save the photo: {0}")]
    Write(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERATION_FAILED: &str =
        "Failed to generate image with Gemini API. Please check your prompt or try again later.";

    #[test]
    fn test_generation_messages_are_stable() {
        let transport = GenerationError::Transport("connection reset".into());
        let status = GenerationError::Status { status: 500, body: "oops".into() };

        assert_eq!(transport.to_string(), GENERATION_FAILED);
        assert_eq!(status.to_string(), GENERATION_FAILED);
        assert!(GenerationError::NoImage.to_string().starts_with("No image was generated"));
    }

    #[test]
    fn test_camera_errors_collapse_to_one_message() {
        let denied: CaptureError = CameraAccessError::PermissionDenied.into();
        let missing: CaptureError = CameraAccessError::NoDevice.into();
        assert_eq!(denied.to_string(), missing.to_string());
    }
}
