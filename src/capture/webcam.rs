use chrono::Utc;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tokio::task;
use tracing::{debug, info, warn};

use super::camera::{CameraBackend, CameraStream, Facing, Frame};
use super::{RawBody, RawImage};
use crate::error::{CameraAccessError, CaptureError};

/// An acquired webcam with a live preview
///
/// The camera stays acquired exactly as long as this value lives:
/// `capture` and `cancel` consume it, and dropping it (for example when
/// the app shuts down) releases the stream as well.
pub struct Webcam {
    stream: Box<dyn CameraStream>,
}

impl Webcam {
    /// Request the front-facing camera
    pub fn start(backend: &dyn CameraBackend) -> Result<Self, CaptureError> {
        let stream = backend.open(Facing::User).map_err(|e| {
            warn!(error = %e, "Webcam access failed");
            CaptureError::from(e)
        })?;

        info!("📷 Webcam started");
        Ok(Webcam { stream })
    }

    /// Most recent frame for the live preview
    pub fn preview(&self) -> Option<Frame> {
        self.stream.latest_frame()
    }

    /// Take a still, rasterize it to PNG and release the camera
    pub fn capture(self) -> Result<RawImage, CaptureError> {
        let frame = self.stream.latest_frame().ok_or(CaptureError::NoFrame)?;
        let png = rasterize_png(&frame)?;

        info!(width = frame.width, height = frame.height, bytes = png.len(), "📸 Webcam photo captured");

        Ok(RawImage {
            name: format!("webcam-photo-{}.png", Utc::now().timestamp_millis()),
            content_type: "image/png".to_string(),
            body: RawBody::Memory(png),
        })
        // `self` drops here and stops the stream
    }

    /// Close the webcam without taking a photo
    pub fn cancel(self) {
        debug!("Webcam cancelled");
    }
}

/// Open the front camera off the UI thread
///
/// Backends may block for a while negotiating formats and allocating
/// buffers, so this runs on the blocking pool like file encoding does.
pub async fn start_async(backend: Arc<dyn CameraBackend>) -> Result<Webcam, CaptureError> {
    task::spawn_blocking(move || Webcam::start(backend.as_ref()))
        .await
        .map_err(|e| CaptureError::Camera(CameraAccessError::Backend(e.to_string())))?
}

/// A freshly opened webcam on its way back to the UI
///
/// Messages must be `Clone`, the webcam is not, so it travels in a shared
/// slot and whoever takes it first owns it. If nobody does, dropping the
/// last clone releases the camera.
#[derive(Debug, Clone)]
pub struct OpenedWebcam(Arc<Mutex<Option<Webcam>>>);

impl OpenedWebcam {
    pub fn new(webcam: Webcam) -> Self {
        OpenedWebcam(Arc::new(Mutex::new(Some(webcam))))
    }

    pub fn take(&self) -> Option<Webcam> {
        self.0.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl Drop for Webcam {
    fn drop(&mut self) {
        self.stream.stop();
        debug!("Webcam stream released");
    }
}

impl std::fmt::Debug for Webcam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Webcam").finish_non_exhaustive()
    }
}

/// Encode an RGBA frame as PNG
pub fn rasterize_png(frame: &Frame) -> Result<Vec<u8>, CaptureError> {
    let image = RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone())
        .ok_or_else(|| CaptureError::Rasterize(format!(
            "frame buffer of {} bytes does not match {}x{}",
            frame.rgba.len(),
            frame.width,
            frame.height
        )))?;

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| CaptureError::Rasterize(e.to_string()))?;

    Ok(png)
}
