/// V4L2 webcam backend (Linux, `webcam-v4l` feature)
///
/// A capture thread owns the device and the mmap stream, decodes every
/// frame to RGBA and parks it in a shared slot for the preview. Stopping
/// sets a flag and joins the thread, which closes the device. Dequeues
/// time out so a stalled camera cannot hold up the join for long.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use image::ImageFormat;
use tracing::{debug, warn};
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream as _;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

use super::camera::{CameraBackend, CameraStream, Facing, Frame};
use crate::error::CameraAccessError;

/// Number of mmap buffers queued with the driver
const BUFFER_COUNT: u32 = 4;

/// Longest a dequeue may block before the stop flag is checked again
const DEQUEUE_TIMEOUT: Duration = Duration::from_millis(200);

/// EBUSY
const DEVICE_BUSY: i32 = 16;

pub struct V4lBackend {
    /// `/dev/video<N>` index used for the user-facing camera
    pub user_device: usize,
    pub environment_device: usize,
}

impl Default for V4lBackend {
    fn default() -> Self {
        // Laptops expose the built-in front camera first
        Self {
            user_device: 0,
            environment_device: 1,
        }
    }
}

impl CameraBackend for V4lBackend {
    fn open(&self, facing: Facing) -> Result<Box<dyn CameraStream>, CameraAccessError> {
        let index = match facing {
            Facing::User => self.user_device,
            Facing::Environment => self.environment_device,
        };

        let stop = Arc::new(AtomicBool::new(false));
        let latest: Arc<Mutex<Option<Frame>>> = Arc::new(Mutex::new(None));
        let (ready_tx, ready_rx) = mpsc::channel();

        let thread_stop = stop.clone();
        let thread_latest = latest.clone();
        let handle = thread::spawn(move || {
            capture_loop(index, thread_stop, thread_latest, ready_tx);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Box::new(V4lStream {
                stop,
                latest,
                handle: Some(handle),
            })),
            Ok(Err(err)) => {
                let _ = handle.join();
                Err(err)
            }
            Err(_) => {
                let _ = handle.join();
                Err(CameraAccessError::Backend("capture thread exited early".into()))
            }
        }
    }
}

struct V4lStream {
    stop: Arc<AtomicBool>,
    latest: Arc<Mutex<Option<Frame>>>,
    handle: Option<JoinHandle<()>>,
}

impl CameraStream for V4lStream {
    fn latest_frame(&self) -> Option<Frame> {
        self.latest.lock().ok().and_then(|slot| slot.clone())
    }

    fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("V4L2 capture thread panicked");
            }
        }
    }
}

fn access_error(err: io::Error) -> CameraAccessError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => CameraAccessError::PermissionDenied,
        io::ErrorKind::NotFound => CameraAccessError::NoDevice,
        _ if err.raw_os_error() == Some(DEVICE_BUSY) => CameraAccessError::Busy,
        _ => CameraAccessError::Backend(err.to_string()),
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted)
}

fn capture_loop(
    index: usize,
    stop: Arc<AtomicBool>,
    latest: Arc<Mutex<Option<Frame>>>,
    ready: mpsc::Sender<Result<(), CameraAccessError>>,
) {
    let device = match Device::new(index) {
        Ok(device) => device,
        Err(e) => {
            let _ = ready.send(Err(access_error(e)));
            return;
        }
    };

    // Prefer MJPG, most webcams deliver it at full resolution
    let format = match device.format().and_then(|mut fmt| {
        fmt.fourcc = FourCC::new(b"MJPG");
        device.set_format(&fmt)
    }) {
        Ok(format) => format,
        Err(e) => {
            let _ = ready.send(Err(access_error(e)));
            return;
        }
    };

    let mut stream = match MmapStream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(access_error(e)));
            return;
        }
    };

    stream.set_timeout(DEQUEUE_TIMEOUT);

    debug!(index, width = format.width, height = format.height, fourcc = %format.fourcc, "V4L2 stream open");
    let _ = ready.send(Ok(()));

    while !stop.load(Ordering::SeqCst) {
        let (buf, meta) = match stream.next() {
            Ok(next) => next,
            // No frame yet, go back and check the stop flag
            Err(e) if is_timeout(&e) => continue,
            Err(e) => {
                warn!(error = %e, "V4L2 frame read failed");
                break;
            }
        };

        let used = (meta.bytesused as usize).min(buf.len());
        if let Some(frame) = decode_frame(&buf[..used], format.width, format.height, format.fourcc) {
            if let Ok(mut slot) = latest.lock() {
                *slot = Some(frame);
            }
        }
    }
}

fn decode_frame(data: &[u8], width: u32, height: u32, fourcc: FourCC) -> Option<Frame> {
    if fourcc == FourCC::new(b"MJPG") {
        let rgba = image::load_from_memory_with_format(data, ImageFormat::Jpeg)
            .ok()?
            .to_rgba8();
        return Some(Frame {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        });
    }

    if fourcc == FourCC::new(b"YUYV") {
        return Some(Frame {
            width,
            height,
            rgba: yuyv_to_rgba(data, width, height)?,
        });
    }

    None
}

/// YUYV 4:2:2 to RGBA8 (BT.601)
fn yuyv_to_rgba(data: &[u8], width: u32, height: u32) -> Option<Vec<u8>> {
    let pixels = (width * height) as usize;
    if data.len() < pixels * 2 {
        return None;
    }

    let mut rgba = Vec::with_capacity(pixels * 4);
    for chunk in data[..pixels * 2].chunks_exact(4) {
        let (y0, u, y1, v) = (chunk[0] as f32, chunk[1] as f32 - 128.0, chunk[2] as f32, chunk[3] as f32 - 128.0);
        for y in [y0, y1] {
            let r = y + 1.402 * v;
            let g = y - 0.344 * u - 0.714 * v;
            let b = y + 1.772 * u;
            rgba.extend_from_slice(&[
                r.clamp(0.0, 255.0) as u8,
                g.clamp(0.0, 255.0) as u8,
                b.clamp(0.0, 255.0) as u8,
                255,
            ]);
        }
    }

    Some(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stalled_dequeue_is_retried() {
        assert!(is_timeout(&io::Error::new(io::ErrorKind::TimedOut, "VIDIOC_DQBUF")));
        assert!(is_timeout(&io::Error::from(io::ErrorKind::WouldBlock)));
        assert!(!is_timeout(&io::Error::from(io::ErrorKind::BrokenPipe)));
        assert!(DEQUEUE_TIMEOUT <= Duration::from_millis(500));
    }

    #[test]
    fn test_access_error_mapping() {
        assert_eq!(
            access_error(io::Error::from(io::ErrorKind::PermissionDenied)),
            CameraAccessError::PermissionDenied
        );
        assert_eq!(access_error(io::Error::from(io::ErrorKind::NotFound)), CameraAccessError::NoDevice);
        assert_eq!(access_error(io::Error::from_raw_os_error(DEVICE_BUSY)), CameraAccessError::Busy);
    }

    #[test]
    fn test_yuyv_gray() {
        let rgba = yuyv_to_rgba(&[128, 128, 128, 128], 2, 1).unwrap();
        assert_eq!(rgba, vec![128, 128, 128, 255, 128, 128, 128, 255]);
        assert!(yuyv_to_rgba(&[0; 2], 2, 1).is_none());
    }
}
