use iced::widget::{button, column, container, horizontal_space, image, row, text, Column};
use iced::{Alignment, Color, Element, Length, Subscription, Task, Theme};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod capture;
mod config;
mod download;
mod encoder;
mod error;
mod gemini;
mod state;
mod ui;

use capture::camera::{self, CameraBackend};
use capture::webcam::{self as webcam_capture, OpenedWebcam, Webcam};
use capture::CaptureSource;
use config::Config;
use error::{CaptureError, EncodeError, GenerationError};
use gemini::GeminiClient;
use state::data::{EditResult, ImageAsset, RequestToken};
use state::session::{EditRequest, Phase, Session};

/// Webcam preview refresh interval (~15 fps)
const PREVIEW_INTERVAL: Duration = Duration::from_millis(66);

/// Main application state
struct IdPhotoStudio {
    /// The editing session (single source of truth)
    session: Session,
    /// Remote image model client
    client: GeminiClient,
    /// Camera backend compiled into this build
    camera: Arc<dyn CameraBackend>,
    /// Live webcam, present only while the capture card is open
    webcam: Option<Webcam>,
    /// Camera open in flight (request id)
    webcam_pending: Option<u64>,
    webcam_requests: u64,
    webcam_preview: Option<image::Handle>,
    /// Decoded images for the two panels
    original_handle: Option<image::Handle>,
    edited_handle: Option<image::Handle>,
    /// Prompt field contents
    prompt: String,
    dark_mode: bool,
    /// Outcome of the last save, shown under the editor
    notice: Option<String>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    ToggleDarkMode,
    /// User clicked the upload area
    PickFile,
    FilePicked(Option<PathBuf>),
    /// Background encoding finished (file or webcam)
    ImageEncoded(Result<ImageAsset, EncodeError>),
    StartWebcam,
    WebcamStarted(u64, Result<OpenedWebcam, CaptureError>),
    WebcamTick,
    TakePhoto,
    CancelWebcam,
    /// A remote edit finished; the token identifies which request
    EditFinished(RequestToken, Result<EditResult, GenerationError>),
    PromptChanged(String),
    SubmitPrompt,
    SubmitPreset(&'static str),
    Download,
    DownloadDestination(Option<PathBuf>),
    DownloadFinished(Result<PathBuf, String>),
    StartOver,
    DismissError,
}

impl IdPhotoStudio {
    /// Create a new instance of the application
    fn new(config: Config) -> (Self, Task<Message>) {
        let dark_mode = prefers_dark(dark_light::detect());
        let studio = Self::build(&config, camera::default_backend(), dark_mode);
        info!(endpoint = %studio.client.endpoint(), dark_mode, "🎨 ID Photo Studio initialized");

        (studio, Task::none())
    }

    fn build(config: &Config, camera: Arc<dyn CameraBackend>, dark_mode: bool) -> Self {
        IdPhotoStudio {
            session: Session::new(),
            client: GeminiClient::new(config),
            camera,
            webcam: None,
            webcam_pending: None,
            webcam_requests: 0,
            webcam_preview: None,
            original_handle: None,
            edited_handle: None,
            prompt: String::new(),
            dark_mode,
            notice: None,
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ToggleDarkMode => {
                self.dark_mode = !self.dark_mode;
                Task::none()
            }
            Message::PickFile => Task::perform(capture::file::pick_image_file(), Message::FilePicked),
            Message::FilePicked(Some(path)) => {
                info!(path = %path.display(), "📁 File selected");
                let raw = CaptureSource::FilePick(path).into_raw();
                Task::perform(encoder::encode_async(raw), Message::ImageEncoded)
            }
            Message::FilePicked(None) => Task::none(),
            Message::ImageEncoded(encoded) => {
                let request = self.session.select_image(encoded);
                self.refresh_images();
                match request {
                    Some(request) => {
                        self.prompt.clear();
                        self.notice = None;
                        self.dispatch(request)
                    }
                    None => Task::none(),
                }
            }
            Message::StartWebcam => {
                // Only one stream at a time, counting one still being opened
                if self.webcam.is_some() || self.webcam_pending.is_some() {
                    return Task::none();
                }

                self.webcam_requests += 1;
                let id = self.webcam_requests;
                self.webcam_pending = Some(id);

                Task::perform(webcam_capture::start_async(self.camera.clone()), move |opened| {
                    Message::WebcamStarted(id, opened.map(OpenedWebcam::new))
                })
            }
            Message::WebcamStarted(id, opened) => {
                if self.webcam_pending != Some(id) {
                    // Cancelled while opening
                    if let Some(webcam) = opened.ok().and_then(|opened| opened.take()) {
                        webcam.cancel();
                    }
                    return Task::none();
                }
                self.webcam_pending = None;

                match opened {
                    Ok(opened) => self.webcam = opened.take(),
                    Err(e) => self.session.report_capture_error(&e),
                }
                Task::none()
            }
            Message::WebcamTick => {
                if let Some(frame) = self.webcam.as_ref().and_then(Webcam::preview) {
                    self.webcam_preview = Some(image::Handle::from_rgba(frame.width, frame.height, frame.rgba));
                }
                Task::none()
            }
            Message::TakePhoto => {
                let Some(webcam) = self.webcam.take() else {
                    return Task::none();
                };
                self.webcam_preview = None;

                match webcam.capture() {
                    Ok(raw) => {
                        let raw = CaptureSource::WebcamCapture(raw).into_raw();
                        Task::perform(encoder::encode_async(raw), Message::ImageEncoded)
                    }
                    Err(e) => {
                        warn!(error = %e, "Webcam capture failed");
                        self.session.report_capture_error(&e);
                        Task::none()
                    }
                }
            }
            Message::CancelWebcam => {
                self.webcam_pending = None;
                if let Some(webcam) = self.webcam.take() {
                    webcam.cancel();
                }
                self.webcam_preview = None;
                Task::none()
            }
            Message::EditFinished(token, outcome) => {
                if self.session.complete_edit(token, outcome) {
                    self.refresh_images();
                }
                Task::none()
            }
            Message::PromptChanged(value) => {
                self.prompt = value;
                Task::none()
            }
            Message::SubmitPrompt => {
                let prompt = std::mem::take(&mut self.prompt);
                match self.session.submit_prompt(&prompt) {
                    Some(request) => self.dispatch(request),
                    None => {
                        // Nothing was sent, keep what the user typed
                        self.prompt = prompt;
                        Task::none()
                    }
                }
            }
            Message::SubmitPreset(preset) => match self.session.submit_prompt(preset) {
                Some(request) => self.dispatch(request),
                None => Task::none(),
            },
            Message::Download => {
                if !self.can_download() {
                    return Task::none();
                }
                Task::perform(
                    download::choose_destination(Utc::now().timestamp_millis()),
                    Message::DownloadDestination,
                )
            }
            Message::DownloadDestination(Some(path)) => {
                let Some(result) = self.session.edited().cloned() else {
                    return Task::none();
                };
                Task::perform(
                    async move { download::save(result, path).await.map_err(|e| e.to_string()) },
                    Message::DownloadFinished,
                )
            }
            Message::DownloadDestination(None) => Task::none(),
            Message::DownloadFinished(result) => {
                self.notice = Some(match result {
                    Ok(path) => format!("✅ Saved to {}", path.display()),
                    Err(e) => {
                        error!(error = %e, "Save failed");
                        e
                    }
                });
                Task::none()
            }
            Message::StartOver => {
                self.session.start_over();
                self.webcam_pending = None;
                if let Some(webcam) = self.webcam.take() {
                    webcam.cancel();
                }
                self.webcam_preview = None;
                self.prompt.clear();
                self.notice = None;
                self.refresh_images();
                Task::none()
            }
            Message::DismissError => {
                self.session.dismiss_error();
                Task::none()
            }
        }
    }

    /// A finished result exists and no request is running
    fn can_download(&self) -> bool {
        self.session.edited().is_some() && !self.session.loading().active
    }

    /// Send an edit request in the background
    fn dispatch(&self, request: EditRequest) -> Task<Message> {
        let client = self.client.clone();
        let EditRequest {
            token,
            image,
            instruction,
        } = request;

        Task::perform(
            async move { client.edit(&image, &instruction).await },
            move |outcome| Message::EditFinished(token, outcome),
        )
    }

    /// Rebuild the panel images from the session
    fn refresh_images(&mut self) {
        self.original_handle = self
            .session
            .original()
            .and_then(|asset| handle_from_data_uri(&asset.data));
        self.edited_handle = self
            .session
            .edited()
            .and_then(|result| handle_from_data_uri(result.as_data_uri()));
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let header = row![
            text("AI ID Photo Studio").size(28),
            horizontal_space(),
            button(text(if self.dark_mode { "☀ Light" } else { "🌙 Dark" }))
                .style(button::text)
                .on_press(Message::ToggleDarkMode),
        ]
        .align_y(Alignment::Center)
        .padding([16, 32]);

        let camera_open = self.webcam.is_some() || self.webcam_pending.is_some();
        let body: Element<Message> = match (camera_open, self.session.phase()) {
            (true, _) => ui::webcam::modal(self.webcam_preview.as_ref()),
            (false, Phase::Empty) => ui::input::view(),
            (false, Phase::Ready | Phase::Editing) => ui::editor::view(
                &self.session,
                self.original_handle.as_ref(),
                self.edited_handle.as_ref(),
                &self.prompt,
            ),
        };

        let mut content: Column<Message> = column![body].spacing(16).align_x(Alignment::Center);

        if let Some(notice) = &self.notice {
            content = content.push(text(notice).size(14));
        }

        // Errors are hidden while a request is running
        if let Some(message) = self.session.error().filter(|_| !self.session.loading().active) {
            content = content.push(error_banner(message));
        }

        column![
            header,
            container(content)
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x(Length::Fill)
                .padding(24),
        ]
        .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        if self.dark_mode {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    /// Poll the webcam while its card is open
    fn subscription(&self) -> Subscription<Message> {
        if self.webcam.is_some() {
            iced::time::every(PREVIEW_INTERVAL).map(|_| Message::WebcamTick)
        } else {
            Subscription::none()
        }
    }
}

fn error_banner(message: &str) -> Element<'_, Message> {
    container(
        row![
            text("Error: ").size(15),
            text(message).size(15).width(Length::Fill),
            button("×").style(button::text).on_press(Message::DismissError),
        ]
        .spacing(6)
        .align_y(Alignment::Center),
    )
    .padding([10, 16])
    .max_width(720)
    .style(|theme: &Theme| {
        let danger = theme.extended_palette().danger.weak;
        container::Style {
            background: Some(danger.color.into()),
            text_color: Some(danger.text),
            border: iced::Border {
                color: Color::from_rgb(0.9, 0.3, 0.3),
                width: 1.0,
                radius: 8.0.into(),
            },
            ..container::Style::default()
        }
    })
    .into()
}

/// Start in the desktop's color scheme, dark when it has no preference
fn prefers_dark(mode: dark_light::Mode) -> bool {
    !matches!(mode, dark_light::Mode::Light)
}

/// Decode a data URI into an image handle for display
fn handle_from_data_uri(data: &str) -> Option<image::Handle> {
    match encoder::decode_data_uri(data) {
        Ok(bytes) => Some(image::Handle::from_bytes(bytes)),
        Err(e) => {
            warn!(error = %e, "Could not decode image for display");
            None
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Missing credentials are fatal: the app never becomes interactive
    let config = Config::from_env().inspect_err(|e| error!(error = %e, "Startup configuration error"))?;

    iced::application("ID Photo Studio", IdPhotoStudio::update, IdPhotoStudio::view)
        .theme(IdPhotoStudio::theme)
        .subscription(IdPhotoStudio::subscription)
        .centered()
        .run_with(move || IdPhotoStudio::new(config))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture::camera::{CameraStream, Facing, Frame};
    use error::CameraAccessError;
    use state::data::MimeType;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Camera that counts opens and releases
    #[derive(Default)]
    struct CountingCamera {
        deny: bool,
        opens: AtomicUsize,
        stops: Arc<AtomicUsize>,
    }

    struct CountingStream {
        stops: Arc<AtomicUsize>,
        stopped: bool,
    }

    impl CameraBackend for CountingCamera {
        fn open(&self, _facing: Facing) -> Result<Box<dyn CameraStream>, CameraAccessError> {
            if self.deny {
                return Err(CameraAccessError::PermissionDenied);
            }
            self.opens.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(CountingStream {
                stops: self.stops.clone(),
                stopped: false,
            }))
        }
    }

    impl CameraStream for CountingStream {
        fn latest_frame(&self) -> Option<Frame> {
            Some(Frame {
                width: 1,
                height: 1,
                rgba: vec![255; 4],
            })
        }

        fn stop(&mut self) {
            if !self.stopped {
                self.stopped = true;
                self.stops.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn studio(camera: CountingCamera) -> (IdPhotoStudio, Arc<CountingCamera>) {
        let config = Config {
            api_key: "test-key".to_string(),
            model: config::DEFAULT_MODEL.to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
        };
        let camera = Arc::new(camera);
        (IdPhotoStudio::build(&config, camera.clone(), true), camera)
    }

    /// Run the open the app asked for and deliver its outcome
    async fn finish_open(app: &mut IdPhotoStudio, id: u64) {
        let opened = webcam_capture::start_async(app.camera.clone()).await;
        let _ = app.update(Message::WebcamStarted(id, opened.map(OpenedWebcam::new)));
    }

    fn photo() -> ImageAsset {
        encoder::encode_bytes(&[1, 2, 3], MimeType::Png)
    }

    #[tokio::test]
    async fn test_one_webcam_at_a_time() {
        let (mut app, camera) = studio(CountingCamera::default());

        let _ = app.update(Message::StartWebcam);
        let id = app.webcam_pending.unwrap();
        let _ = app.update(Message::StartWebcam);
        assert_eq!(app.webcam_pending, Some(id));

        finish_open(&mut app, id).await;
        assert!(app.webcam.is_some());
        assert!(app.webcam_pending.is_none());

        let _ = app.update(Message::StartWebcam);
        assert!(app.webcam_pending.is_none());
        assert_eq!(camera.opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_start_over_releases_webcam() {
        let (mut app, camera) = studio(CountingCamera::default());
        let _ = app.update(Message::StartWebcam);
        let id = app.webcam_pending.unwrap();
        finish_open(&mut app, id).await;
        let _ = app.update(Message::WebcamTick);
        assert!(app.webcam_preview.is_some());

        let _ = app.update(Message::StartOver);

        assert!(app.webcam.is_none());
        assert!(app.webcam_preview.is_none());
        assert_eq!(camera.stops.load(Ordering::SeqCst), 1);
        assert_eq!(app.session.phase(), Phase::Empty);
    }

    #[tokio::test]
    async fn test_webcam_opened_after_cancel_is_released() {
        let (mut app, camera) = studio(CountingCamera::default());
        let _ = app.update(Message::StartWebcam);
        let id = app.webcam_pending.unwrap();

        let _ = app.update(Message::CancelWebcam);
        finish_open(&mut app, id).await;

        assert!(app.webcam.is_none());
        assert_eq!(camera.opens.load(Ordering::SeqCst), 1);
        assert_eq!(camera.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_denied_webcam_stays_on_input_screen() {
        let (mut app, camera) = studio(CountingCamera {
            deny: true,
            ..CountingCamera::default()
        });

        let _ = app.update(Message::StartWebcam);
        let id = app.webcam_pending.unwrap();
        finish_open(&mut app, id).await;

        assert!(app.webcam.is_none());
        assert!(app.webcam_pending.is_none());
        assert!(app.session.error().unwrap().contains("webcam"));
        assert_eq!(app.session.phase(), Phase::Empty);
        assert_eq!(camera.stops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_download_needs_finished_result() {
        let (mut app, _) = studio(CountingCamera::default());
        assert!(!app.can_download());

        let _ = app.update(Message::ImageEncoded(Ok(photo())));
        assert!(app.session.loading().active);
        assert!(!app.can_download());

        let result = EditResult::from_inline("image/png", "Zm9v");
        let _ = app.update(Message::EditFinished(RequestToken(1), Ok(result)));
        assert!(app.can_download());

        let _ = app.update(Message::SubmitPreset(state::instruction::PRESET_PROMPTS[0]));
        assert!(!app.can_download());
    }

    #[test]
    fn test_stale_edit_leaves_panels_alone() {
        let (mut app, _) = studio(CountingCamera::default());
        let _ = app.update(Message::ImageEncoded(Ok(photo())));
        let _ = app.update(Message::ImageEncoded(Ok(photo())));
        assert!(app.original_handle.is_some());

        let stale = EditResult::from_inline("image/png", "c3RhbGU=");
        let _ = app.update(Message::EditFinished(RequestToken(1), Ok(stale)));
        assert!(app.edited_handle.is_none());
        assert!(app.session.loading().active);

        let fresh = EditResult::from_inline("image/png", "ZnJlc2g=");
        let _ = app.update(Message::EditFinished(RequestToken(2), Ok(fresh)));
        assert!(app.edited_handle.is_some());
        assert!(!app.session.loading().active);
    }

    #[test]
    fn test_initial_theme_follows_desktop() {
        assert!(prefers_dark(dark_light::Mode::Dark));
        assert!(!prefers_dark(dark_light::Mode::Light));
        assert!(prefers_dark(dark_light::Mode::Default));
    }
}
