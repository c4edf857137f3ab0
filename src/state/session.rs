/// Editing session state machine
///
/// The session owns the original/edited pair, the loading flag and the
/// last error. Transitions are plain synchronous methods; a transition that
/// needs the remote model returns an `EditRequest`, and the caller feeds
/// the outcome back through `complete_edit` together with the request's
/// token. Outcomes carrying any other token are stale and ignored.

use tracing::{debug, info};

use super::data::{EditResult, ImageAsset, LoadingState, RequestToken};
use super::instruction;
use crate::error::{CaptureError, EncodeError, GenerationError};

pub const INITIAL_LOADING_MESSAGE: &str = "AI is creating your ID photo...";
pub const PROMPT_LOADING_MESSAGE: &str = "Applying your changes...";
pub const NO_IMAGE_MESSAGE: &str = "Please upload an image first.";

/// Where the session is, derived from its fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No original image
    Empty,
    /// Original present, nothing in flight
    Ready,
    /// An edit request is in flight
    Editing,
}

/// Work the caller must send to the remote model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub token: RequestToken,
    pub image: ImageAsset,
    pub instruction: String,
}

#[derive(Debug, Default)]
pub struct Session {
    original: Option<ImageAsset>,
    edited: Option<EditResult>,
    loading: LoadingState,
    error: Option<String>,
    /// Last token handed out; only ever grows
    last_token: u64,
    /// Token of the request whose response is still awaited
    pending: Option<RequestToken>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match (&self.original, self.loading.active) {
            (None, _) => Phase::Empty,
            (Some(_), true) => Phase::Editing,
            (Some(_), false) => Phase::Ready,
        }
    }

    pub fn original(&self) -> Option<&ImageAsset> {
        self.original.as_ref()
    }

    pub fn edited(&self) -> Option<&EditResult> {
        self.edited.as_ref()
    }

    pub fn loading(&self) -> &LoadingState {
        &self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// A new image arrived from the encoder
    ///
    /// On success the previous result and error are cleared and the
    /// automatic ID-photo edit is issued. Any edit still in flight becomes
    /// stale. On failure only the error changes.
    pub fn select_image(&mut self, encoded: Result<ImageAsset, EncodeError>) -> Option<EditRequest> {
        match encoded {
            Ok(image) => {
                info!(mime = %image.mime_type, "🖼️  Original image selected");
                self.edited = None;
                self.error = None;
                self.original = Some(image.clone());
                Some(self.begin_edit(image, INITIAL_LOADING_MESSAGE, instruction::INITIAL_ID_PHOTO.to_string()))
            }
            Err(e) => {
                debug!(error = ?e, "Image selection failed");
                self.error = Some(e.to_string());
                None
            }
        }
    }

    /// The user asked for a modification
    ///
    /// Without an original image nothing is issued and the user is told to
    /// upload first. Blank text is ignored; anything else is sent exactly as
    /// typed. The request always edits the original image, never the
    /// previous result.
    pub fn submit_prompt(&mut self, text: &str) -> Option<EditRequest> {
        if text.trim().is_empty() {
            return None;
        }

        let Some(image) = self.original.clone() else {
            self.error = Some(NO_IMAGE_MESSAGE.to_string());
            return None;
        };

        self.error = None;
        Some(self.begin_edit(image, PROMPT_LOADING_MESSAGE, instruction::user_modification(text)))
    }

    /// Deliver the outcome of an edit request
    ///
    /// Returns `false` when the outcome was stale and nothing changed.
    pub fn complete_edit(
        &mut self,
        token: RequestToken,
        outcome: Result<EditResult, GenerationError>,
    ) -> bool {
        if self.pending != Some(token) {
            debug!(%token, pending = ?self.pending, "Discarding stale edit response");
            return false;
        }

        match outcome {
            Ok(result) => {
                info!(%token, "✅ Edit applied");
                self.edited = Some(result);
            }
            Err(e) => {
                // Keep the last good result so the user can retry from it
                self.error = Some(e.to_string());
            }
        }

        self.pending = None;
        self.loading = LoadingState::idle();
        true
    }

    /// Back to an empty session; outstanding responses become stale
    pub fn start_over(&mut self) {
        info!("🔄 Starting over");
        self.original = None;
        self.edited = None;
        self.error = None;
        self.loading = LoadingState::idle();
        self.pending = None;
        self.last_token += 1;
    }

    /// The webcam flow failed before producing an image
    pub fn report_capture_error(&mut self, error: &CaptureError) {
        self.error = Some(error.to_string());
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn next_token(&mut self) -> RequestToken {
        self.last_token += 1;
        RequestToken(self.last_token)
    }

    fn begin_edit(&mut self, image: ImageAsset, message: &str, instruction: String) -> EditRequest {
        let token = self.next_token();
        self.pending = Some(token);
        self.loading = LoadingState::busy(message);

        EditRequest {
            token,
            image,
            instruction,
        }
    }
}
