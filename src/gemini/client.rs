use tracing::{error, info};

use super::wire::{GenerateRequest, GenerateResponse};
use crate::config::Config;
use crate::error::GenerationError;
use crate::state::data::{EditResult, ImageAsset};

/// Client for the Gemini image model
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted,
/// so every background task gets its own handle.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        let model_path = if config.model.starts_with("models/") {
            config.model.clone()
        } else {
            format!("models/{}", config.model)
        };

        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            endpoint: format!("{}/{}:generateContent", config.api_base, model_path),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one image plus one instruction and return the edited image
    ///
    /// Single attempt: no retries, no timeout, no caching. Every failure
    /// is logged with its cause and returned as a `GenerationError`.
    pub async fn edit(
        &self,
        image: &ImageAsset,
        instruction: &str,
    ) -> Result<EditResult, GenerationError> {
        info!(mime = %image.mime_type, instruction_len = instruction.len(), "🎨 Sending edit request");

        let result = self.send(image, instruction).await;

        match &result {
            Ok(_) => info!("✅ Edited image received"),
            Err(e) => error!(error = ?e, "Gemini API error"),
        }

        result
    }

    async fn send(
        &self,
        image: &ImageAsset,
        instruction: &str,
    ) -> Result<EditResult, GenerationError> {
        let request = GenerateRequest::image_edit(image.payload(), image.mime_type.as_str(), instruction);

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        parse_response(&body)
    }
}

/// Turn a decoded response into the edited image
pub fn parse_response(response: &GenerateResponse) -> Result<EditResult, GenerationError> {
    let inline = response.first_image().ok_or(GenerationError::NoImage)?;
    Ok(EditResult::from_inline(&inline.mime_type, &inline.data))
}
