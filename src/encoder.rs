/// Image encoder
///
/// Turns a `RawImage` into an `ImageAsset`: checks the declared type,
/// reads the body fully into memory and writes a base64 data URI.

use base64::{engine::general_purpose::STANDARD, Engine};
use std::fs::File;
use std::io::Read;
use tokio::task;
use tracing::debug;

use crate::capture::{RawBody, RawImage};
use crate::error::EncodeError;
use crate::state::data::{ImageAsset, MimeType};

/// Encode a raw image, reading file bodies on the current thread
pub fn encode(raw: RawImage) -> Result<ImageAsset, EncodeError> {
    // Type check happens before any read
    let mime_type = MimeType::from_content_type(&raw.content_type)
        .ok_or_else(|| EncodeError::UnsupportedType(raw.content_type.clone()))?;

    debug!(name = %raw.name, %mime_type, "Encoding image");

    let bytes = match raw.body {
        RawBody::Memory(bytes) => bytes,
        RawBody::File(path) => {
            let mut buffer = Vec::new();
            File::open(&path)?.read_to_end(&mut buffer)?;
            buffer
        }
    };

    Ok(encode_bytes(&bytes, mime_type))
}

/// Encode off the UI thread
pub async fn encode_async(raw: RawImage) -> Result<ImageAsset, EncodeError> {
    // Spawn blocking because file reads are blocking I/O
    task::spawn_blocking(move || encode(raw))
        .await
        .map_err(|e| EncodeError::from(std::io::Error::other(e)))?
}

/// Encode bytes that are already known to be `mime_type`
pub fn encode_bytes(bytes: &[u8], mime_type: MimeType) -> ImageAsset {
    ImageAsset {
        data: format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes)),
        mime_type,
    }
}

/// Return the base64 payload of a data URI
///
/// Input without a `data:` prefix is returned unchanged.
pub fn strip_data_uri_prefix(data: &str) -> &str {
    if !data.starts_with("data:") {
        return data;
    }

    match data.split_once(',') {
        Some((_, payload)) => payload,
        None => data,
    }
}

/// Decode a data URI (or bare base64) back to bytes
pub fn decode_data_uri(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(strip_data_uri_prefix(data))
}
