/// Shared data structures for the editing session
///
/// These structs represent the data model that flows between
/// the capture layer, the API client and the UI layer.

use std::fmt;

/// Image formats accepted at ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MimeType {
    Jpeg,
    Png,
    Webp,
}

impl MimeType {
    /// All supported formats, in the order they are advertised
    pub const ALL: [MimeType; 3] = [MimeType::Png, MimeType::Jpeg, MimeType::Webp];

    /// Parse an exact content type (`image/png`, ...)
    ///
    /// Anything else, including parameters or different casing, is rejected.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mime| mime.as_str() == content_type)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Jpeg => "image/jpeg",
            MimeType::Png => "image/png",
            MimeType::Webp => "image/webp",
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, encoded user image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Base64 payload, normally with a `data:<mime>;base64,` prefix
    pub data: String,
    /// Always one of the supported formats
    pub mime_type: MimeType,
}

impl ImageAsset {
    /// The bare base64 payload without any data-URI prefix
    pub fn payload(&self) -> &str {
        crate::encoder::strip_data_uri_prefix(&self.data)
    }
}

/// The edited image returned by the model, as a data URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditResult(String);

impl EditResult {
    /// Build `data:<mime>;base64,<data>` from the response part
    pub fn from_inline(mime_type: &str, data: &str) -> Self {
        EditResult(format!("data:{};base64,{}", mime_type, data))
    }

    pub fn as_data_uri(&self) -> &str {
        &self.0
    }
}

/// Loading indicator shown over the result panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingState {
    pub active: bool,
    pub message: String,
}

impl LoadingState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn busy(message: impl Into<String>) -> Self {
        Self {
            active: true,
            message: message.into(),
        }
    }
}

/// Identifies one edit request so late responses can be recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub(crate) u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_parsing() {
        for mime in MimeType::ALL {
            assert_eq!(MimeType::from_content_type(mime.as_str()), Some(mime));
        }

        assert_eq!(MimeType::from_content_type("image/gif"), None);
        assert_eq!(MimeType::from_content_type("IMAGE/PNG"), None);
        assert_eq!(MimeType::from_content_type(""), None);
    }

    #[test]
    fn test_edit_result_data_uri() {
        let result = EditResult::from_inline("image/png", "Zm9v");
        assert_eq!(result.as_data_uri(), "data:image/png;base64,Zm9v");
    }

    #[test]
    fn test_payload_strips_prefix() {
        let asset = ImageAsset {
            data: "data:image/webp;base64,AAAA".to_string(),
            mime_type: MimeType::Webp,
        };
        assert_eq!(asset.payload(), "AAAA");

        let bare = ImageAsset {
            data: "AAAA".to_string(),
            mime_type: MimeType::Webp,
        };
        assert_eq!(bare.payload(), "AAAA");
    }
}
