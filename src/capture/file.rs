use rfd::AsyncFileDialog;
use std::path::{Path, PathBuf};

use super::{RawBody, RawImage};

/// Extensions offered by the picker (a hint only, the encoder enforces types)
const PICKER_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Advertised upload size, not enforced
pub const SIZE_HINT: &str = "PNG, JPG, or WEBP (max 10MB)";

/// Show the native file chooser and return the selected path
pub async fn pick_image_file() -> Option<PathBuf> {
    let handle = AsyncFileDialog::new()
        .set_title("Select a Photo")
        .add_filter("Images", &PICKER_EXTENSIONS)
        .pick_file()
        .await?;

    Some(handle.path().to_path_buf())
}

/// Content type a file declares, derived from its extension
///
/// Unknown extensions declare `application/octet-stream` so the
/// encoder rejects them.
pub fn declared_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Wrap a picked path without reading it
pub fn raw_image_from_path(path: PathBuf) -> RawImage {
    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    RawImage {
        name,
        content_type: declared_content_type(&path).to_string(),
        body: RawBody::File(path),
    }
}
