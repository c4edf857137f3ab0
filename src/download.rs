/// Saving the edited photo to disk

use rfd::AsyncFileDialog;
use std::path::PathBuf;
use tracing::info;

use crate::encoder::decode_data_uri;
use crate::error::SaveError;
use crate::state::data::EditResult;

/// `id-photo-<epoch-ms>.png`
pub fn suggested_file_name(epoch_ms: i64) -> String {
    format!("id-photo-{}.png", epoch_ms)
}

/// Ask where to save, pre-filled with the timestamped name
pub async fn choose_destination(epoch_ms: i64) -> Option<PathBuf> {
    let handle = AsyncFileDialog::new()
        .set_title("Save ID Photo")
        .set_file_name(suggested_file_name(epoch_ms))
        .save_file()
        .await?;

    Some(handle.path().to_path_buf())
}

/// Decode the data URI and write the image bytes
pub async fn save(result: EditResult, path: PathBuf) -> Result<PathBuf, SaveError> {
    let bytes = decode_data_uri(result.as_data_uri()).map_err(|e| SaveError::Decode(e.to_string()))?;

    tokio::fs::write(&path, &bytes).await?;

    info!(path = %path.display(), bytes = bytes.len(), "💾 Saved ID photo");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggested_file_name() {
        assert_eq!(suggested_file_name(1700000000123), "id-photo-1700000000123.png");
    }

    #[tokio::test]
    async fn test_save_writes_decoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(suggested_file_name(1));

        let saved = save(EditResult::from_inline("image/png", "Zm9v"), path.clone())
            .await
            .unwrap();

        assert_eq!(saved, path);
        assert_eq!(std::fs::read(&path).unwrap(), b"foo");
    }

    #[tokio::test]
    async fn test_save_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let result = save(
            EditResult::from_inline("image/png", "not base64!!"),
            dir.path().join("x.png"),
        )
        .await;

        assert!(matches!(result, Err(SaveError::Decode(_))));
    }
}
