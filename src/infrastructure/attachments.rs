#[cfg(test)]
#[path = "attachments_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use tokio::fs;

use crate::domain::models::ImageAttachment;

/// Media type for an image file, inferred from its extension.
pub fn mime_type_for(file_path: &path::Path) -> Option<&'static str> {
    let ext = file_path.extension()?.to_str()?.to_lowercase();
    let mime_type = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "svg" => "image/svg+xml",
        _ => return None,
    };

    return Some(mime_type);
}

/// Reads an image file into an attachment. Files that are not images are
/// ignored and return `None`.
pub async fn load_image(file_path: &path::Path) -> Result<Option<ImageAttachment>> {
    let Some(mime_type) = mime_type_for(file_path) else {
        tracing::debug!(path = ?file_path, "ignoring non image file");
        return Ok(None);
    };

    let bytes = fs::read(file_path).await?;
    tracing::debug!(path = ?file_path, mime_type, len = bytes.len(), "loaded image");

    return Ok(Some(ImageAttachment::from_bytes(&bytes, mime_type)));
}

/// Terminals deliver a file dropped onto them as pasted text. Returns the path
/// when the pasted text names an existing image file.
pub fn pasted_image_path(text: &str) -> Option<path::PathBuf> {
    let mut cleaned = text.trim();
    if cleaned.contains('\n') {
        return None;
    }

    for quote in ['\'', '"'] {
        if cleaned.len() >= 2 && cleaned.starts_with(quote) && cleaned.ends_with(quote) {
            cleaned = &cleaned[1..cleaned.len() - 1];
        }
    }
    let cleaned = cleaned.strip_prefix("file://").unwrap_or(cleaned);
    let file_path = path::PathBuf::from(cleaned.replace("\\ ", " "));

    if mime_type_for(&file_path).is_none() || !file_path.is_file() {
        return None;
    }

    return Some(file_path);
}
