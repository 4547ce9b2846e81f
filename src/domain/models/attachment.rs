#[cfg(test)]
#[path = "attachment_test.rs"]
mod tests;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_derive::Deserialize;
use serde_derive::Serialize;

/// An image held in memory as base64, ready to be sent inline to the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttachment {
    pub data: String,
    pub mime_type: String,
}

impl ImageAttachment {
    /// Builds an attachment from base64 data. A `data:` URL is stripped down
    /// to its payload.
    pub fn new(data: &str, mime_type: &str) -> ImageAttachment {
        let payload = match data.split_once(',') {
            Some((prefix, payload)) if prefix.starts_with("data:") => payload,
            _ => data,
        };

        return ImageAttachment {
            data: payload.to_string(),
            mime_type: mime_type.trim().to_lowercase(),
        };
    }

    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> ImageAttachment {
        return ImageAttachment::new(&STANDARD.encode(bytes), mime_type);
    }

    pub fn is_image_mime_type(mime_type: &str) -> bool {
        let mime_type = mime_type.trim().to_lowercase();
        return mime_type.starts_with("image/") && mime_type.len() > "image/".len();
    }

    /// Size of the decoded image in bytes, derived from the base64 length.
    pub fn byte_len(&self) -> usize {
        let padding = self.data.bytes().rev().take_while(|b| return *b == b'=').count();
        return (self.data.len() / 4 * 3).saturating_sub(padding);
    }

    /// Human readable size, e.g. `12.3 KB`.
    pub fn display_size(&self) -> String {
        let len = self.byte_len();
        if len < 1024 {
            return format!("{len} B");
        }
        if len < 1024 * 1024 {
            return format!("{:.1} KB", len as f64 / 1024.0);
        }

        return format!("{:.1} MB", len as f64 / (1024.0 * 1024.0));
    }
}
