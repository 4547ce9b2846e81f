#[cfg(test)]
#[path = "attachment_staging_test.rs"]
mod tests;

use crate::domain::models::ImageAttachment;

/// Holds at most one image waiting to be sent with the next message.
#[derive(Default)]
pub struct AttachmentStaging {
    pending: Option<ImageAttachment>,
}

impl AttachmentStaging {
    /// Stages an image, replacing any previous one. Anything that is not an
    /// image media type is ignored and leaves the slot unchanged.
    pub fn set(&mut self, data: &str, mime_type: &str) -> bool {
        if !ImageAttachment::is_image_mime_type(mime_type) {
            tracing::debug!(mime_type, "ignoring non image attachment");
            return false;
        }

        self.pending = Some(ImageAttachment::new(data, mime_type));
        return true;
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn peek(&self) -> Option<&ImageAttachment> {
        return self.pending.as_ref();
    }

    pub fn take(&mut self) -> Option<ImageAttachment> {
        return self.pending.take();
    }
}
