#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use std::fmt;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::ImageAttachment;
use super::Role;

/// Opaque, monotonically assigned message identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    pub fn new(id: u64) -> MessageId {
        return MessageId(id);
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return write!(f, "{}", self.0);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    id: MessageId,
    role: Role,
    text: String,
    image: Option<ImageAttachment>,
    is_streaming: bool,
}

impl ChatMessage {
    pub fn user(id: MessageId, text: &str, image: Option<ImageAttachment>) -> ChatMessage {
        return ChatMessage {
            id,
            role: Role::User,
            text: text.to_string(),
            image,
            is_streaming: false,
        };
    }

    /// An empty model message awaiting streamed fragments.
    pub fn placeholder(id: MessageId) -> ChatMessage {
        return ChatMessage {
            id,
            role: Role::Model,
            text: "".to_string(),
            image: None,
            is_streaming: true,
        };
    }

    /// A finished model message. Only built directly in tests; live replies
    /// start as a placeholder.
    #[cfg(test)]
    pub fn model(id: MessageId, text: &str) -> ChatMessage {
        return ChatMessage {
            id,
            role: Role::Model,
            text: text.to_string(),
            image: None,
            is_streaming: false,
        };
    }

    pub fn id(&self) -> MessageId {
        return self.id;
    }

    pub fn role(&self) -> Role {
        return self.role;
    }

    pub fn text(&self) -> &str {
        return &self.text;
    }

    pub fn image(&self) -> Option<&ImageAttachment> {
        return self.image.as_ref();
    }

    pub fn is_streaming(&self) -> bool {
        return self.is_streaming;
    }

    /// Neither text nor image. Such a message never becomes a turn.
    pub fn is_blank(&self) -> bool {
        return self.text.is_empty() && self.image.is_none();
    }

    /// Appends a fragment verbatim. Finished messages are left untouched.
    pub fn with_fragment(mut self, fragment: &str) -> ChatMessage {
        if self.is_streaming {
            self.text.push_str(fragment);
        }

        return self;
    }

    pub fn finish(mut self) -> ChatMessage {
        self.is_streaming = false;
        return self;
    }

    /// Replaces whatever was streamed so far with `text` and finishes the
    /// message.
    pub fn fail_with(mut self, text: &str) -> ChatMessage {
        if self.is_streaming {
            self.text = text.to_string();
            self.is_streaming = false;
        }

        return self;
    }
}
