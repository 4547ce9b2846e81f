#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use std::pin::Pin;

use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;

use super::ChatMessage;
use super::ImageAttachment;
use super::Role;

/// Lazy sequence of text fragments. Ends with `None` on success; an `Err`
/// item signals failure and is always the last item.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Part {
    Image(ImageAttachment),
    Text(String),
}

/// One role tagged unit of conversation. Always holds at least one part,
/// image first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn from_message(message: &ChatMessage) -> Option<Turn> {
        if message.is_blank() {
            return None;
        }

        let mut parts = vec![];
        if let Some(image) = message.image() {
            parts.push(Part::Image(image.clone()));
        }
        if !message.text().is_empty() {
            parts.push(Part::Text(message.text().to_string()));
        }

        return Some(Turn {
            role: message.role(),
            parts,
        });
    }
}

#[derive(Clone, Debug)]
pub struct BackendPrompt {
    pub history: Vec<ChatMessage>,
    pub text: String,
    pub image: Option<ImageAttachment>,
}

impl BackendPrompt {
    pub fn new(
        history: Vec<ChatMessage>,
        text: String,
        image: Option<ImageAttachment>,
    ) -> BackendPrompt {
        return BackendPrompt {
            history,
            text,
            image,
        };
    }

    /// Projects the history plus the new input into the ordered turns sent to
    /// the model. The new input is always the final `user` turn.
    pub fn turns(&self) -> Vec<Turn> {
        let mut turns = self
            .history
            .iter()
            .filter_map(Turn::from_message)
            .collect::<Vec<Turn>>();

        let mut parts = vec![];
        if let Some(image) = &self.image {
            parts.push(Part::Image(image.clone()));
        }
        parts.push(Part::Text(self.text.to_string()));

        turns.push(Turn {
            role: Role::User,
            parts,
        });

        return turns;
    }
}

#[async_trait]
pub trait Backend {
    /// Used at startup to verify all configurations are available to work with
    /// the backend.
    async fn health_check(&self) -> Result<()>;

    /// Requests a streamed completion for the prompt. Nothing is sent until
    /// the returned stream is first polled. Fragments arrive in the order the
    /// service produced them; a failure, including a missing credential, is
    /// delivered as the final `Err` item.
    fn stream(&self, prompt: BackendPrompt) -> FragmentStream;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;
