#[cfg(test)]
#[path = "session_controller_test.rs"]
mod tests;

use futures::StreamExt;

use super::AttachmentStaging;
use super::MessageLog;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendPrompt;
use crate::domain::models::ChatMessage;
use crate::domain::models::FragmentStream;
use crate::domain::models::ImageAttachment;
use crate::domain::models::MessageId;

/// Shown in place of a model reply when the turn failed, replacing any text
/// streamed before the failure.
pub const FAILED_RESPONSE_TEXT: &str =
    "Sorry, something went wrong while processing your request. Please try again later.";

/// Outcome of folding one step of the response stream into the log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TurnUpdate {
    Fragment(String),
    Completed,
    Failed(String),
}

impl TurnUpdate {
    pub fn is_terminal(&self) -> bool {
        return !matches!(self, TurnUpdate::Fragment(_));
    }
}

struct ActiveTurn {
    placeholder_id: MessageId,
    stream: FragmentStream,
}

/// Owns the chat log and staged attachment, and drives one streamed turn at a
/// time against the backend.
pub struct SessionController {
    backend: BackendBox,
    log: MessageLog,
    staging: AttachmentStaging,
    active: Option<ActiveTurn>,
}

impl SessionController {
    pub fn new(backend: BackendBox) -> SessionController {
        return SessionController {
            backend,
            log: MessageLog::default(),
            staging: AttachmentStaging::default(),
            active: None,
        };
    }

    pub fn messages(&self) -> &[ChatMessage] {
        return self.log.messages();
    }

    pub fn is_busy(&self) -> bool {
        return self.active.is_some();
    }

    pub fn attachment(&self) -> Option<&ImageAttachment> {
        return self.staging.peek();
    }

    pub fn stage_attachment(&mut self, data: &str, mime_type: &str) -> bool {
        return self.staging.set(data, mime_type);
    }

    pub fn stage(&mut self, attachment: ImageAttachment) -> bool {
        return self.stage_attachment(&attachment.data, &attachment.mime_type);
    }

    pub fn clear_attachment(&mut self) {
        self.staging.clear();
    }

    /// Starts a turn. Returns false without touching anything when a turn is
    /// already in flight, or when there is neither text nor a staged image.
    pub fn send(&mut self, text: &str) -> bool {
        if self.is_busy() {
            tracing::debug!("ignoring send while a response is streaming");
            return false;
        }
        if text.trim().is_empty() && self.staging.peek().is_none() {
            return false;
        }

        let history = self.log.messages().to_vec();
        let image = self.staging.take();

        let user_id = self.log.next_id();
        self.log
            .append(ChatMessage::user(user_id, text, image.clone()));

        let placeholder_id = self.log.next_id();
        self.log.append(ChatMessage::placeholder(placeholder_id));
        debug_assert_eq!(self.log.streaming_count(), 1);
        debug_assert!(self.log.last().is_some_and(|m| return m.id() == placeholder_id));

        tracing::debug!(
            user_id = %user_id,
            placeholder_id = %placeholder_id,
            history_len = history.len(),
            has_image = image.is_some(),
            "turn started"
        );

        let stream = self
            .backend
            .stream(BackendPrompt::new(history, text.to_string(), image));
        self.active = Some(ActiveTurn {
            placeholder_id,
            stream,
        });

        return true;
    }

    /// Waits for the next step of the in-flight turn and applies it to the
    /// placeholder. Returns `None` when no turn is in flight. Safe to race in
    /// `tokio::select!`; a dropped call loses nothing.
    pub async fn next_update(&mut self) -> Option<TurnUpdate> {
        let active = self.active.as_mut()?;
        let placeholder_id = active.placeholder_id;
        let next = active.stream.next().await;

        match next {
            Some(Ok(fragment)) => {
                self.log
                    .update_last(placeholder_id, |m| return m.with_fragment(&fragment));
                return Some(TurnUpdate::Fragment(fragment));
            }
            Some(Err(err)) => {
                tracing::error!(error = ?err, placeholder_id = %placeholder_id, "turn failed");
                self.log
                    .update_last(placeholder_id, |m| return m.fail_with(FAILED_RESPONSE_TEXT));
                self.active = None;
                return Some(TurnUpdate::Failed(format!("{err:#}")));
            }
            None => {
                let reply_len = self
                    .log
                    .get(placeholder_id)
                    .map(|m| return m.text().len())
                    .unwrap_or_default();
                tracing::debug!(placeholder_id = %placeholder_id, reply_len, "turn completed");
                self.log.update_last(placeholder_id, |m| return m.finish());
                self.active = None;
                return Some(TurnUpdate::Completed);
            }
        }
    }

    /// Sends and drives the turn to its end. Returns `None` when the send was
    /// refused.
    pub async fn run_turn(&mut self, text: &str) -> Option<TurnUpdate> {
        if !self.send(text) {
            return None;
        }

        while let Some(update) = self.next_update().await {
            if update.is_terminal() {
                return Some(update);
            }
        }

        return None;
    }

    /// Empties the log and the staged attachment. Refused while a turn is in
    /// flight.
    pub fn clear(&mut self) -> bool {
        if self.is_busy() {
            return false;
        }

        if !self.log.is_empty() {
            tracing::debug!(messages = self.log.len(), "clearing chat");
        }
        self.log.clear();
        self.staging.clear();
        return true;
    }
}
