#[cfg(test)]
#[path = "message_log_test.rs"]
mod tests;

use crate::domain::models::ChatMessage;
use crate::domain::models::MessageId;

/// Ordered chat history. Insertion order is display order. At most one
/// message is streaming at any time.
#[derive(Default)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
    last_id: u64,
}

impl MessageLog {
    /// Hands out the next identifier. Identifiers are never reused, not even
    /// after `clear`.
    pub fn next_id(&mut self) -> MessageId {
        self.last_id += 1;
        return MessageId::new(self.last_id);
    }

    pub fn append(&mut self, message: ChatMessage) {
        if message.is_streaming() {
            for existing in self.messages.iter_mut().filter(|m| return m.is_streaming()) {
                tracing::warn!(
                    id = %existing.id(),
                    "finishing streaming message before appending a new one"
                );
                *existing = existing.clone().finish();
            }
        }

        self.messages.push(message);
    }

    /// Replaces the message with `id` by the mutator's result. Searches from
    /// the tail. Returns false when nothing matched or the result was rejected.
    pub fn update_last<F>(&mut self, id: MessageId, mutator: F) -> bool
    where
        F: FnOnce(ChatMessage) -> ChatMessage,
    {
        let Some(idx) = self.messages.iter().rposition(|m| return m.id() == id) else {
            return false;
        };

        let current = &self.messages[idx];
        let updated = mutator(current.clone());
        if updated.id() != current.id() || updated.role() != current.role() {
            tracing::warn!(id = %id, "rejected update changing message identity or role");
            return false;
        }
        if updated.is_streaming() && !current.is_streaming() {
            tracing::warn!(id = %id, "rejected update restarting a finished message");
            return false;
        }

        self.messages[idx] = updated;
        return true;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        return &self.messages;
    }

    pub fn get(&self, id: MessageId) -> Option<&ChatMessage> {
        return self.messages.iter().rev().find(|m| return m.id() == id);
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        return self.messages.last();
    }

    pub fn len(&self) -> usize {
        return self.messages.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.messages.is_empty();
    }

    pub fn streaming_count(&self) -> usize {
        return self.messages.iter().filter(|m| return m.is_streaming()).count();
    }
}
