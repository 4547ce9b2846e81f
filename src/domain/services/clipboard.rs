#[cfg(test)]
#[path = "clipboard_test.rs"]
mod tests;

use anyhow::anyhow;
use anyhow::Result;
use once_cell::sync::OnceCell;
use tokio::sync::mpsc;

use crate::domain::models::ChatMessage;
use crate::domain::models::Role;

static SENDER: OnceCell<mpsc::UnboundedSender<String>> = OnceCell::new();

pub struct ClipboardService {}

impl ClipboardService {
    pub async fn start() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        if SENDER.set(tx).is_err() {
            return Err(anyhow!("Clipboard service is already running."));
        }
        let mut clipboard = arboard::Clipboard::new()?;

        while let Some(text) = rx.recv().await {
            if let Err(err) = clipboard.set_text(text) {
                tracing::error!(error = ?err, "failed to write to clipboard");
            }
        }

        return Ok(());
    }

    pub fn healthcheck() -> Result<()> {
        if SENDER.get().is_some() {
            return Ok(());
        }

        arboard::Clipboard::new()?;
        return Ok(());
    }

    pub fn set(text: String) -> Result<()> {
        if let Some(tx) = SENDER.get() {
            tx.send(text)?;
            return Ok(());
        }

        return Err(anyhow!("Clipboard service is not initialized."));
    }

    /// Text of the most recent finished model reply.
    pub fn last_reply(messages: &[ChatMessage]) -> Option<String> {
        return messages
            .iter()
            .rev()
            .find(|m| {
                return m.role() == Role::Model && !m.is_streaming() && !m.text().is_empty();
            })
            .map(|m| return m.text().to_string());
    }

    pub fn format_messages(messages: &[ChatMessage]) -> String {
        return messages
            .iter()
            .filter(|m| return !m.text().is_empty())
            .map(|m| {
                return format!("{}: {}", m.role(), m.text());
            })
            .collect::<Vec<String>>()
            .join("\n\n");
    }
}
