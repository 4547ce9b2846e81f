#[cfg(test)]
#[path = "export_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use chrono::Local;
use tokio::fs;

use crate::domain::models::ChatMessage;

pub struct Export {}

impl Export {
    /// One section per message: a role heading followed by the text. Images
    /// are left out.
    pub fn to_markdown(messages: &[ChatMessage]) -> String {
        return messages
            .iter()
            .map(|message| {
                return format!("### {}\n{}\n", message.role(), message.text());
            })
            .collect::<Vec<String>>()
            .join("\n---\n\n");
    }

    pub fn file_name() -> String {
        return format!(
            "vision-chat-export-{}.md",
            Local::now().format("%Y-%m-%d")
        );
    }

    /// Writes the chat to a dated markdown file in `dir`. Does nothing for an
    /// empty chat.
    pub async fn write(dir: &path::Path, messages: &[ChatMessage]) -> Result<Option<path::PathBuf>> {
        if messages.is_empty() {
            return Ok(None);
        }

        if !dir.exists() {
            fs::create_dir_all(dir).await?;
        }

        let file_path = dir.join(Export::file_name());
        fs::write(&file_path, Export::to_markdown(messages)).await?;
        tracing::debug!(path = ?file_path, messages = messages.len(), "exported chat");

        return Ok(Some(file_path));
    }
}
