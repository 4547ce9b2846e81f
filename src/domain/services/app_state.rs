#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use ratatui::prelude::Rect;

use super::clipboard::ClipboardService;
use super::BubbleList;
use super::BubbleTitles;
use super::Export;
use super::Scroll;
use super::SessionController;
use super::TurnUpdate;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendBox;
use crate::domain::models::SlashCommand;
use crate::domain::models::TextArea;
use crate::infrastructure::attachments;

pub const GENERATING_STATUS: &str = "Generating...";

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /attach (/a) [PATH] - Attaches an image to the next message. Dropping an image file on the terminal does the same.
- /detach (/d) - Removes the attached image.
- /export (/e) [DIR?] - Writes the chat to a markdown file. Defaults to the configured export directory.
- /copy (/c) - Copies the last reply to your clipboard.
- /copy all (/c all) - Copies the entire chat to your clipboard.
- /clear - Clears the chat after confirmation.
- /quit /exit (/q) - Exit Vision Chat.
- /help (/h) - Provides this help menu.

HOTKEYS:
- Enter - Send the prompt, with the attached image if any.
- Up arrow - Scroll up
- Down arrow - Scroll down
- CTRL+U / Page Up - Page up
- CTRL+D / Page Down - Page down
- CTRL+C - Exit.
        "#;

    return text.trim().to_string();
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

pub struct AppState<'a> {
    pub bubble_list: BubbleList,
    pub confirming_clear: bool,
    pub last_known_height: usize,
    pub last_known_width: usize,
    pub scroll: Scroll,
    pub session: SessionController,
    pub show_help: bool,
    pub status: Option<StatusLine>,
    pub textarea: tui_textarea::TextArea<'a>,
}

impl<'a> AppState<'a> {
    pub fn new(backend: BackendBox, titles: BubbleTitles) -> AppState<'a> {
        return AppState {
            bubble_list: BubbleList::new(titles),
            confirming_clear: false,
            last_known_height: 0,
            last_known_width: 0,
            scroll: Scroll::default(),
            session: SessionController::new(backend),
            show_help: false,
            status: None,
            textarea: TextArea::default(),
        };
    }

    pub fn set_status(&mut self, text: &str) {
        self.status = Some(StatusLine {
            text: text.to_string(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: &str) {
        self.status = Some(StatusLine {
            text: text.to_string(),
            is_error: true,
        });
    }

    /// Line shown under the chat. Errors win over the streaming indicator.
    pub fn current_status(&self) -> Option<StatusLine> {
        if let Some(status) = &self.status {
            if status.is_error || !self.session.is_busy() {
                return Some(status.clone());
            }
        }

        if self.session.is_busy() {
            return Some(StatusLine {
                text: GENERATING_STATUS.to_string(),
                is_error: false,
            });
        }

        return None;
    }

    pub fn input_text(&self) -> String {
        return self.textarea.lines().join("\n");
    }

    fn reset_textarea(&mut self) {
        self.textarea = TextArea::default();
        TextArea::set_attachment(&mut self.textarea, self.session.attachment());
    }

    /// Handles Enter on the prompt. Returns true when the app should exit.
    pub async fn submit(&mut self) -> Result<bool> {
        let input = self.input_text();
        self.show_help = false;

        if self.confirming_clear {
            self.confirming_clear = false;
            self.reset_textarea();
            self.confirm_clear(&input);
            return Ok(false);
        }

        if let Some(command) = SlashCommand::parse(&input) {
            self.reset_textarea();
            return self.handle_command(command).await;
        }

        if input.trim().is_empty() && self.session.attachment().is_none() {
            return Ok(false);
        }

        if self.session.send(&input) {
            self.status = None;
            self.reset_textarea();
            self.scroll.last();
            self.sync_dependants();
        } else if self.session.is_busy() {
            self.set_error("Wait for the current reply to finish before sending.");
        }

        return Ok(false);
    }

    fn confirm_clear(&mut self, answer: &str) {
        let answer = answer.trim().to_lowercase();
        if answer != "y" && answer != "yes" {
            self.set_status("Clear cancelled.");
            return;
        }

        if self.session.clear() {
            self.set_status("Chat cleared.");
        } else {
            self.set_error("The chat can't be cleared while a reply is streaming.");
        }
        self.reset_textarea();
        self.sync_dependants();
    }

    async fn handle_command(&mut self, command: SlashCommand) -> Result<bool> {
        if command.is_quit() {
            return Ok(true);
        }

        if command.is_help() {
            self.show_help = true;
            return Ok(false);
        }

        if command.is_attach() {
            if command.args.is_empty() {
                self.set_error("Missing image path, use /attach PATH");
                return Ok(false);
            }
            let file_path = path::PathBuf::from(command.arg_text());
            self.attach(&file_path).await;
            return Ok(false);
        }

        if command.is_detach() {
            self.session.clear_attachment();
            self.reset_textarea();
            self.set_status("Attachment removed.");
            return Ok(false);
        }

        if command.is_export() {
            let mut dir = command.arg_text();
            if dir.is_empty() {
                dir = Config::get(ConfigKey::ExportDir);
            }
            self.export(path::Path::new(&dir)).await;
            return Ok(false);
        }

        if command.is_copy_last() {
            match ClipboardService::last_reply(self.session.messages()) {
                Some(text) => self.copy(text, "Copied the last reply to your clipboard."),
                None => self.set_status("There is no reply to copy yet."),
            }
            return Ok(false);
        }

        if command.is_copy_chat() {
            if self.session.messages().is_empty() {
                self.set_status("There is nothing to copy yet.");
            } else {
                let text = ClipboardService::format_messages(self.session.messages());
                self.copy(text, "Copied the chat to your clipboard.");
            }
            return Ok(false);
        }

        if command.is_clear() {
            if self.session.is_busy() {
                self.set_error("The chat can't be cleared while a reply is streaming.");
            } else {
                self.confirming_clear = true;
                self.set_status("Clear the whole chat? Type y to confirm.");
            }
        }

        return Ok(false);
    }

    async fn attach(&mut self, file_path: &path::Path) {
        match attachments::load_image(file_path).await {
            Ok(Some(image)) => {
                let summary = format!(
                    "Attached {} ({}, {}).",
                    file_path.display(),
                    image.mime_type,
                    image.display_size()
                );
                self.session.stage(image);
                self.reset_textarea_title();
                self.set_status(&summary);
            }
            Ok(None) => {
                self.set_error(&format!("{} is not an image.", file_path.display()));
            }
            Err(err) => {
                tracing::error!(error = ?err, path = ?file_path, "failed to read attachment");
                self.set_error(&format!("Could not read {}: {err}", file_path.display()));
            }
        }
    }

    async fn export(&mut self, dir: &path::Path) {
        match Export::write(dir, self.session.messages()).await {
            Ok(Some(file_path)) => {
                self.set_status(&format!("Chat exported to {}", file_path.display()));
            }
            Ok(None) => self.set_status("There is nothing to export yet."),
            Err(err) => {
                tracing::error!(error = ?err, dir = ?dir, "failed to export chat");
                self.set_error(&format!("Export failed: {err}"));
            }
        }
    }

    fn copy(&mut self, text: String, success: &str) {
        if let Err(err) = ClipboardService::set(text) {
            tracing::warn!(error = ?err, "clipboard unavailable");
            self.set_error(&format!("Copy failed: {err}"));
            return;
        }

        self.set_status(success);
    }

    fn reset_textarea_title(&mut self) {
        TextArea::set_attachment(&mut self.textarea, self.session.attachment());
    }

    /// Pasted text that names an image file is staged as an attachment,
    /// anything else goes into the prompt.
    pub async fn paste(&mut self, text: &str) {
        if let Some(file_path) = attachments::pasted_image_path(text) {
            self.attach(&file_path).await;
            return;
        }

        for (idx, line) in text.split('\n').enumerate() {
            if idx > 0 {
                self.textarea.insert_newline();
            }
            self.textarea.insert_str(line.trim_end_matches('\r'));
        }
    }

    pub fn handle_update(&mut self, update: TurnUpdate) {
        match &update {
            TurnUpdate::Failed(err) => {
                self.set_error(&format!("Request failed: {err}"));
            }
            TurnUpdate::Completed => {
                if self.status.as_ref().is_some_and(|s| return s.is_error) {
                    self.status = None;
                }
            }
            TurnUpdate::Fragment(_) => (),
        }

        self.sync_dependants();
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width.into();
        self.last_known_height = rect.height.into();
        self.sync_dependants();
    }

    pub fn sync_dependants(&mut self) {
        self.bubble_list
            .set_messages(self.session.messages(), self.last_known_width);

        self.scroll
            .set_state(self.bubble_list.len(), self.last_known_height);
    }
}
