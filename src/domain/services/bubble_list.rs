#[cfg(test)]
#[path = "bubble_list_test.rs"]
mod tests;

use std::collections::HashMap;

use ratatui::prelude::Rect;
use ratatui::text::Line;
use ratatui::widgets::Block;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::domain::models::Bubble;
use crate::domain::models::BubbleAlignment;
use crate::domain::models::ChatMessage;
use crate::domain::models::MessageId;
use crate::domain::models::Role;

struct BubbleCacheEntry {
    id: MessageId,
    text_len: usize,
    is_streaming: bool,
    lines: Vec<Line<'static>>,
}

/// Bubble titles for each role.
pub struct BubbleTitles {
    pub user: String,
    pub model: String,
}

pub struct BubbleList {
    cache: HashMap<usize, BubbleCacheEntry>,
    line_width: usize,
    lines_len: usize,
    titles: BubbleTitles,
}

impl BubbleList {
    pub fn new(titles: BubbleTitles) -> BubbleList {
        return BubbleList {
            cache: HashMap::new(),
            line_width: 0,
            lines_len: 0,
            titles,
        };
    }

    pub fn set_messages(&mut self, messages: &[ChatMessage], line_width: usize) {
        if self.line_width != line_width {
            self.cache.clear();
            self.line_width = line_width;
        }

        self.cache.retain(|idx, _| return *idx < messages.len());

        self.lines_len = messages
            .iter()
            .enumerate()
            .map(|(idx, message)| {
                if let Some(entry) = self.cache.get(&idx) {
                    if entry.id == message.id()
                        && entry.text_len == message.text().len()
                        && entry.is_streaming == message.is_streaming()
                    {
                        return entry.lines.len();
                    }
                }

                let (title, align) = match message.role() {
                    Role::User => (&self.titles.user, BubbleAlignment::Right),
                    Role::Model => (&self.titles.model, BubbleAlignment::Left),
                };

                let lines = Bubble::new(message, title, align, line_width).as_lines();
                let lines_len = lines.len();
                self.cache.insert(
                    idx,
                    BubbleCacheEntry {
                        id: message.id(),
                        text_len: message.text().len(),
                        is_streaming: message.is_streaming(),
                        lines,
                    },
                );

                return lines_len;
            })
            .sum();
    }

    pub fn len(&self) -> usize {
        return self.lines_len;
    }

    pub fn render(&self, frame: &mut Frame, rect: Rect, scroll: usize) {
        let mut indexes: Vec<usize> = self.cache.keys().cloned().collect();
        indexes.sort();
        let lines: Vec<Line> = indexes
            .iter()
            .filter_map(|idx| return self.cache.get(idx))
            .flat_map(|entry| return entry.lines.to_owned())
            .collect();

        frame.render_widget(
            Paragraph::new(lines)
                .block(Block::default())
                .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0)),
            rect,
        );
    }
}
