#[cfg(test)]
#[path = "bubble_test.rs"]
mod tests;

use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use super::ChatMessage;

pub const PENDING_INDICATOR: &str = "Thinking...";
pub const EMPTY_RESPONSE_INDICATOR: &str = "(empty response)";

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum BubbleAlignment {
    Left,
    Right,
}

enum BubbleLine {
    Text(String),
    Muted(String),
}

impl BubbleLine {
    fn content(&self) -> &str {
        match self {
            BubbleLine::Text(text) => return text,
            BubbleLine::Muted(text) => return text,
        }
    }
}

pub struct Bubble<'b> {
    message: &'b ChatMessage,
    title: String,
    alignment: BubbleAlignment,
    window_max_width: usize,
}

impl<'b> Bubble<'b> {
    pub fn new(
        message: &'b ChatMessage,
        title: &str,
        alignment: BubbleAlignment,
        window_max_width: usize,
    ) -> Bubble<'b> {
        return Bubble {
            message,
            title: title.to_string(),
            alignment,
            window_max_width,
        };
    }

    pub fn as_lines(&self) -> Vec<Line<'static>> {
        // Add a minimum 4% of padding on the side.
        let min_bubble_padding_length = (self.window_max_width as f32 * 0.04).ceil() as usize;

        // left border + left padding + (text, not counted) + right padding + right
        // border + scrollbar. And then minimum bubble padding.
        let line_border_width = 5 + min_bubble_padding_length;
        let max_text_width = self
            .window_max_width
            .saturating_sub(line_border_width)
            .max(1);

        let bubble_lines = self.bubble_lines(max_text_width);
        let title_len = display_width(&self.title);
        let max_line_length = bubble_lines
            .iter()
            .map(|line| return display_width(line.content()))
            .max()
            .unwrap_or(0)
            .max(title_len);

        // Borders, inner padding, and text.
        let bubble_width = max_line_length + 4;
        let bubble_padding = " ".repeat(self.window_max_width.saturating_sub(bubble_width));

        let top_bar = format!(
            "╭{}{}╮",
            self.title,
            "─".repeat(max_line_length + 2 - title_len)
        );
        let bottom_bar = format!("╰{}╯", "─".repeat(max_line_length + 2));

        let mut lines = vec![self.pad(vec![Span::from(top_bar)], &bubble_padding)];
        for line in bubble_lines {
            let fill = " ".repeat(max_line_length - display_width(line.content()));
            let text_span = match line {
                BubbleLine::Text(text) => Span::from(text),
                BubbleLine::Muted(text) => Span::styled(
                    text,
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ),
            };

            lines.push(self.pad(
                vec![
                    Span::from("│ "),
                    text_span,
                    Span::from(format!("{fill} │")),
                ],
                &bubble_padding,
            ));
        }
        lines.push(self.pad(vec![Span::from(bottom_bar)], &bubble_padding));

        return lines;
    }

    fn pad(&self, mut spans: Vec<Span<'static>>, bubble_padding: &str) -> Line<'static> {
        if self.alignment == BubbleAlignment::Left {
            spans.push(Span::from(bubble_padding.to_string()));
            return Line::from(spans);
        }

        let mut res = vec![Span::from(bubble_padding.to_string())];
        res.extend(spans);
        return Line::from(res);
    }

    fn bubble_lines(&self, max_text_width: usize) -> Vec<BubbleLine> {
        let mut lines = vec![];
        if let Some(image) = self.message.image() {
            lines.push(BubbleLine::Muted(format!(
                "[image: {}, {}]",
                image.mime_type,
                image.display_size()
            )));
        }

        if self.message.text().is_empty() {
            if self.message.is_streaming() {
                lines.push(BubbleLine::Muted(PENDING_INDICATOR.to_string()));
            } else if self.message.image().is_none() {
                lines.push(BubbleLine::Muted(EMPTY_RESPONSE_INDICATOR.to_string()));
            }

            return lines;
        }

        lines.extend(
            wrap_lines(self.message.text(), max_text_width)
                .into_iter()
                .map(BubbleLine::Text),
        );

        return lines;
    }
}

fn display_width(text: &str) -> usize {
    return UnicodeWidthStr::width(text);
}

fn char_width(c: char) -> usize {
    return UnicodeWidthChar::width(c).unwrap_or(0);
}

fn chars_width(chars: &[char]) -> usize {
    return chars.iter().map(|c| return char_width(*c)).sum();
}

/// Length of the leading run of `word` that fits in `max_width` columns.
/// Always takes at least one character so wide glyphs in narrow windows
/// still make progress.
fn split_word(word: &[char], max_width: usize) -> usize {
    let mut width = 0;
    for (idx, c) in word.iter().enumerate() {
        width += char_width(*c);
        if width > max_width {
            return idx.max(1);
        }
    }
    return word.len();
}

/// Word wraps text to `line_max_width` terminal columns. Words wider than a
/// line are split.
pub fn wrap_lines(text: &str, line_max_width: usize) -> Vec<String> {
    let line_max_width = line_max_width.max(1);
    let mut lines: Vec<String> = Vec::new();

    for full_line in text.replace('\t', "  ").split('\n') {
        if full_line.trim().is_empty() {
            lines.push(" ".to_string());
            continue;
        }

        let mut current_line = String::new();
        let mut line_width = 0;

        for word in full_line.split(' ') {
            let mut word_chars = word.chars().collect::<Vec<char>>();
            while chars_width(&word_chars) > line_max_width {
                if line_width > 0 {
                    lines.push(current_line.trim_end().to_string());
                    current_line = String::new();
                    line_width = 0;
                }
                let rest = word_chars.split_off(split_word(&word_chars, line_max_width));
                lines.push(word_chars.iter().collect());
                word_chars = rest;
            }

            let word_width = chars_width(&word_chars);
            if line_width > 0 && word_width + line_width + 1 > line_max_width {
                lines.push(current_line.trim_end().to_string());
                current_line = String::new();
                line_width = 0;
            }

            if line_width > 0 {
                current_line.push(' ');
                line_width += 1;
            }
            current_line.extend(word_chars);
            line_width += word_width;
        }

        if line_width > 0 {
            lines.push(current_line.trim_end().to_string());
        }
    }

    return lines;
}
