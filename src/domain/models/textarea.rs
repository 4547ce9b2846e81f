use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;

use super::ImageAttachment;

pub struct TextArea {}

impl<'a> TextArea {
    pub fn default() -> tui_textarea::TextArea<'a> {
        let mut textarea = tui_textarea::TextArea::default();
        TextArea::set_attachment(&mut textarea, None);
        return textarea;
    }

    /// Shows the staged image, if any, in the prompt box title.
    pub fn set_attachment(
        textarea: &mut tui_textarea::TextArea<'a>,
        attachment: Option<&ImageAttachment>,
    ) {
        let title = match attachment {
            Some(image) => format!(
                "Enter prompt [image: {}, {}]",
                image.mime_type,
                image.display_size()
            ),
            None => "Enter prompt".to_string(),
        };

        textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .title(title)
                .padding(Padding::new(1, 1, 0, 0)),
        );
    }
}
