#[cfg(test)]
#[path = "scroll_test.rs"]
mod tests;

use ratatui::widgets::ScrollbarState;

/// Vertical scroll over the rendered chat lines. Follows the bottom of the
/// chat until the user scrolls up, and resumes following once they scroll
/// back down to the end.
pub struct Scroll {
    list_length: usize,
    viewport_length: usize,
    following: bool,
    pub position: usize,
    pub scrollbar_state: ScrollbarState,
}

impl Default for Scroll {
    fn default() -> Scroll {
        return Scroll {
            list_length: 0,
            viewport_length: 0,
            following: true,
            position: 0,
            scrollbar_state: ScrollbarState::default(),
        };
    }
}

impl Scroll {
    fn max_position(&self) -> usize {
        return self.list_length.saturating_sub(self.viewport_length);
    }

    pub fn up(&mut self) {
        self.position = self.position.saturating_sub(1);
        self.following = self.position >= self.max_position();
        self.sync_scrollbar();
    }

    pub fn up_page(&mut self) {
        self.position = self.position.saturating_sub(self.page_size());
        self.following = self.position >= self.max_position();
        self.sync_scrollbar();
    }

    pub fn down(&mut self) {
        self.position = (self.position + 1).min(self.max_position());
        self.following = self.position >= self.max_position();
        self.sync_scrollbar();
    }

    pub fn down_page(&mut self) {
        self.position = (self.position + self.page_size()).min(self.max_position());
        self.following = self.position >= self.max_position();
        self.sync_scrollbar();
    }

    pub fn last(&mut self) {
        self.position = self.max_position();
        self.following = true;
        self.sync_scrollbar();
    }

    pub fn set_state(&mut self, list_length: usize, viewport_length: usize) {
        self.list_length = list_length;
        self.viewport_length = viewport_length;
        if self.following {
            self.position = self.max_position();
        } else {
            self.position = self.position.min(self.max_position());
        }

        self.scrollbar_state = self
            .scrollbar_state
            .content_length(self.max_position())
            .viewport_content_length(viewport_length);
        self.sync_scrollbar();
    }

    fn page_size(&self) -> usize {
        return (self.viewport_length / 2).max(1);
    }

    fn sync_scrollbar(&mut self) {
        self.scrollbar_state = self.scrollbar_state.position(self.position);
    }
}
