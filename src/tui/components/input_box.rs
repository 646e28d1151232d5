//! # InputBox Component
//!
//! Single-line prompt. Owns the edit buffer and cursor; the host decides
//! whether a submission is accepted and clears the box only when it is.
//!
//! Long input scrolls horizontally so the cursor stays visible. Widths are
//! measured in terminal columns (`unicode-width`), not bytes or chars.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

const PROMPT: &str = "$ ";
const PLACEHOLDER: &str = "Ask anything...";
/// Borders on both sides.
const HORIZONTAL_OVERHEAD: u16 = 2;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter pressed with this buffer
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    buffer: String,
    /// Byte offset into `buffer`, always on a char boundary
    cursor: usize,
    /// First visible column when the text is wider than the box
    scroll: usize,
    /// Dimmed while a turn is running (prop)
    pub busy: bool,
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            scroll: 0,
            busy: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Replaces the buffer and moves the cursor to the end.
    pub fn set_text(&mut self, text: String) {
        self.cursor = text.len();
        self.buffer = text;
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    fn insert_str(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    /// Display column of the cursor.
    fn cursor_column(&self) -> usize {
        self.buffer[..self.cursor].width()
    }

    /// Keeps the cursor inside a viewport `visible` columns wide.
    fn update_scroll(&mut self, visible: usize) {
        let column = self.cursor_column();
        if visible == 0 {
            self.scroll = column;
        } else if column < self.scroll {
            self.scroll = column;
        } else if column >= self.scroll + visible {
            self.scroll = column + 1 - visible;
        }
    }

    /// The slice of the buffer starting at the scroll column.
    fn visible_text(&self) -> &str {
        let mut column = 0;
        for (idx, c) in self.buffer.char_indices() {
            if column >= self.scroll {
                return &self.buffer[idx..];
            }
            column += c.width().unwrap_or(0);
        }
        ""
    }
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let prompt_width = PROMPT.width();
        let visible = area
            .width
            .saturating_sub(HORIZONTAL_OVERHEAD) as usize;
        let visible = visible.saturating_sub(prompt_width);
        self.update_scroll(visible);

        let text_style = if self.busy {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let body = if self.buffer.is_empty() {
            Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM))
        } else {
            Span::styled(self.visible_text(), text_style)
        };
        let line = Line::from(vec![Span::styled(PROMPT, Style::default().fg(Color::Green)), body]);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(Paragraph::new(line).block(block), area);

        let column = self.cursor_column().saturating_sub(self.scroll) + prompt_width;
        let x = area.x + 1 + column as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                let mut encoded = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut encoded));
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Single-line input
                let flattened = text.replace("\r\n", " ").replace(['\n', '\r'], " ");
                self.insert_str(&flattened);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                let prev = self.buffer[..self.cursor].char_indices().next_back()?.0;
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Submit => Some(InputEvent::Submit(self.buffer.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn type_text(input: &mut InputBox, text: &str) {
        for c in text.chars() {
            input.handle_event(&TuiEvent::InputChar(c));
        }
    }

    fn rendered(input: &mut InputBox, width: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, 3)).unwrap();
        terminal.draw(|f| input.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_handle_input() {
        let mut input = InputBox::new();

        let res = input.handle_event(&TuiEvent::InputChar('a'));
        assert_eq!(res, Some(InputEvent::ContentChanged));
        type_text(&mut input, "b");
        assert_eq!(input.text(), "ab");

        let res = input.handle_event(&TuiEvent::Backspace);
        assert_eq!(res, Some(InputEvent::ContentChanged));
        assert_eq!(input.text(), "a");
    }

    #[test]
    fn test_backspace_on_empty_is_noop() {
        let mut input = InputBox::new();
        assert_eq!(input.handle_event(&TuiEvent::Backspace), None);
    }

    #[test]
    fn test_backspace_removes_whole_multibyte_char() {
        let mut input = InputBox::new();
        type_text(&mut input, "añ");
        input.handle_event(&TuiEvent::Backspace);
        assert_eq!(input.text(), "a");
    }

    #[test]
    fn test_submit_leaves_buffer_for_host() {
        let mut input = InputBox::new();
        type_text(&mut input, "hello");

        let res = input.handle_event(&TuiEvent::Submit);
        assert_eq!(res, Some(InputEvent::Submit("hello".to_string())));
        assert_eq!(input.text(), "hello");

        input.clear();
        assert!(input.text().is_empty());
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("one\r\ntwo\nthree".to_string()));
        assert_eq!(input.text(), "one two three");
    }

    #[test]
    fn test_set_text_moves_cursor_to_end() {
        let mut input = InputBox::new();
        input.set_text("recalled".to_string());
        type_text(&mut input, "!");
        assert_eq!(input.text(), "recalled!");
    }

    #[test]
    fn test_scroll_keeps_cursor_visible() {
        let mut input = InputBox::new();
        type_text(&mut input, "abcdefghij");
        input.update_scroll(4);
        assert_eq!(input.scroll, 7);
        assert_eq!(input.visible_text(), "hij");
    }

    #[test]
    fn test_scroll_counts_wide_chars_as_two_columns() {
        let mut input = InputBox::new();
        type_text(&mut input, "日本語");
        assert_eq!(input.cursor_column(), 6);
    }

    #[test]
    fn test_render_shows_placeholder_then_text() {
        let mut input = InputBox::new();
        assert!(rendered(&mut input, 40).contains(PLACEHOLDER));

        type_text(&mut input, "what is rust");
        let text = rendered(&mut input, 40);
        assert!(text.contains("$ what is rust"));
        assert!(!text.contains(PLACEHOLDER));
    }
}
