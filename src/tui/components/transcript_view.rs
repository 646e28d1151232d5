//! # TranscriptView Component
//!
//! Scrollable view of the session transcript, one colour per line kind.
//!
//! `TranscriptView` is a transient component (created each frame) that wraps
//! `&'a mut TranscriptViewState` (persistent scroll state) and the transcript
//! lines (props). Wrapped height comes from `Paragraph::line_count`, so the
//! view can stay pinned to the bottom while output streams in.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Wrap};

use crate::core::transcript::{LineKind, TerminalLine};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

const INPUT_PREFIX: &str = "$ ";
const LOADING_TEXT: &str = "Processing...";

/// Scroll state for the transcript. Must be persisted in the parent TuiState.
pub struct TranscriptViewState {
    /// First visible wrapped row
    pub offset: u16,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Wrapped rows below which we can't scroll (from the last frame)
    max_offset: u16,
    /// Last known viewport height, used as the page size
    viewport_height: u16,
}

impl Default for TranscriptViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptViewState {
    pub fn new() -> Self {
        Self {
            offset: 0,
            stick_to_bottom: true,
            max_offset: 0,
            viewport_height: 0,
        }
    }

    fn page(&self) -> u16 {
        self.viewport_height.max(1)
    }

    /// Records the content bounds from a render pass and settles the offset.
    fn settle(&mut self, total_rows: u16, viewport_height: u16) {
        self.viewport_height = viewport_height;
        self.max_offset = total_rows.saturating_sub(viewport_height);
        if self.stick_to_bottom || self.offset >= self.max_offset {
            self.offset = self.max_offset;
            self.stick_to_bottom = true;
        }
    }
}

impl EventHandler for TranscriptViewState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollPageUp => {
                self.offset = self.offset.saturating_sub(self.page());
                self.stick_to_bottom = self.offset >= self.max_offset;
            }
            TuiEvent::ScrollPageDown => {
                self.offset = self.offset.saturating_add(self.page()).min(self.max_offset);
                self.stick_to_bottom = self.offset >= self.max_offset;
            }
            _ => {}
        }
        None
    }
}

pub struct TranscriptView<'a> {
    lines: &'a [TerminalLine],
    is_loading: bool,
    state: &'a mut TranscriptViewState,
}

impl<'a> TranscriptView<'a> {
    pub fn new(lines: &'a [TerminalLine], is_loading: bool, state: &'a mut TranscriptViewState) -> Self {
        Self {
            lines,
            is_loading,
            state,
        }
    }
}

fn kind_style(kind: LineKind) -> Style {
    match kind {
        LineKind::Input => Style::default().fg(Color::White),
        LineKind::Output => Style::default(),
        LineKind::System => Style::default().fg(Color::DarkGray),
        LineKind::Error => Style::default().fg(Color::Red),
        LineKind::Search => Style::default().fg(Color::Green),
    }
}

/// Converts one transcript line into display rows. Content may span several rows.
fn render_line(line: &TerminalLine) -> Vec<Line<'_>> {
    let style = kind_style(line.kind);
    line.content
        .split('\n')
        .enumerate()
        .map(|(i, row)| {
            if line.kind == LineKind::Input && i == 0 {
                Line::from(vec![
                    Span::styled(INPUT_PREFIX, Style::default().fg(Color::Green)),
                    Span::styled(row, style),
                ])
            } else {
                Line::styled(row, style)
            }
        })
        .collect()
}

impl<'a> Component for TranscriptView<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut rows: Vec<Line> = self.lines.iter().flat_map(render_line).collect();
        if self.is_loading {
            rows.push(Line::from(vec![
                Span::styled("● ", Style::default().fg(Color::Green).add_modifier(Modifier::SLOW_BLINK)),
                Span::styled(LOADING_TEXT, Style::default().fg(Color::DarkGray)),
            ]));
        }

        let paragraph = Paragraph::new(Text::from(rows)).wrap(Wrap { trim: false });
        let total_rows = u16::try_from(paragraph.line_count(area.width)).unwrap_or(u16::MAX);
        self.state.settle(total_rows, area.height);

        frame.render_widget(paragraph.scroll((self.state.offset, 0)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transcript::Transcript;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(transcript: &Transcript, is_loading: bool, state: &mut TranscriptViewState, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(30, height)).unwrap();
        terminal
            .draw(|f| TranscriptView::new(transcript.lines(), is_loading, state).render(f, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_input_lines_get_prompt_prefix() {
        let mut transcript = Transcript::new();
        transcript.push(LineKind::Input, "hello");
        transcript.push(LineKind::Output, "hi there");
        let text = draw(&transcript, false, &mut TranscriptViewState::new(), 5);
        assert!(text.contains("$ hello"));
        assert!(text.contains("hi there"));
    }

    #[test]
    fn test_loading_indicator_only_while_loading() {
        let mut transcript = Transcript::new();
        transcript.push(LineKind::Input, "q");
        assert!(draw(&transcript, true, &mut TranscriptViewState::new(), 5).contains(LOADING_TEXT));
        assert!(!draw(&transcript, false, &mut TranscriptViewState::new(), 5).contains(LOADING_TEXT));
    }

    #[test]
    fn test_multiline_content_splits_into_rows() {
        let line = TerminalLine {
            id: 0,
            kind: LineKind::System,
            content: "Sources:\n1. https://a\n2. https://b".to_string(),
            created_at: chrono::Utc::now(),
        };
        assert_eq!(render_line(&line).len(), 3);
    }

    #[test]
    fn test_sticks_to_bottom_as_content_grows() {
        let mut transcript = Transcript::new();
        for i in 0..10 {
            transcript.push(LineKind::Output, format!("row {i}"));
        }
        let mut state = TranscriptViewState::new();
        let text = draw(&transcript, false, &mut state, 3);
        assert_eq!(state.offset, 7);
        assert!(text.contains("row 9"));
        assert!(!text.contains("row 0"));
    }

    #[test]
    fn test_page_up_unpins_and_page_down_repins() {
        let mut transcript = Transcript::new();
        for i in 0..10 {
            transcript.push(LineKind::Output, format!("row {i}"));
        }
        let mut state = TranscriptViewState::new();
        draw(&transcript, false, &mut state, 3);

        state.handle_event(&TuiEvent::ScrollPageUp);
        assert_eq!(state.offset, 4);
        assert!(!state.stick_to_bottom);

        // New content doesn't move an unpinned view
        transcript.push(LineKind::Output, "row 10");
        draw(&transcript, false, &mut state, 3);
        assert_eq!(state.offset, 4);

        state.handle_event(&TuiEvent::ScrollPageDown);
        state.handle_event(&TuiEvent::ScrollPageDown);
        assert!(state.stick_to_bottom);
        assert_eq!(state.offset, 8);
    }
}
