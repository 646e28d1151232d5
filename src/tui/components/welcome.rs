//! # Welcome Panel
//!
//! Shown on start and after Ctrl+L until the next submission.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

pub struct WelcomePanel<'a> {
    pub model_name: &'a str,
    pub web_search: bool,
}

impl<'a> WelcomePanel<'a> {
    fn lines(&self) -> Vec<Line<'a>> {
        let key = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        let muted = Style::default().fg(Color::DarkGray);
        let search_state = if self.web_search { "on" } else { "off" };

        vec![
            Line::from(Span::styled(
                "terminal-chat",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(format!("v{}", env!("CARGO_PKG_VERSION")), muted)),
            Line::default(),
            Line::from(Span::styled("Ask me anything...", muted)),
            Line::from(Span::styled(
                format!("model: {} | web search: {}", self.model_name, search_state),
                muted,
            )),
            Line::default(),
            Line::from(vec![
                Span::styled("enter", key),
                Span::styled(" send  ", muted),
                Span::styled("↑↓", key),
                Span::styled(" history  ", muted),
                Span::styled("esc", key),
                Span::styled(" cancel  ", muted),
                Span::styled("ctrl+l", key),
                Span::styled(" clear  ", muted),
                Span::styled("ctrl+c", key),
                Span::styled(" quit", muted),
            ]),
        ]
    }
}

impl<'a> Component for WelcomePanel<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let lines = self.lines();
        let height = lines.len() as u16;
        let [centered] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(area);
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), centered);
    }
}
