use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::state::SessionState;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{TranscriptView, WelcomePanel};

/// Height of the bordered input line.
const INPUT_HEIGHT: u16 = 3;

pub fn draw_ui(frame: &mut Frame, state: &SessionState, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Min(0), Length(INPUT_HEIGHT)]);
    let [title_area, main_area, input_area] = layout.areas(frame.area());

    frame.render_widget(title_line(state, tui), title_area);

    if tui.show_welcome {
        WelcomePanel {
            model_name: &tui.model_name,
            web_search: tui.web_search,
        }
        .render(frame, main_area);
    } else {
        TranscriptView::new(state.transcript.lines(), state.is_loading, &mut tui.transcript_view)
            .render(frame, main_area);
    }

    tui.input_box.busy = state.is_loading;
    tui.input_box.render(frame, input_area);
}

/// `terminal-chat (model: x) | status`, where status reflects the current turn.
fn title_line<'a>(state: &'a SessionState, tui: &'a TuiState) -> Line<'a> {
    let mut spans = vec![
        Span::styled("terminal-chat", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" (model: {})", tui.model_name)),
    ];
    if state.is_loading {
        spans.push(Span::styled(" | esc to cancel", Style::default().fg(Color::DarkGray)));
    } else if let Some(error) = &state.last_error {
        spans.push(Span::styled(format!(" | {error}"), Style::default().fg(Color::Red)));
    }
    if !tui.transcript_view.stick_to_bottom {
        spans.push(Span::styled(" | ↓ More", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::{Action, update};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(state: &SessionState, tui: &mut TuiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| draw_ui(f, state, tui)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_draw_ui_welcome() {
        let state = SessionState::new("sys");
        let mut tui = TuiState::new("test-model", true);
        let text = render(&state, &mut tui);
        assert!(text.contains("terminal-chat (model: test-model)"));
        assert!(text.contains("Ask me anything"));
    }

    #[test]
    fn test_draw_ui_transcript_while_loading() {
        let mut state = SessionState::new("sys");
        update(&mut state, Action::Submit("hello".to_string()));
        let mut tui = TuiState::new("test-model", true);
        tui.show_welcome = false;

        let text = render(&state, &mut tui);
        assert!(text.contains("$ hello"));
        assert!(text.contains("Processing..."));
        assert!(text.contains("esc to cancel"));
        assert!(tui.input_box.busy);
    }

    #[test]
    fn test_title_shows_last_error() {
        let mut state = SessionState::new("sys");
        state.last_error = Some("GROQ_API_KEY not configured".to_string());
        let mut tui = TuiState::new("m", false);
        tui.show_welcome = false;
        assert!(render(&state, &mut tui).contains("| GROQ_API_KEY not configured"));
    }
}
