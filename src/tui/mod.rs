//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Turn Lifecycle
//!
//! `Effect::StartTurn` spawns `SessionController::run_turn` on the tokio
//! runtime with a fresh `CancellationToken`. The task reports back over a
//! `std::sync::mpsc` channel that this loop drains every iteration, so
//! `update()` is only ever called from here. `Effect::CancelTurn` (Esc,
//! Ctrl+L) and quitting cancel the token.
//!
//! ## Redraw Strategy
//!
//! - **Loading**: polls every ~50ms so streamed fragments show up promptly.
//! - **Idle**: sleeps up to 500ms, only redraws on events or terminal resize.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::cursor::{SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use tokio_util::sync::CancellationToken;

use crate::core::action::{Action, Effect, TurnRequest, update};
use crate::core::config::ResolvedConfig;
use crate::core::history::Direction;
use crate::core::session::SessionController;
use crate::core::state::{SessionState, TurnId};
use crate::inference::{CompletionProvider, GroqProvider};
use crate::search::{SearchProvider, TavilyProvider};
use crate::tui::component::EventHandler;
use crate::tui::components::{InputBox, InputEvent, TranscriptViewState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub input_box: InputBox,
    pub transcript_view: TranscriptViewState,
    /// Welcome panel replaces the transcript until the next Enter
    pub show_welcome: bool,
    // Props for the title bar and welcome panel
    pub model_name: String,
    pub web_search: bool,
}

impl TuiState {
    pub fn new(model_name: &str, web_search: bool) -> Self {
        Self {
            input_box: InputBox::new(),
            transcript_view: TranscriptViewState::new(),
            show_welcome: true,
            model_name: model_name.to_string(),
            web_search,
        }
    }
}

/// The turn currently allowed to run, and how to stop it.
struct ActiveTurn {
    id: TurnId,
    cancel: CancellationToken,
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Terminals without the Kitty keyboard protocol ignore the push
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags, DisableBracketedPaste);
    }
}

/// Build the session controller from resolved credentials and options.
///
/// Missing keys are not fatal here: the first turn that needs one fails with
/// a configuration error and the widget stays usable.
pub fn build_controller(config: &ResolvedConfig) -> SessionController {
    if config.groq_api_key.is_none() {
        warn!("GROQ_API_KEY not set (config file or env var); turns will fail");
    }
    let completion: Arc<dyn CompletionProvider> = Arc::new(GroqProvider::new(
        config.groq_api_key.clone(),
        Some(config.groq_base_url.clone()),
        config.model_name.clone(),
    ));

    let search: Option<Arc<dyn SearchProvider>> = if config.web_search {
        if config.tavily_api_key.is_none() {
            warn!("TAVILY_API_KEY not set; searched turns will fail (use --no-search to disable)");
        }
        Some(Arc::new(TavilyProvider::new(
            config.tavily_api_key.clone(),
            Some(config.tavily_base_url.clone()),
            config.search,
        )))
    } else {
        info!("Web search disabled");
        None
    };

    SessionController::new(completion, search, config.generation)
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let controller = Arc::new(build_controller(&config));
    let mut state = SessionState::new(config.system_prompt.clone());
    let mut tui = TuiState::new(&config.model_name, config.web_search);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new()
        .map_err(|e| warn!("Failed to enable terminal modes: {}", e))
        .ok();

    // Channel for actions from turn tasks
    let (tx, rx) = mpsc::channel();
    let mut active: Option<ActiveTurn> = None;
    let mut needs_redraw = true; // Force first frame

    'event_loop: loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &state, &mut tui))?;
            needs_redraw = false;
        }

        let timeout = if state.is_loading {
            Duration::from_millis(50)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let Some(action) = action_for_event(event, &mut tui) else {
                continue;
            };
            if apply(&mut state, &mut tui, action, &controller, &tx, &mut active) {
                break 'event_loop;
            }
        }

        // Handle turn task actions (search status, streamed fragments)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if apply(&mut state, &mut tui, action, &controller, &tx, &mut active) {
                break 'event_loop;
            }
        }
    }

    // Tearing down the widget cancels whatever is still running
    if let Some(turn) = active.take() {
        turn.cancel.cancel();
    }

    ratatui::restore();
    Ok(())
}

/// Routes a terminal event: TUI-local events are handled here, the rest
/// become core actions.
fn action_for_event(event: TuiEvent, tui: &mut TuiState) -> Option<Action> {
    match event {
        TuiEvent::Resize => None,
        TuiEvent::Quit => Some(Action::Quit),
        TuiEvent::Cancel => Some(Action::Cancel),
        TuiEvent::Clear => {
            tui.show_welcome = true;
            tui.transcript_view = TranscriptViewState::new();
            Some(Action::Clear)
        }
        TuiEvent::HistoryUp => Some(Action::Recall {
            direction: Direction::Up,
            buffer: tui.input_box.text().to_string(),
        }),
        TuiEvent::HistoryDown => Some(Action::Recall {
            direction: Direction::Down,
            buffer: tui.input_box.text().to_string(),
        }),
        TuiEvent::ScrollPageUp | TuiEvent::ScrollPageDown => {
            tui.transcript_view.handle_event(&event);
            None
        }
        TuiEvent::Submit | TuiEvent::InputChar(_) | TuiEvent::Paste(_) | TuiEvent::Backspace => {
            match tui.input_box.handle_event(&event)? {
                InputEvent::Submit(text) => Some(Action::Submit(text)),
                InputEvent::ContentChanged => None,
            }
        }
    }
}

/// Applies an action and performs its effect. Returns true when the app should quit.
fn apply(
    state: &mut SessionState,
    tui: &mut TuiState,
    action: Action,
    controller: &Arc<SessionController>,
    tx: &mpsc::Sender<Action>,
    active: &mut Option<ActiveTurn>,
) -> bool {
    match update(state, action) {
        Effect::None => {}
        Effect::StartTurn(request) => {
            tui.show_welcome = false;
            tui.input_box.clear();
            tui.transcript_view.stick_to_bottom = true;
            *active = Some(spawn_turn(controller.clone(), request, tx.clone()));
        }
        Effect::CancelTurn(turn) => {
            if let Some(active_turn) = active.take_if(|a| a.id == turn) {
                info!("Cancelling turn {}", turn);
                active_turn.cancel.cancel();
            }
        }
        Effect::ReplaceInput(text) => tui.input_box.set_text(text),
        Effect::Quit => return true,
    }
    false
}

fn spawn_turn(
    controller: Arc<SessionController>,
    request: TurnRequest,
    tx: mpsc::Sender<Action>,
) -> ActiveTurn {
    info!("Spawning turn {}", request.id);
    let id = request.id;
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        controller.run_turn(request, tx, token).await;
    });
    ActiveTurn { id, cancel }
}
