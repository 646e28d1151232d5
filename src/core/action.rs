//! # Actions
//!
//! Everything that can happen to a chat session becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! A fragment streams in? That's `Action::Fragment { turn, text }`.
//!
//! The `update()` function takes the current state and an action, mutates the
//! state, and returns an `Effect` describing the I/O the host should start.
//! No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Actions emitted by a turn carry its `TurnId`. Once a turn is cancelled or
//! cleared its id is retired, and anything it still sends is dropped, so a
//! cancelled turn can never write to the transcript again.

use log::debug;

use crate::core::history::Direction;
use crate::core::state::{SessionState, TurnId};
use crate::core::transcript::LineKind;
use crate::inference::ChatMessage;

/// Number of trailing lines kept by a clear.
pub const CLEAR_RETAIN_LINES: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The user pressed Enter with this input.
    Submit(String),
    /// Up/Down recall with the current edit buffer.
    Recall { direction: Direction, buffer: String },
    /// Esc: abandon the in-flight turn.
    Cancel,
    /// Ctrl+L: keep the last lines, reset loading and error.
    Clear,
    /// Widget teardown.
    Quit,

    // Emitted by the session controller while a turn runs
    SearchStarted { turn: TurnId, query: String },
    SearchFinished { turn: TurnId, result_count: usize },
    OutputStarted { turn: TurnId },
    Fragment { turn: TurnId, text: String },
    SourcesReady { turn: TurnId, urls: Vec<String> },
    TurnFailed { turn: TurnId, message: String },
    TurnFinished { turn: TurnId },
}

/// Work handed to the session controller when a submission is accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnRequest {
    pub id: TurnId,
    /// Trimmed user input.
    pub message: String,
    /// Model input: system prompt, prior conversation, then `message`.
    pub messages: Vec<ChatMessage>,
}

/// Side effect the host must perform after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Run this turn on the session controller.
    StartTurn(TurnRequest),
    /// Cancel the token of this turn.
    CancelTurn(TurnId),
    /// Replace the input buffer (history recall).
    ReplaceInput(String),
    Quit,
}

pub fn update(state: &mut SessionState, action: Action) -> Effect {
    match action {
        Action::Submit(raw) => submit(state, &raw),
        Action::Recall { direction, buffer } => {
            Effect::ReplaceInput(state.history.recall(direction, &buffer))
        }
        Action::Cancel => match state.end_turn() {
            Some(turn) => {
                debug!("Turn {} cancelled", turn);
                Effect::CancelTurn(turn)
            }
            None => Effect::None,
        },
        Action::Clear => {
            state.transcript.retain_tail(CLEAR_RETAIN_LINES);
            state.last_error = None;
            match state.end_turn() {
                Some(turn) => {
                    debug!("Clear retired in-flight turn {}", turn);
                    Effect::CancelTurn(turn)
                }
                None => Effect::None,
            }
        }
        Action::Quit => {
            state.end_turn();
            Effect::Quit
        }
        action => apply_turn_event(state, action),
    }
}

/// Validates a submission and starts a turn.
fn submit(state: &mut SessionState, raw: &str) -> Effect {
    let message = raw.trim();
    if message.is_empty() {
        debug!("Ignoring empty submission");
        return Effect::None;
    }
    if state.is_loading {
        debug!("Ignoring submission while a turn is in flight");
        return Effect::None;
    }

    // Model input reflects the conversation before this input line.
    let mut messages = state.transcript.to_chat_messages(&state.system_prompt);
    messages.push(ChatMessage::user(message));

    state.transcript.push(LineKind::Input, message);
    state.history.record(message);
    let id = state.begin_turn();

    Effect::StartTurn(TurnRequest {
        id,
        message: message.to_string(),
        messages,
    })
}

/// Applies an event from the running turn, or drops it if the turn was retired.
fn apply_turn_event(state: &mut SessionState, action: Action) -> Effect {
    let turn = match &action {
        Action::SearchStarted { turn, .. }
        | Action::SearchFinished { turn, .. }
        | Action::OutputStarted { turn }
        | Action::Fragment { turn, .. }
        | Action::SourcesReady { turn, .. }
        | Action::TurnFailed { turn, .. }
        | Action::TurnFinished { turn } => *turn,
        _ => return Effect::None,
    };
    if !state.is_active(turn) {
        debug!("Dropping action for retired turn {}: {:?}", turn, action);
        return Effect::None;
    }

    match action {
        Action::SearchStarted { query, .. } => {
            state
                .transcript
                .push(LineKind::Search, format!("Searching web for: \"{query}\"..."));
        }
        Action::SearchFinished { result_count, .. } => {
            state
                .transcript
                .append_to_last(&format!("Search complete. Found {result_count} results.\n\n"));
        }
        Action::OutputStarted { .. } => {
            state.transcript.push(LineKind::Output, "");
        }
        Action::Fragment { text, .. } => {
            state.transcript.append_to_last(&text);
        }
        Action::SourcesReady { urls, .. } => {
            let listing: Vec<String> = urls
                .iter()
                .enumerate()
                .map(|(i, url)| format!("{}. {}", i + 1, url))
                .collect();
            state
                .transcript
                .push(LineKind::System, format!("\nSources:\n{}", listing.join("\n")));
        }
        Action::TurnFailed { message, .. } => {
            state
                .transcript
                .push(LineKind::Error, format!("Error: {message}"));
            state.last_error = Some(message);
        }
        Action::TurnFinished { .. } => {
            state.end_turn();
        }
        _ => {}
    }
    Effect::None
}
