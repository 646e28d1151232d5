//! # Session State
//!
//! Everything the chat widget knows, owned in one place. Created empty when
//! the widget mounts and dropped when it goes away; nothing is persisted.
//!
//! ```text
//! SessionState
//! ├── transcript: Transcript        // displayed lines
//! ├── is_loading: bool              // a turn is in flight
//! ├── last_error: Option<String>    // message of the last failed turn
//! ├── history: HistoryNavigator     // recall list + cursor
//! ├── active_turn: Option<TurnId>   // which turn may still write
//! └── system_prompt: String         // first message of every request
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use crate::core::history::HistoryNavigator;
use crate::core::transcript::Transcript;

/// Identifies one turn. Actions tagged with a retired id are ignored.
pub type TurnId = u64;

pub struct SessionState {
    pub transcript: Transcript,
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub history: HistoryNavigator,
    pub active_turn: Option<TurnId>,
    pub system_prompt: String,
    next_turn: TurnId,
}

impl SessionState {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            transcript: Transcript::new(),
            is_loading: false,
            last_error: None,
            history: HistoryNavigator::new(),
            active_turn: None,
            system_prompt: system_prompt.into(),
            next_turn: 0,
        }
    }

    /// Marks a new turn as in flight and returns its id.
    pub(crate) fn begin_turn(&mut self) -> TurnId {
        let id = self.next_turn;
        self.next_turn += 1;
        self.active_turn = Some(id);
        self.is_loading = true;
        self.last_error = None;
        id
    }

    /// Retires the in-flight turn, if any, and returns its id.
    pub(crate) fn end_turn(&mut self) -> Option<TurnId> {
        self.is_loading = false;
        self.active_turn.take()
    }

    pub fn is_active(&self, turn: TurnId) -> bool {
        self.active_turn == Some(turn)
    }
}
