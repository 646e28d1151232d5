//! # Core Application Logic
//!
//! This module holds the chat session's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • SessionState         │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • SessionController    │
//!                    └───────────┬─────────────┘
//!                                │ Effect::StartTurn / CancelTurn
//!                                ▼
//!                    ┌─────────────────────────┐
//!                    │     TUI adapter         │
//!                    │  (ratatui + crossterm)  │
//!                    └─────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: `SessionState`, all session data in one place
//! - [`action`]: `Action` and `update()`, the only way state changes
//! - [`transcript`]: the displayed lines and their mapping to model input
//! - [`history`]: Up/Down recall of earlier inputs
//! - [`session`]: runs a turn (search, then streaming) and reports back as actions
//! - [`config`]: layered settings

pub mod action;
pub mod config;
pub mod history;
pub mod session;
pub mod state;
pub mod transcript;
