//! # TUI Components
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `WelcomePanel`: start screen with key hints
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `InputBox`: single-line prompt, owns the edit buffer
//! - `TranscriptView`: scrollable transcript, scroll state in `TranscriptViewState`
//!
//! Components receive external data as "props" (struct fields), not by
//! reaching into `SessionState`, so each one can be rendered against a
//! `TestBackend` in isolation.
//!
//! ```text
//! components/
//! ├── mod.rs              (this file)
//! ├── input_box.rs        (Prompt line)
//! ├── transcript_view.rs  (Transcript + loading indicator)
//! └── welcome.rs          (Start screen)
//! ```

pub mod input_box;
pub mod transcript_view;
pub mod welcome;

pub use input_box::{InputBox, InputEvent};
pub use transcript_view::{TranscriptView, TranscriptViewState};
pub use welcome::WelcomePanel;
