//! # Transcript
//!
//! The ordered log of terminal lines. It is the single source of truth for
//! what is displayed and, filtered to input/output lines, for what the model
//! sees.
//!
//! ```text
//! Transcript
//! ├── lines: Vec<TerminalLine>   // append-only, except retain_tail()
//! └── next_id: LineId            // monotonic, survives truncation
//! ```
//!
//! Only the last line may change after it is appended (streamed output and the
//! search status line both grow in place).

use chrono::{DateTime, Utc};

use crate::inference::ChatMessage;

/// Stable identifier of a line. Never reused within a transcript.
pub type LineId = u64;

/// How a line renders and whether it participates in model context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// What the user typed.
    Input,
    /// Model response, grows while streaming.
    Output,
    /// Informational, e.g. the sources listing.
    System,
    /// A failed turn.
    Error,
    /// Web search status.
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerminalLine {
    pub id: LineId,
    pub kind: LineKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct Transcript {
    lines: Vec<TerminalLine>,
    next_id: LineId,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[TerminalLine] {
        &self.lines
    }

    pub fn last(&self) -> Option<&TerminalLine> {
        self.lines.last()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Appends a line with a fresh id and the current time.
    pub fn push(&mut self, kind: LineKind, content: impl Into<String>) -> LineId {
        let id = self.next_id;
        self.next_id += 1;
        self.lines.push(TerminalLine {
            id,
            kind,
            content: content.into(),
            created_at: Utc::now(),
        });
        id
    }

    /// Concatenates `text` onto the last line. Returns false (and does nothing)
    /// when the transcript is empty.
    pub fn append_to_last(&mut self, text: &str) -> bool {
        match self.lines.last_mut() {
            Some(line) => {
                line.content.push_str(text);
                true
            }
            None => false,
        }
    }

    /// Drops everything but the last `keep` lines.
    pub fn retain_tail(&mut self, keep: usize) {
        let excess = self.lines.len().saturating_sub(keep);
        self.lines.drain(..excess);
    }

    /// Builds model input: the system prompt, then one message per input/output line.
    pub fn to_chat_messages(&self, system_prompt: &str) -> Vec<ChatMessage> {
        std::iter::once(ChatMessage::system(system_prompt))
            .chain(self.lines.iter().filter_map(|line| match line.kind {
                LineKind::Input => Some(ChatMessage::user(line.content.clone())),
                LineKind::Output => Some(ChatMessage::assistant(line.content.clone())),
                LineKind::System | LineKind::Error | LineKind::Search => None,
            }))
            .collect()
    }
}
