//! # Recall History
//!
//! Previously submitted inputs, navigable with Up/Down like a shell.
//! Kept apart from the transcript so clearing the screen doesn't lose recall.

/// Direction of a recall gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Recall list plus cursor. `cursor == entries.len()` means "at the live edit buffer".
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    entries: Vec<String>,
    cursor: usize,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Records a submission, dropping it if it repeats the last entry.
    /// Always returns the cursor to the live position.
    pub fn record(&mut self, command: &str) {
        if self.entries.last().map(String::as_str) != Some(command) {
            self.entries.push(command.to_string());
        }
        self.cursor = self.entries.len();
    }

    /// Moves the cursor and returns the text the input should show.
    /// Past the newest entry, `buffer` comes back unchanged.
    pub fn recall(&mut self, direction: Direction, buffer: &str) -> String {
        self.cursor = match direction {
            Direction::Up => self.cursor.saturating_sub(1),
            Direction::Down => (self.cursor + 1).min(self.entries.len()),
        };
        self.entries
            .get(self.cursor)
            .cloned()
            .unwrap_or_else(|| buffer.to_string())
    }
}
