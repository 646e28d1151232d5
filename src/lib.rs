//! terminal-chat library exports for testing

pub mod core;
pub mod inference;
pub mod search;
pub mod tui;

#[cfg(test)]
pub mod test_support;
