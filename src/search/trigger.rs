//! Keyword policy deciding whether a question gets a web search first.

/// Substrings that suggest the answer depends on current or external information.
const SEARCH_TRIGGERS: &[&str] = &[
    "latest",
    "recent",
    "news",
    "current",
    "today",
    "2024",
    "2025",
    "what is",
    "who is",
    "when did",
    "how to",
    "docs",
    "documentation",
    "official",
    "website",
];

/// Returns true if the message contains any trigger (case-insensitive).
pub fn should_search_web(message: &str) -> bool {
    let lower = message.to_lowercase();
    SEARCH_TRIGGERS.iter().any(|trigger| lower.contains(trigger))
}
