//! # Web Search
//!
//! Optional augmentation for questions that need fresh information.
//! [`trigger::should_search_web`] decides, a [`SearchProvider`] fetches.

pub mod provider;
pub mod tavily;
pub mod trigger;

pub use provider::{SearchProvider, SearchResult};
pub use tavily::{SearchOptions, TavilyProvider};
pub use trigger::should_search_web;
