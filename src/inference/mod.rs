pub mod provider;
pub mod providers;
pub mod sse;
pub mod types;

pub use provider::{CompletionProvider, CompletionRequest, CompletionStream, ProviderError};
pub use providers::GroqProvider;
pub use types::{ChatMessage, GenerationOptions, Role};
