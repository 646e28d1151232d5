use std::fmt;
use std::pin::Pin;

use futures::Stream;

use super::types::{ChatMessage, GenerationOptions};

/// Errors that can occur during provider operations (completion or search).
/// Variants carry enough info to decide how the failure is reported.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Provider misconfigured (missing API key). Raised on first use.
    Config(String),
    /// Network-level failure (DNS, connection refused, reset mid-stream).
    Network(String),
    /// The API answered with a non-success status.
    Api { status: u16, message: String },
    /// A response body could not be decoded at all.
    Parse(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Config(msg) => write!(f, "{msg}"),
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Api { status, message } => write!(f, "{message} (HTTP {status})"),
            ProviderError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    /// The provider's own message, without the status or category prefix.
    /// This is what the transcript shows; `Display` is for logs.
    pub fn message(&self) -> &str {
        match self {
            ProviderError::Config(msg)
            | ProviderError::Network(msg)
            | ProviderError::Parse(msg) => msg,
            ProviderError::Api { message, .. } => message,
        }
    }
}

/// Everything a provider needs to fulfill a completion request.
///
/// Owned, because the returned stream outlives the call that created it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub options: GenerationOptions,
}

/// Lazy sequence of text fragments, in arrival order.
///
/// Nothing is sent until the first poll. Dropping the stream releases the
/// underlying connection, which is how consumers cancel.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// Boxes a fragment stream into a [`CompletionStream`].
pub fn boxed_stream<S>(stream: S) -> CompletionStream
where
    S: Stream<Item = Result<String, ProviderError>> + Send + 'static,
{
    Box::pin(stream)
}

pub trait CompletionProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Streams a completion for the given messages.
    fn stream_completion(&self, request: CompletionRequest) -> CompletionStream;
}
