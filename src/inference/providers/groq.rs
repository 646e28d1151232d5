//! Groq provider implementation using the OpenAI-compatible Chat Completions API.
//!
//! Any endpoint that speaks `POST /chat/completions` with `stream: true` works;
//! point `base_url` elsewhere to use it.

use async_stream::try_stream;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::inference::sse::{self, SseLine, SseLineBuffer};
use crate::inference::provider::boxed_stream;
use crate::inference::{
    ChatMessage, CompletionProvider, CompletionRequest, CompletionStream, ProviderError,
};

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GROQ_MODEL: &str = "moonshotai/kimi-k2-instruct";

const FALLBACK_ERROR_MESSAGE: &str = "Groq API error";

// ============================================================================
// Chat Completions API Types
// ============================================================================

/// The request body for the Chat Completions API
#[derive(Serialize, Debug)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

/// Error body: `{"error": {"message": "..."}}`
#[derive(Deserialize, Debug)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Pulls the provider's message out of an error body, falling back to a generic one.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Groq API provider (OpenAI-compatible chat completions)
pub struct GroqProvider {
    api_key: Option<String>,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl GroqProvider {
    /// Creates a new Groq provider.
    ///
    /// # Arguments
    /// * `api_key` - Groq API key. `None` is accepted here and reported on first use.
    /// * `base_url` - Optional custom base URL (defaults to Groq's API)
    /// * `model` - Model identifier sent with every request
    pub fn new(api_key: Option<String>, base_url: Option<String>, model: String) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.to_string()),
            model,
            client: reqwest::Client::new(),
        }
    }
}

/// Sends the request and returns the response once a success status is seen.
async fn send_request(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    body: &ChatCompletionsRequest<'_>,
) -> Result<reqwest::Response, ProviderError> {
    let response = client
        .post(url)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(body)
        .send()
        .await
        .map_err(|e| ProviderError::Network(e.to_string()))?;

    debug!("Groq response status: {}", response.status());

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let err_body = response.text().await.unwrap_or_default();
        warn!("Groq API error: {} - {}", status, err_body);
        return Err(ProviderError::Api {
            status,
            message: error_message(&err_body),
        });
    }

    Ok(response)
}

impl CompletionProvider for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    fn stream_completion(&self, request: CompletionRequest) -> CompletionStream {
        let client = self.client.clone();
        let api_key = self.api_key.clone();
        let url = format!("{}/chat/completions", self.base_url);
        let model = self.model.clone();

        boxed_stream(try_stream! {
            let api_key = api_key
                .ok_or_else(|| ProviderError::Config("GROQ_API_KEY not configured".to_string()))?;

            let body = ChatCompletionsRequest {
                model: &model,
                messages: &request.messages,
                temperature: request.options.temperature,
                max_tokens: request.options.max_output_tokens,
                stream: true,
            };

            info!(
                "Groq request: model={}, message_count={}, temperature={}, max_tokens={}",
                model,
                body.messages.len(),
                body.temperature,
                body.max_tokens
            );

            let mut response = send_request(&client, &url, &api_key, &body).await?;

            let mut buffer = SseLineBuffer::new();
            let mut fragment_count = 0usize;
            let mut total_content_len = 0usize;
            let mut done = false;

            'read: while let Some(chunk) = response
                .chunk()
                .await
                .map_err(|e| ProviderError::Network(e.to_string()))?
            {
                debug!("Raw chunk received: {} bytes", chunk.len());
                for line in buffer.push(&chunk) {
                    match sse::parse_line(&line) {
                        SseLine::Fragment(text) => {
                            fragment_count += 1;
                            total_content_len += text.len();
                            yield text;
                        }
                        SseLine::Done => {
                            debug!("Received [DONE] marker");
                            done = true;
                            break 'read;
                        }
                        SseLine::Malformed(e) => {
                            debug!("Skipping malformed chunk: {} ({})", e, line);
                        }
                        SseLine::NoContent | SseLine::Ignored => {}
                    }
                }
            }

            // Body ended without a trailing newline
            if !done {
                if let Some(SseLine::Fragment(text)) = buffer.finish().map(|line| sse::parse_line(&line)) {
                    fragment_count += 1;
                    total_content_len += text.len();
                    yield text;
                }
            }

            info!(
                "Stream ended: {} fragments, {} content bytes",
                fragment_count, total_content_len
            );
        })
    }
}
