//! # Session Controller
//!
//! Runs one turn: optional web search, then the streaming completion.
//! It never touches `SessionState` directly. Every change is sent as an
//! [`Action`] to the host loop, which applies it with `update()`.
//!
//! ```text
//! Submitting ──► Searching? ──► Streaming ──► Idle
//!      │              │              │
//!      └──────────────┴──────────────┴──► Failed ──► Idle
//! ```
//!
//! Each await races the turn's `CancellationToken`. Once cancelled, the
//! in-flight request is dropped and nothing but `TurnFinished` is sent.

use std::future::Future;
use std::sync::Arc;
use std::sync::mpsc::Sender;

use futures::StreamExt;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::core::action::{Action, TurnRequest};
use crate::inference::{
    ChatMessage, CompletionProvider, CompletionRequest, GenerationOptions, ProviderError,
};
use crate::search::{SearchProvider, SearchResult, should_search_web};

/// Snippets quoted to the model are cut to this many characters.
const SNIPPET_CHARS: usize = 200;

enum TurnOutcome {
    Completed,
    Cancelled,
}

pub struct SessionController {
    completion: Arc<dyn CompletionProvider>,
    /// `None` disables web search entirely.
    search: Option<Arc<dyn SearchProvider>>,
    options: GenerationOptions,
}

impl SessionController {
    pub fn new(
        completion: Arc<dyn CompletionProvider>,
        search: Option<Arc<dyn SearchProvider>>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            completion,
            search,
            options,
        }
    }

    /// Drives a turn to completion, failure or cancellation.
    /// Always ends by sending `TurnFinished`.
    pub async fn run_turn(&self, request: TurnRequest, tx: Sender<Action>, cancel: CancellationToken) {
        let turn = request.id;
        info!(
            "Turn {} started: {} messages, provider={}",
            turn,
            request.messages.len(),
            self.completion.name()
        );

        match self.drive(request, &tx, &cancel).await {
            Ok(TurnOutcome::Completed) => info!("Turn {} completed", turn),
            Ok(TurnOutcome::Cancelled) => info!("Turn {} cancelled", turn),
            Err(e) => {
                warn!("Turn {} failed: {}", turn, e);
                emit(&tx, Action::TurnFailed {
                    turn,
                    message: e.message().to_string(),
                });
            }
        }
        emit(&tx, Action::TurnFinished { turn });
    }

    async fn drive(
        &self,
        request: TurnRequest,
        tx: &Sender<Action>,
        cancel: &CancellationToken,
    ) -> Result<TurnOutcome, ProviderError> {
        let TurnRequest {
            id: turn,
            message,
            mut messages,
        } = request;

        let mut sources: Vec<SearchResult> = Vec::new();
        if let Some(search) = self.search.as_ref()
            && should_search_web(&message)
        {
            if !emit(tx, Action::SearchStarted {
                turn,
                query: message.clone(),
            }) {
                return Ok(TurnOutcome::Cancelled);
            }

            debug!("Turn {}: searching with {}", turn, search.name());
            let Some(results) = until_cancelled(cancel, search.search(&message)).await else {
                return Ok(TurnOutcome::Cancelled);
            };
            let results = results?;
            debug!("Turn {}: search returned {} results", turn, results.len());

            if !emit(tx, Action::SearchFinished {
                turn,
                result_count: results.len(),
            }) {
                return Ok(TurnOutcome::Cancelled);
            }
            if !results.is_empty() {
                messages.push(search_context_message(&results));
            }
            sources = results;
        }

        if cancel.is_cancelled() || !emit(tx, Action::OutputStarted { turn }) {
            return Ok(TurnOutcome::Cancelled);
        }

        let mut stream = self.completion.stream_completion(CompletionRequest {
            messages,
            options: self.options,
        });

        loop {
            if cancel.is_cancelled() {
                return Ok(TurnOutcome::Cancelled);
            }
            let Some(next) = until_cancelled(cancel, stream.next()).await else {
                return Ok(TurnOutcome::Cancelled);
            };
            let Some(fragment) = next else {
                break;
            };
            let text = fragment?;
            if cancel.is_cancelled() || !emit(tx, Action::Fragment { turn, text }) {
                return Ok(TurnOutcome::Cancelled);
            }
        }

        if !sources.is_empty() {
            let urls = sources.into_iter().map(|r| r.url).collect();
            emit(tx, Action::SourcesReady { turn, urls });
        }
        Ok(TurnOutcome::Completed)
    }
}

/// Sends an action to the host. False means the widget is gone.
fn emit(tx: &Sender<Action>, action: Action) -> bool {
    if tx.send(action).is_err() {
        warn!("Failed to send turn action: receiver dropped");
        return false;
    }
    true
}

/// Runs `fut` unless `cancel` fires first, in which case `fut` is dropped.
async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = fut => Some(output),
    }
}

/// Builds the synthetic user message quoting the top search results.
fn search_context_message(results: &[SearchResult]) -> ChatMessage {
    let context = results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("[{}] {}\n{}\n{}...", i + 1, r.title, r.url, snippet(&r.content)))
        .collect::<Vec<_>>()
        .join("\n\n");
    ChatMessage::user(format!(
        "Based on this search result:\n\n{context}\n\nPlease answer the original question."
    ))
}

fn snippet(content: &str) -> &str {
    match content.char_indices().nth(SNIPPET_CHARS) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}
