//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

use async_stream::stream;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::action::{Action, Effect, update};
use crate::core::session::SessionController;
use crate::core::state::SessionState;
use crate::inference::provider::boxed_stream;
use crate::inference::{CompletionProvider, CompletionRequest, CompletionStream, ProviderError};
use crate::search::{SearchProvider, SearchResult};

/// Streams a fixed list of fragments, optionally ending in an error.
pub struct ScriptedProvider {
    fragments: Vec<String>,
    failure: Option<ProviderError>,
    /// Cancels the token once this many fragments have been yielded.
    cancel_after: Option<(usize, CancellationToken)>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    pub fn new(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            failure: None,
            cancel_after: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(fragments: &[&str], error: ProviderError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(fragments)
        }
    }

    pub fn cancel_after(mut self, count: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((count, token));
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn stream_completion(&self, request: CompletionRequest) -> CompletionStream {
        self.requests.lock().unwrap().push(request);
        let fragments = self.fragments.clone();
        let failure = self.failure.clone();
        let cancel_after = self.cancel_after.clone();

        boxed_stream(stream! {
            for (i, fragment) in fragments.into_iter().enumerate() {
                yield Ok(fragment);
                if let Some((count, token)) = &cancel_after {
                    if i + 1 == *count {
                        token.cancel();
                    }
                }
            }
            if let Some(error) = failure {
                yield Err(error);
            }
        })
    }
}

/// Returns the same results for every query and counts calls.
pub struct StaticSearch {
    results: Vec<SearchResult>,
    calls: AtomicUsize,
}

impl StaticSearch {
    pub fn new(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.results.clone())
    }
}

/// Fails every search with the given error.
pub struct FailingSearch(pub ProviderError);

#[async_trait]
impl SearchProvider for FailingSearch {
    fn name(&self) -> &str {
        "failing"
    }

    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, ProviderError> {
        Err(self.0.clone())
    }
}

pub fn result(title: &str, url: &str, content: &str) -> SearchResult {
    SearchResult {
        title: title.to_string(),
        url: url.to_string(),
        content: content.to_string(),
        score: 1.0,
    }
}

/// Submits `input`, runs the turn to completion, and applies every action
/// it emitted, the way the host loop would.
pub async fn run_turn(
    state: &mut SessionState,
    controller: &SessionController,
    input: &str,
    cancel: CancellationToken,
) {
    let request = match update(state, Action::Submit(input.to_string())) {
        Effect::StartTurn(request) => request,
        other => panic!("Expected StartTurn, got {:?}", other),
    };

    let (tx, rx) = mpsc::channel();
    controller.run_turn(request, tx, cancel).await;
    for action in rx.try_iter() {
        update(state, action);
    }
}
