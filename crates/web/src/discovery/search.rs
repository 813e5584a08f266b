//! Debounced search.
//!
//! Input changes are fed through a channel. A search runs once the input has
//! been quiet for [`SEARCH_QUIET_PERIOD`]; blank input clears results
//! immediately and cancels the pending search. In-flight searches are never
//! cancelled, so a slow stale search can still overwrite a fresher result.
//!
//! This is the library form of the rule the landing page applies in the
//! browser with `hx-trigger="input changed delay:300ms"` against `/search`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::debug;

use gymnet_core::Profile;

use super::ProfileSource;

/// Quiet period before a search runs.
pub const SEARCH_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// The latest published search result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    /// Term that produced `profiles`; empty after a clear.
    pub query: String,
    pub profiles: Vec<Profile>,
}

/// Handle to a running debounced search.
///
/// Dropping the handle closes the input channel, which stops the debounce
/// task.
pub struct DebouncedSearch {
    input: mpsc::UnboundedSender<String>,
    results: watch::Receiver<SearchResults>,
    task: JoinHandle<()>,
}

impl DebouncedSearch {
    /// Start a debounce task searching `source`.
    pub fn spawn<S>(source: Arc<S>, quiet: Duration) -> Self
    where
        S: ProfileSource + 'static,
    {
        let (input, rx) = mpsc::unbounded_channel();
        let (results_tx, results) = watch::channel(SearchResults::default());
        let task = tokio::spawn(debounce(source, quiet, rx, Arc::new(results_tx)));

        Self {
            input,
            results,
            task,
        }
    }

    /// Record an input change.
    pub fn input(&self, text: impl Into<String>) {
        if self.input.send(text.into()).is_err() {
            debug!("Debounce task has stopped; input dropped");
        }
    }

    /// Latest published results.
    #[must_use]
    pub fn results(&self) -> SearchResults {
        self.results.borrow().clone()
    }

    /// Watch for newly published results.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchResults> {
        self.results.clone()
    }
}

impl Drop for DebouncedSearch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn debounce<S>(
    source: Arc<S>,
    quiet: Duration,
    mut rx: mpsc::UnboundedReceiver<String>,
    results: Arc<watch::Sender<SearchResults>>,
) where
    S: ProfileSource + 'static,
{
    let mut pending: Option<String> = None;

    loop {
        let next = if pending.is_some() {
            match timeout(quiet, rx.recv()).await {
                Ok(next) => next,
                Err(_) => {
                    if let Some(term) = pending.take() {
                        run_search(Arc::clone(&source), term, Arc::clone(&results));
                    }
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match next {
            Some(text) if text.trim().is_empty() => {
                pending = None;
                results.send_replace(SearchResults::default());
            }
            Some(text) => pending = Some(text.trim().to_string()),
            None => break,
        }
    }
}

/// Run one search in its own task; the result is published on completion.
fn run_search<S>(source: Arc<S>, term: String, results: Arc<watch::Sender<SearchResults>>)
where
    S: ProfileSource + 'static,
{
    tokio::spawn(async move {
        let profiles = source.search(&term).await;
        debug!(query = %term, count = profiles.len(), "Search finished");
        results.send_replace(SearchResults {
            query: term,
            profiles,
        });
    });
}
