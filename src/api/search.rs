//! Filtered searches with a completion signal.
//!
//! Each search gets a generation number. When several overlap, the most
//! recently started one wins: responses from older generations are dropped
//! and reported as [`SearchOutcome::Superseded`]. In-flight requests are not
//! cancelled.

use std::future::Future;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::errors::{ClientError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Results replaced the active set; the filter drawer may close.
    Completed { count: usize },
    /// The search failed. The runner keeps the inline message in
    /// [`SearchRunner::error`]; the error itself is handed back unchanged.
    Failed(ClientError),
    /// A newer search started before this one finished.
    Superseded,
}

impl SearchOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SearchOutcome::Completed { .. })
    }
}

struct SearchState<T> {
    results: Option<T>,
    active_filter: Option<&'static str>,
    error: Option<String>,
}

pub struct SearchRunner<T> {
    generation: AtomicU64,
    state: RwLock<SearchState<T>>,
    fallback_message: &'static str,
}

impl<T: Clone> SearchRunner<T> {
    pub fn new(fallback_message: &'static str) -> Self {
        Self {
            generation: AtomicU64::new(0),
            state: RwLock::new(SearchState {
                results: None,
                active_filter: None,
                error: None,
            }),
            fallback_message,
        }
    }

    fn state(&self) -> std::sync::RwLockReadGuard<'_, SearchState<T>> {
        self.state.read().unwrap_or_else(|p| p.into_inner())
    }

    fn state_mut(&self) -> std::sync::RwLockWriteGuard<'_, SearchState<T>> {
        self.state.write().unwrap_or_else(|p| p.into_inner())
    }

    /// Runs one search. `measure` reports how many items a result holds.
    pub async fn run<Fut>(
        &self,
        filter: &'static str,
        search: Fut,
        measure: impl Fn(&T) -> usize,
    ) -> SearchOutcome
    where
        Fut: Future<Output = Result<T>>,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state_mut();
            state.active_filter = Some(filter);
            state.error = None;
        }

        let outcome = search.await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(filter, generation, "dropping superseded search result");
            return SearchOutcome::Superseded;
        }

        let mut state = self.state_mut();
        state.active_filter = None;
        match outcome {
            Ok(results) => {
                let count = measure(&results);
                state.results = Some(results);
                SearchOutcome::Completed { count }
            }
            Err(e) => {
                warn!(filter, error = %e, "search failed");
                state.error = Some(e.user_message(self.fallback_message));
                SearchOutcome::Failed(e)
            }
        }
    }

    /// Active result set, if a search has completed since the last reset.
    pub fn results(&self) -> Option<T> {
        self.state().results.clone()
    }

    /// Filter whose search is in flight, for per-action loading indicators.
    pub fn loading(&self) -> Option<&'static str> {
        self.state().active_filter
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Forgets the active results; readers fall back to the unfiltered data.
    /// Any search still in flight is superseded.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state_mut();
        state.results = None;
        state.active_filter = None;
        state.error = None;
    }
}
