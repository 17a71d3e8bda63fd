//! Debounced, generation-guarded search service.
//!
//! One service instance backs one editing session's search box. Keystrokes
//! arrive via [`SearchService::set_query`]; the service debounces them,
//! runs the provider chain, and publishes results into a snapshot the UI
//! polls. Every scheduled lookup carries a generation number; only the
//! latest generation may write shared state, so responses arriving out of
//! order can never resurrect a superseded query's results.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use stamp_core::SelectedLocation;
use tokio::task::JoinHandle;

use crate::provider::ProviderChain;
use crate::suggestion::PlaceSuggestion;

/// Fixed debounce delay between the last keystroke and the lookup.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(350);

/// Queries shorter than this are cleared, not searched.
pub const MIN_QUERY_LEN: usize = 2;

/// Message published when the chain answered with zero hits.
const NO_RESULTS: &str = "No results found";

/// Lifecycle of one query session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPhase {
    /// Nothing searchable typed.
    #[default]
    Idle,
    /// Waiting out the debounce delay.
    Debouncing,
    /// A lookup is in flight.
    Searching,
    /// The latest lookup produced suggestions.
    Resolved,
    /// The latest lookup failed or had no hits.
    Failed,
}

/// Point-in-time view of the search state, for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SearchSnapshot {
    /// Current query text.
    pub query: String,
    /// Where the query session is in its lifecycle.
    pub phase: SearchPhase,
    /// Suggestions from the latest resolved lookup.
    pub suggestions: Vec<PlaceSuggestion>,
    /// Accepted override, if any.
    pub selected: Option<SelectedLocation>,
    /// Error or no-results message from the latest failed lookup.
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct SearchState {
    query: String,
    phase: SearchPhase,
    suggestions: Vec<PlaceSuggestion>,
    selected: Option<SelectedLocation>,
    last_error: Option<String>,
}

/// Debounced place search over an ordered provider chain.
///
/// Methods must be called from within a tokio runtime; the debounce timer
/// runs as a spawned task. Dropping the service aborts any pending timer.
pub struct SearchService {
    state: Arc<Mutex<SearchState>>,
    providers: Arc<ProviderChain>,
    /// Bumped on every input that supersedes earlier lookups. A scheduled
    /// lookup captures the post-bump value and abandons itself the moment
    /// the live counter has moved past it.
    generation: Arc<AtomicU64>,
    debounce: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SearchService {
    /// Create a service with the standard debounce delay.
    #[must_use]
    pub fn new(providers: ProviderChain) -> Self {
        Self::with_debounce(providers, DEBOUNCE_DELAY)
    }

    /// Create a service with a custom debounce delay.
    #[must_use]
    pub fn with_debounce(providers: ProviderChain, debounce: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(SearchState::default())),
            providers: Arc::new(providers),
            generation: Arc::new(AtomicU64::new(0)),
            debounce,
            pending: Mutex::new(None),
        }
    }

    /// Record a keystroke.
    ///
    /// Supersedes any scheduled or in-flight lookup, clears the override
    /// when the text no longer matches its label, and either clears state
    /// synchronously (short query) or schedules a debounced lookup.
    pub fn set_query(&self, text: &str) {
        self.handle_input(text, Some(self.debounce));
    }

    /// Search immediately, skipping the debounce (submit action).
    pub fn search_now(&self, text: &str) {
        self.handle_input(text, None);
    }

    fn handle_input(&self, text: &str, delay: Option<Duration>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let mut state = self.lock_state();
        state.query = text.to_string();
        if state
            .selected
            .as_ref()
            .is_some_and(|selected| selected.label != text)
        {
            state.selected = None;
        }

        if text.chars().count() < MIN_QUERY_LEN {
            state.suggestions.clear();
            state.last_error = None;
            state.phase = SearchPhase::Idle;
            drop(state);
            if let Some(handle) = self.take_pending() {
                handle.abort();
            }
            return;
        }

        state.phase = SearchPhase::Debouncing;
        drop(state);

        let handle = tokio::spawn(run_lookup(
            Arc::clone(&self.state),
            Arc::clone(&self.providers),
            Arc::clone(&self.generation),
            text.to_string(),
            generation,
            delay,
        ));
        // Superseded tasks abandon themselves via the generation check, so
        // the previous handle is only replaced, never aborted here.
        let _superseded = self.replace_pending(handle);
    }

    /// Accept a suggestion.
    ///
    /// Parses the coordinates; on success the override is set, the query
    /// text becomes the suggestion's label, and the suggestion list is
    /// cleared. Unparsable suggestions are ignored with no state change.
    pub fn select(&self, suggestion: &PlaceSuggestion) -> Option<SelectedLocation> {
        let Some(selected) = suggestion.to_selected() else {
            tracing::debug!(id = %suggestion.id, "ignoring suggestion with unparsable coordinates");
            return None;
        };

        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.take_pending() {
            handle.abort();
        }

        let mut state = self.lock_state();
        state.query = selected.label.clone();
        state.suggestions.clear();
        state.last_error = None;
        state.phase = SearchPhase::Idle;
        state.selected = Some(selected.clone());
        Some(selected)
    }

    /// Tear the query session down: cancel the pending timer, invalidate
    /// in-flight lookups, and clear all state. Also used when a new base
    /// image starts a fresh editing session.
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.take_pending() {
            handle.abort();
        }
        let mut state = self.lock_state();
        *state = SearchState::default();
    }

    /// Current state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> SearchSnapshot {
        let state = self.lock_state();
        SearchSnapshot {
            query: state.query.clone(),
            phase: state.phase,
            suggestions: state.suggestions.clone(),
            selected: state.selected.clone(),
            last_error: state.last_error.clone(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_pending(&self) -> Option<JoinHandle<()>> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn replace_pending(&self, handle: JoinHandle<()>) -> Option<JoinHandle<()>> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle)
    }
}

impl Drop for SearchService {
    fn drop(&mut self) {
        // No timer may fire after teardown.
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.take_pending() {
            handle.abort();
        }
    }
}

/// One scheduled lookup: debounce, then search, then a generation-gated
/// write of the outcome.
async fn run_lookup(
    state: Arc<Mutex<SearchState>>,
    providers: Arc<ProviderChain>,
    generation: Arc<AtomicU64>,
    query: String,
    scheduled: u64,
    delay: Option<Duration>,
) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    if generation.load(Ordering::SeqCst) != scheduled {
        // A newer keystroke arrived while this lookup was waiting.
        return;
    }

    {
        let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
        state.phase = SearchPhase::Searching;
        state.last_error = None;
    }

    let outcome = providers.search(&query).await;

    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    if generation.load(Ordering::SeqCst) != scheduled {
        tracing::debug!(query = %query, "discarding superseded search response");
        return;
    }

    match outcome {
        Ok(found) if found.is_empty() => {
            state.suggestions.clear();
            state.last_error = Some(NO_RESULTS.to_string());
            state.phase = SearchPhase::Failed;
        }
        Ok(found) => {
            state.suggestions = found;
            state.last_error = None;
            state.phase = SearchPhase::Resolved;
        }
        Err(error) => {
            tracing::warn!(query = %query, error = %error, "place search failed");
            state.suggestions.clear();
            state.last_error = Some(error.to_string());
            state.phase = SearchPhase::Failed;
        }
    }
}
