//! Debounced destination search.
//!
//! Buffers keystrokes through a [`Debouncer`] and only queries the place
//! search provider once typing pauses. Queries under the minimum length are
//! never sent and clear any pending state.

use std::time::{Duration, Instant};

use tracing::warn;

use crate::debounce::Debouncer;
use crate::error::ProviderError;
use crate::traits::{PlaceSearch, SearchResult};

/// Quiet period after the last keystroke before a query is sent.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Queries shorter than this are not sent.
pub const MIN_QUERY_LEN: usize = 3;

pub struct SearchController<P> {
    provider: P,
    debouncer: Debouncer<String>,
    results: Vec<SearchResult>,
}

impl<P: PlaceSearch> SearchController<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            debouncer: Debouncer::new(SEARCH_DEBOUNCE),
            results: Vec::new(),
        }
    }

    /// Records a keystroke. Short queries cancel any pending search and
    /// clear stale results.
    pub fn input(&mut self, query: &str, now: Instant) {
        if query.chars().count() < MIN_QUERY_LEN {
            self.debouncer.cancel();
            self.results.clear();
            return;
        }
        self.debouncer.submit(query.to_string(), now);
    }

    /// Sends the pending query if its quiet period has passed.
    ///
    /// Returns `Ok(true)` when fresh results arrived. A provider failure
    /// clears the result list and surfaces the error for a transient notice;
    /// the next keystroke is the only retry.
    pub fn poll(&mut self, now: Instant) -> Result<bool, ProviderError> {
        let Some(query) = self.debouncer.due(now) else {
            return Ok(false);
        };

        match self.provider.search(&query) {
            Ok(results) => {
                self.results = results;
                Ok(true)
            }
            Err(err) => {
                warn!(%err, %query, "place search failed");
                self.results.clear();
                Err(err)
            }
        }
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }
}
