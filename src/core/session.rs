use crate::core::search::{PlaceSearch, SearchError};
use crate::models::{Location, Place};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// A search issued by the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum SearchRequest {
    Text { query: String, filter: String },
    Nearby { location: Location, filter: String },
}

impl SearchRequest {
    pub fn text(query: impl Into<String>, filter: impl Into<String>) -> Self {
        SearchRequest::Text {
            query: query.into(),
            filter: filter.into(),
        }
    }

    pub fn nearby(location: Location, filter: impl Into<String>) -> Self {
        SearchRequest::Nearby {
            location,
            filter: filter.into(),
        }
    }
}

/// Results of the most recent accepted request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub id: u64,
    pub places: Vec<Place>,
    pub suggestions: Vec<String>,
}

/// Search-as-you-type tuning
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub debounce: Duration,
    pub min_query_len: usize,
    pub suggestion_limit: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_query_len: 3,
            suggestion_limit: 5,
        }
    }
}

/// Sequences searches for one screen
///
/// Every request gets an id from a monotonically increasing counter. Only the
/// response to the latest issued id is published; anything that completes
/// after a newer request was submitted is dropped. Text queries are debounced
/// and queries shorter than `min_query_len` publish an empty result without
/// touching the engine.
pub struct SearchSession {
    engine: Arc<PlaceSearch>,
    options: SessionOptions,
    next_query_id: AtomicU64,
    latest_query_id: AtomicU64,
    results: watch::Sender<SearchResults>,
}

impl SearchSession {
    pub fn new(engine: Arc<PlaceSearch>, options: SessionOptions) -> Self {
        let (results, _) = watch::channel(SearchResults::default());
        Self {
            engine,
            options,
            next_query_id: AtomicU64::new(1),
            latest_query_id: AtomicU64::new(0),
            results,
        }
    }

    pub fn latest_query_id(&self) -> u64 {
        self.latest_query_id.load(Ordering::SeqCst)
    }

    /// Last published results
    pub fn results(&self) -> SearchResults {
        self.results.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchResults> {
        self.results.subscribe()
    }

    /// Submit a request and wait for its results
    ///
    /// Returns `None` when the request was superseded or failed; a failure
    /// is reported through the engine status and leaves the published
    /// results untouched.
    pub async fn submit(&self, request: SearchRequest) -> Option<SearchResults> {
        self.try_submit(request).await.unwrap_or(None)
    }

    /// Like [`submit`](Self::submit), but reports engine failures
    ///
    /// `Ok(None)` means the request was superseded by a newer one.
    pub async fn try_submit(&self, request: SearchRequest) -> Result<Option<SearchResults>, SearchError> {
        let id = self.next_query_id.fetch_add(1, Ordering::SeqCst);
        self.latest_query_id.fetch_max(id, Ordering::SeqCst);

        let outcome = match &request {
            SearchRequest::Text { query, filter } => {
                if query.chars().count() < self.options.min_query_len {
                    return Ok(self.publish(SearchResults {
                        id,
                        ..SearchResults::default()
                    }));
                }

                tokio::time::sleep(self.options.debounce).await;
                if !self.is_latest(id) {
                    tracing::trace!("Search {} debounced away", id);
                    return Ok(None);
                }

                self.engine
                    .search_by_text(query, filter)
                    .await
                    .map(|places| {
                        let suggestions = suggestions(&places, self.options.suggestion_limit);
                        (places, suggestions)
                    })
            }
            SearchRequest::Nearby { location, filter } => self
                .engine
                .search_nearby(location, filter)
                .await
                .map(|places| (places, Vec::new())),
        };

        match outcome {
            Ok((places, suggestions)) => Ok(self.publish(SearchResults {
                id,
                places,
                suggestions,
            })),
            Err(e) => {
                tracing::warn!("Search {} failed: {}", id, e);
                Err(e)
            }
        }
    }

    fn is_latest(&self, id: u64) -> bool {
        self.latest_query_id.load(Ordering::SeqCst) == id
    }

    fn publish(&self, results: SearchResults) -> Option<SearchResults> {
        let mut accepted = false;
        self.results.send_if_modified(|current| {
            if !self.is_latest(results.id) {
                return false;
            }
            *current = results.clone();
            accepted = true;
            true
        });

        if accepted {
            Some(results)
        } else {
            tracing::debug!(
                "Dropping stale results for search {} (latest is {})",
                results.id,
                self.latest_query_id()
            );
            None
        }
    }
}

/// Unique place names in result order, capped at `limit`
fn suggestions(places: &[Place], limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    places
        .iter()
        .filter(|place| seen.insert(place.name.as_str()))
        .take(limit)
        .map(|place| place.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SearchSession {
        SearchSession::new(Arc::new(PlaceSearch::with_demo_catalog()), SessionOptions::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_publishes_empty_results() {
        let session = session();
        let results = session.submit(SearchRequest::text("ca", "all")).await.unwrap();

        assert_eq!(results.id, 1);
        assert!(results.places.is_empty());
        assert!(results.suggestions.is_empty());
        assert_eq!(session.results(), results);
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_search_publishes_suggestions() {
        let session = session();
        let results = session.submit(SearchRequest::text("street", "all")).await.unwrap();

        assert_eq!(results.places.len(), 1);
        assert_eq!(results.suggestions, vec!["The Garden Cafe"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_request_is_dropped() {
        let session = Arc::new(session());

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.submit(SearchRequest::text("hotel", "all")).await })
        };
        tokio::task::yield_now().await;

        let second = session
            .submit(SearchRequest::nearby(Location::new(0.0, 0.0), "all"))
            .await
            .unwrap();

        assert!(first.await.unwrap().is_none());
        assert_eq!(second.id, 2);
        assert_eq!(session.results().id, 2);
        assert_eq!(session.results().places.len(), 6);
    }

    struct OfflineSource;

    #[async_trait::async_trait]
    impl crate::core::search::PlaceSource for OfflineSource {
        async fn places(&self) -> Result<Vec<Place>, SearchError> {
            Err(SearchError::SourceUnavailable("offline".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_engine_failure_is_reported_and_keeps_results() {
        let session = SearchSession::new(Arc::new(PlaceSearch::new(Arc::new(OfflineSource))), SessionOptions::default());

        assert!(session.try_submit(SearchRequest::text("street", "all")).await.is_err());
        assert!(session.submit(SearchRequest::text("street", "all")).await.is_none());
        assert_eq!(session.results(), SearchResults::default());
    }

    #[test]
    fn test_suggestions_are_unique_and_capped() {
        let mut places = crate::core::catalog::demo_places();
        places.extend(crate::core::catalog::demo_places());

        let names = suggestions(&places, 5);
        assert_eq!(names.len(), 5);
        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), 5);
    }
}
