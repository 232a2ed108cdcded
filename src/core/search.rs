use crate::core::{distance::distance_meters, filters::filter_places};
use crate::models::{Location, Place};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// Message shown when a text search fails
pub const SEARCH_FAILED_MESSAGE: &str = "Failed to search places";
/// Message shown when a nearby search fails
pub const NEARBY_FAILED_MESSAGE: &str = "Failed to find nearby places";

const DEFAULT_TEXT_LATENCY: Duration = Duration::from_millis(800);
const DEFAULT_NEARBY_LATENCY: Duration = Duration::from_millis(1000);

/// Errors that can occur while searching
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Place source unavailable: {0}")]
    SourceUnavailable(String),
}

/// Provider of the places index searched by [`PlaceSearch`]
#[async_trait]
pub trait PlaceSource: Send + Sync {
    async fn places(&self) -> Result<Vec<Place>, SearchError>;
}

/// Fixed in-memory places index
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    places: Vec<Place>,
}

impl StaticCatalog {
    pub fn new(places: Vec<Place>) -> Self {
        Self { places }
    }

    /// Catalog backed by the six demo places
    pub fn demo() -> Self {
        Self::new(super::catalog::demo_places())
    }
}

#[async_trait]
impl PlaceSource for StaticCatalog {
    async fn places(&self) -> Result<Vec<Place>, SearchError> {
        Ok(self.places.clone())
    }
}

/// Loading and error state observed by the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchStatus {
    pub loading: bool,
    pub error: Option<String>,
}

/// Place search engine
///
/// Runs text and nearby searches against a [`PlaceSource`], simulating the
/// latency of a remote places API.
pub struct PlaceSearch {
    source: Arc<dyn PlaceSource>,
    text_latency: Duration,
    nearby_latency: Duration,
    in_flight: AtomicUsize,
    status: watch::Sender<SearchStatus>,
}

impl PlaceSearch {
    pub fn new(source: Arc<dyn PlaceSource>) -> Self {
        let (status, _) = watch::channel(SearchStatus::default());
        Self {
            source,
            text_latency: DEFAULT_TEXT_LATENCY,
            nearby_latency: DEFAULT_NEARBY_LATENCY,
            in_flight: AtomicUsize::new(0),
            status,
        }
    }

    /// Engine over the built-in demo catalog
    pub fn with_demo_catalog() -> Self {
        Self::new(Arc::new(StaticCatalog::demo()))
    }

    pub fn with_latency(mut self, text: Duration, nearby: Duration) -> Self {
        self.text_latency = text;
        self.nearby_latency = nearby;
        self
    }

    pub fn status(&self) -> SearchStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchStatus> {
        self.status.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Search places by name or address, restricted to a category filter
    ///
    /// Results keep catalog order.
    pub async fn search_by_text(&self, query: &str, filter: &str) -> Result<Vec<Place>, SearchError> {
        let _loading = self.begin();
        tokio::time::sleep(self.text_latency).await;

        match self.source.places().await {
            Ok(places) => {
                let results = filter_places(&places, query, filter);
                tracing::debug!(
                    "Text search query={:?} filter={} returned {} places",
                    query,
                    filter,
                    results.len()
                );
                Ok(results)
            }
            Err(e) => {
                tracing::error!("Text search failed for {:?}: {}", query, e);
                self.fail(SEARCH_FAILED_MESSAGE);
                Err(e)
            }
        }
    }

    /// Places matching a category filter, nearest first
    ///
    /// Places that carry coordinates are measured from `location`; the others
    /// keep their catalog distance. A missing distance sorts as zero and ties
    /// keep catalog order.
    pub async fn search_nearby(&self, location: &Location, filter: &str) -> Result<Vec<Place>, SearchError> {
        let _loading = self.begin();
        tokio::time::sleep(self.nearby_latency).await;

        let places = match self.source.places().await {
            Ok(places) => places,
            Err(e) => {
                tracing::error!("Nearby search failed: {}", e);
                self.fail(NEARBY_FAILED_MESSAGE);
                return Err(e);
            }
        };

        let mut results = filter_places(&places, "", filter);
        for place in &mut results {
            if let Some(coordinates) = place.coordinates {
                place.distance = Some(distance_meters(location, &coordinates));
            }
        }

        // sort_by is stable; NaN distances order after every finite one
        results.sort_by(|a, b| a.sort_distance().total_cmp(&b.sort_distance()));

        tracing::debug!(
            "Nearby search at ({}, {}) filter={} returned {} places",
            location.latitude,
            location.longitude,
            filter,
            results.len()
        );
        Ok(results)
    }

    fn begin(&self) -> LoadingGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.status.send_modify(|status| {
            status.loading = true;
            status.error = None;
        });
        LoadingGuard { search: self }
    }

    fn fail(&self, message: &str) {
        self.status.send_modify(|status| status.error = Some(message.to_string()));
    }
}

/// Clears the loading flag once the last in-flight search finishes
struct LoadingGuard<'a> {
    search: &'a PlaceSearch,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let in_flight = &self.search.in_flight;
        in_flight.fetch_sub(1, Ordering::SeqCst);
        self.search
            .status
            .send_modify(|status| status.loading = in_flight.load(Ordering::SeqCst) > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenSource;

    #[async_trait]
    impl PlaceSource for BrokenSource {
        async fn places(&self) -> Result<Vec<Place>, SearchError> {
            Err(SearchError::SourceUnavailable("index offline".to_string()))
        }
    }

    fn instant(search: PlaceSearch) -> PlaceSearch {
        search.with_latency(Duration::ZERO, Duration::ZERO)
    }

    fn names(places: &[Place]) -> Vec<&str> {
        places.iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_cafe_filter_matches_only_coffee_house() {
        let search = instant(PlaceSearch::with_demo_catalog());
        let results = search.search_by_text("", "cafe").await.unwrap();
        assert_eq!(names(&results), vec!["Artisan Coffee House"]);
    }

    #[tokio::test]
    async fn test_cafe_query_matches_names_not_categories() {
        let search = instant(PlaceSearch::with_demo_catalog());
        let results = search.search_by_text("cafe", "all").await.unwrap();
        assert_eq!(names(&results), vec!["The Garden Cafe"]);
    }

    #[tokio::test]
    async fn test_empty_query_returns_catalog_in_order() {
        let search = instant(PlaceSearch::with_demo_catalog());
        let results = search.search_by_text("", "all").await.unwrap();
        let ids: Vec<&str> = results.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[tokio::test]
    async fn test_nearby_sorted_by_distance() {
        let search = instant(PlaceSearch::with_demo_catalog());
        let results = search
            .search_nearby(&Location::new(0.0, 0.0), "all")
            .await
            .unwrap();

        let distances: Vec<f64> = results.iter().map(|p| p.sort_distance()).collect();
        assert_eq!(distances, vec![250.0, 450.0, 600.0, 800.0, 1200.0, 2100.0]);
    }

    #[tokio::test]
    async fn test_nearby_uses_coordinates_when_present() {
        let here = Location::new(37.7749, -122.4194);
        let mut far = crate::core::catalog::demo_places().remove(0);
        far.id = "far".to_string();
        far.distance = Some(10.0);
        far.coordinates = Some(Location::new(37.7849, -122.4194));
        let mut near = crate::core::catalog::demo_places().remove(1);
        near.distance = Some(500.0);

        let search = instant(PlaceSearch::new(Arc::new(StaticCatalog::new(vec![far, near]))));
        let results = search.search_nearby(&here, "all").await.unwrap();

        assert_eq!(results[0].id, "2");
        assert_eq!(results[1].id, "far");
        assert!(results[1].distance.unwrap() > 1000.0);
    }

    #[tokio::test]
    async fn test_nan_distance_sorts_last() {
        let mut broken = crate::core::catalog::demo_places().remove(0);
        broken.distance = Some(f64::NAN);
        let mut near = crate::core::catalog::demo_places().remove(1);
        near.distance = Some(900.0);
        let mut nearer = crate::core::catalog::demo_places().remove(2);
        nearer.distance = Some(100.0);

        let search = instant(PlaceSearch::new(Arc::new(StaticCatalog::new(vec![broken, near, nearer]))));
        let results = search.search_nearby(&Location::new(0.0, 0.0), "all").await.unwrap();

        let ids: Vec<&str> = results.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[tokio::test]
    async fn test_failure_sets_generic_error() {
        let search = instant(PlaceSearch::new(Arc::new(BrokenSource)));

        assert!(search.search_by_text("x", "all").await.is_err());
        assert_eq!(search.status().error.as_deref(), Some(SEARCH_FAILED_MESSAGE));
        assert!(!search.status().loading);

        assert!(search.search_nearby(&Location::new(0.0, 0.0), "all").await.is_err());
        assert_eq!(search.status().error.as_deref(), Some(NEARBY_FAILED_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_flag_spans_the_call() {
        let search = Arc::new(PlaceSearch::with_demo_catalog());
        let task = {
            let search = search.clone();
            tokio::spawn(async move { search.search_by_text("", "all").await })
        };

        tokio::task::yield_now().await;
        assert!(search.is_loading());
        assert!(search.status().loading);

        task.await.unwrap().unwrap();
        assert!(!search.is_loading());
        assert!(!search.status().loading);
    }
}
