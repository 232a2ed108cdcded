use crate::models::Location;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// Message shown whenever a location request fails
pub const LOCATION_ERROR_MESSAGE: &str = "Unable to get location. Please enable location services.";

/// Coordinate used when no platform geolocation is wired in (San Francisco)
pub const FALLBACK_LOCATION: Location = Location {
    latitude: 37.7749,
    longitude: -122.4194,
};

/// Errors that can occur while resolving a position
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("Geolocation is not supported on this device")]
    Unavailable,

    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Timed out after {0:?} waiting for a position")]
    Timeout(Duration),
}

/// Options handed to the geolocation source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationOptions {
    pub high_accuracy: bool,
    /// Upper bound on a single resolution; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// Age below which a previously resolved position is reused
    pub maximum_age: Duration,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Some(Duration::from_secs(10)),
            maximum_age: Duration::from_secs(300),
        }
    }
}

/// Platform geolocation capability
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn current_position(&self, options: &LocationOptions) -> Result<Location, LocationError>;
}

/// Always resolves to the same coordinate after a short delay
#[derive(Debug, Clone)]
pub struct FixedLocationSource {
    location: Location,
    delay: Duration,
}

impl FixedLocationSource {
    pub fn new(location: Location, delay: Duration) -> Self {
        Self { location, delay }
    }
}

impl Default for FixedLocationSource {
    fn default() -> Self {
        Self::new(FALLBACK_LOCATION, Duration::from_secs(1))
    }
}

#[async_trait]
impl LocationSource for FixedLocationSource {
    async fn current_position(&self, _options: &LocationOptions) -> Result<Location, LocationError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.location)
    }
}

/// A device without geolocation
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableLocationSource;

#[async_trait]
impl LocationSource for UnavailableLocationSource {
    async fn current_position(&self, _options: &LocationOptions) -> Result<Location, LocationError> {
        Err(LocationError::Unavailable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationStatus {
    Idle,
    Requesting,
    Resolved,
    Failed,
}

impl LocationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationStatus::Idle => "idle",
            LocationStatus::Requesting => "requesting",
            LocationStatus::Resolved => "resolved",
            LocationStatus::Failed => "failed",
        }
    }
}

/// Snapshot of the provider
///
/// `location` is the last coordinate that resolved; it survives later
/// failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationState {
    pub status: LocationStatus,
    pub location: Option<Location>,
    pub error: Option<String>,
}

impl LocationState {
    pub fn loading(&self) -> bool {
        self.status == LocationStatus::Requesting
    }
}

impl Default for LocationState {
    fn default() -> Self {
        Self {
            status: LocationStatus::Idle,
            location: None,
            error: None,
        }
    }
}

/// Best-effort single-coordinate location provider
///
/// Overlapping requests are resolved latest-wins: every request takes a
/// generation number and a completion from an older generation is dropped.
pub struct LocationProvider {
    source: Arc<dyn LocationSource>,
    options: LocationOptions,
    recent: Option<moka::future::Cache<(), Location>>,
    generation: AtomicU64,
    state: watch::Sender<LocationState>,
}

impl LocationProvider {
    /// Provider in the `Idle` state
    pub fn new(source: Arc<dyn LocationSource>, options: LocationOptions) -> Self {
        let recent = (!options.maximum_age.is_zero()).then(|| {
            moka::future::CacheBuilder::new(1)
                .time_to_live(options.maximum_age)
                .build()
        });
        let (state, _) = watch::channel(LocationState::default());

        Self {
            source,
            options,
            recent,
            generation: AtomicU64::new(0),
            state,
        }
    }

    /// Provider that has already made its first request
    pub async fn spawn(source: Arc<dyn LocationSource>, options: LocationOptions) -> Self {
        let provider = Self::new(source, options);
        provider.request_location().await;
        provider
    }

    pub fn state(&self) -> LocationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LocationState> {
        self.state.subscribe()
    }

    pub fn location(&self) -> Option<Location> {
        self.state.borrow().location
    }

    /// Forget the cached position so the next request asks the source
    pub fn invalidate(&self) {
        if let Some(recent) = &self.recent {
            recent.invalidate_all();
        }
    }

    /// Resolve one coordinate and publish the outcome
    pub async fn request_location(&self) -> LocationState {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|state| {
            state.status = LocationStatus::Requesting;
            state.error = None;
        });

        let result = self.resolve().await;

        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!("Dropping location result from superseded request {}", generation);
                return false;
            }
            match result {
                Ok(location) => {
                    tracing::info!("Location resolved: {}, {}", location.latitude, location.longitude);
                    state.status = LocationStatus::Resolved;
                    state.location = Some(location);
                }
                Err(ref e) => {
                    tracing::warn!("Location request failed: {}", e);
                    state.status = LocationStatus::Failed;
                    state.error = Some(LOCATION_ERROR_MESSAGE.to_string());
                }
            }
            true
        });

        self.state()
    }

    async fn resolve(&self) -> Result<Location, LocationError> {
        if let Some(recent) = &self.recent {
            if let Some(location) = recent.get(&()).await {
                tracing::trace!("Using cached location");
                return Ok(location);
            }
        }

        let lookup = self.source.current_position(&self.options);
        let location = match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, lookup)
                .await
                .unwrap_or(Err(LocationError::Timeout(limit)))?,
            None => lookup.await?,
        };

        if let Some(recent) = &self.recent {
            recent.insert((), location).await;
        }
        Ok(location)
    }
}
