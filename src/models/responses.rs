use serde::{Deserialize, Serialize};
use crate::models::domain::{Location, Place, PlaceCategory};

/// Response for search and nearby endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesResponse {
    pub places: Vec<Place>,
    pub total_results: usize,
}

/// Response for the favorites endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<Place>,
    pub count: usize,
    pub label: String,
}

/// One category filter chip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterChip {
    pub key: String,
    pub label: String,
}

impl From<PlaceCategory> for FilterChip {
    fn from(category: PlaceCategory) -> Self {
        Self {
            key: category.key().to_string(),
            label: category.label().to_string(),
        }
    }
}

/// Current state of the location provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationResponse {
    pub status: String,
    pub loading: bool,
    pub location: Option<Location>,
    pub error: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
