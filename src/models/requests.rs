use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query string for text search
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub query: String,
    #[serde(default = "default_filter")]
    #[validate(length(min = 1, max = 64))]
    pub filter: String,
}

/// Query string for nearby search
///
/// Coordinates fall back to the location provider when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearbyRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[serde(default = "default_filter")]
    #[validate(length(min = 1, max = 64))]
    pub filter: String,
}

fn default_filter() -> String {
    "all".to_string()
}
