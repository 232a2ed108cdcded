// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{is_valid_language_code, Location, Place, PlaceCategory, SettingUpdate, Settings};
pub use requests::{NearbyRequest, SearchRequest};
pub use responses::{ErrorResponse, FavoritesResponse, FilterChip, HealthResponse, LocationResponse, PlacesResponse};
