// Core search exports
pub mod catalog;
pub mod distance;
pub mod filters;
pub mod search;
pub mod session;

pub use distance::{distance_meters, format_distance, haversine_distance};
pub use filters::{filter_places, matches_category, matches_query, ALL_FILTER};
pub use search::{PlaceSearch, PlaceSource, SearchError, SearchStatus, StaticCatalog};
pub use session::{SearchRequest, SearchResults, SearchSession, SessionOptions};
