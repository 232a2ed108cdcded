//! Places core - search, favorites and settings for a places discovery app
//!
//! This library provides the state and logic behind a place discovery client:
//! text and nearby search over a place catalog, a persisted favorites
//! collection, persisted user settings and a best-effort location provider.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{filter_places, format_distance, haversine_distance, PlaceSearch, SearchSession};
pub use models::{Location, Place, PlaceCategory, SettingUpdate, Settings};
pub use services::{FavoritesManager, LocationProvider, SettingsManager};
