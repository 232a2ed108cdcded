// Service exports
pub mod favorites;
pub mod location;
pub mod queue;
pub mod settings;
pub mod store;

pub use favorites::FavoritesManager;
pub use location::{
    FixedLocationSource, LocationError, LocationOptions, LocationProvider, LocationSource, LocationState,
    LocationStatus, UnavailableLocationSource, FALLBACK_LOCATION, LOCATION_ERROR_MESSAGE,
};
pub use settings::{RowOutcome, SettingsError, SettingsManager, SettingsRow, SettingsSection};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, StoreKey};
