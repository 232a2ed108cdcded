use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A place from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub name: String,
    pub address: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_open: Option<bool>,
    /// Distance from the user in meters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// 1-4 scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Location>,
}

impl Place {
    /// Distance used for ordering; a missing distance sorts as zero
    #[inline]
    pub fn sort_distance(&self) -> f64 {
        self.distance.unwrap_or(0.0)
    }
}

/// A resolved coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Category filter keys offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceCategory {
    All,
    Restaurant,
    Lodging,
    ShoppingMall,
    Cafe,
    GasStation,
    Hospital,
    TouristAttraction,
    Bank,
    Pharmacy,
}

impl PlaceCategory {
    /// Filter chips in the order the search screens show them
    pub const FILTER_CHIPS: [PlaceCategory; 7] = [
        PlaceCategory::All,
        PlaceCategory::Restaurant,
        PlaceCategory::Lodging,
        PlaceCategory::ShoppingMall,
        PlaceCategory::Cafe,
        PlaceCategory::GasStation,
        PlaceCategory::Hospital,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PlaceCategory::All => "all",
            PlaceCategory::Restaurant => "restaurant",
            PlaceCategory::Lodging => "lodging",
            PlaceCategory::ShoppingMall => "shopping_mall",
            PlaceCategory::Cafe => "cafe",
            PlaceCategory::GasStation => "gas_station",
            PlaceCategory::Hospital => "hospital",
            PlaceCategory::TouristAttraction => "tourist_attraction",
            PlaceCategory::Bank => "bank",
            PlaceCategory::Pharmacy => "pharmacy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlaceCategory::All => "All",
            PlaceCategory::Restaurant => "Food",
            PlaceCategory::Lodging => "Hotels",
            PlaceCategory::ShoppingMall => "Shopping",
            PlaceCategory::Cafe => "Cafes",
            PlaceCategory::GasStation => "Gas",
            PlaceCategory::Hospital => "Health",
            PlaceCategory::TouristAttraction => "Attractions",
            PlaceCategory::Bank => "Banks",
            PlaceCategory::Pharmacy => "Pharmacies",
        }
    }

    /// Keyword searched for in a place's category text, if the key is aliased
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            PlaceCategory::Restaurant => Some("restaurant"),
            PlaceCategory::Lodging => Some("hotel"),
            PlaceCategory::ShoppingMall => Some("shopping"),
            PlaceCategory::Cafe => Some("cafe"),
            PlaceCategory::GasStation => Some("gas"),
            PlaceCategory::Hospital => Some("hospital"),
            _ => None,
        }
    }
}

impl fmt::Display for PlaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PlaceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(PlaceCategory::All),
            "restaurant" => Ok(PlaceCategory::Restaurant),
            "lodging" => Ok(PlaceCategory::Lodging),
            "shopping_mall" => Ok(PlaceCategory::ShoppingMall),
            "cafe" => Ok(PlaceCategory::Cafe),
            "gas_station" => Ok(PlaceCategory::GasStation),
            "hospital" => Ok(PlaceCategory::Hospital),
            "tourist_attraction" => Ok(PlaceCategory::TouristAttraction),
            "bank" => Ok(PlaceCategory::Bank),
            "pharmacy" => Ok(PlaceCategory::Pharmacy),
            other => Err(format!("unknown category filter: {}", other)),
        }
    }
}

/// User preferences persisted under the settings key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub notifications: bool,
    pub location_enabled: bool,
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications: true,
            location_enabled: true,
            language: "en".to_string(),
        }
    }
}

/// A single-field settings change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum SettingUpdate {
    Notifications(bool),
    LocationEnabled(bool),
    Language(String),
}

impl SettingUpdate {
    pub fn key(&self) -> &'static str {
        match self {
            SettingUpdate::Notifications(_) => "notifications",
            SettingUpdate::LocationEnabled(_) => "locationEnabled",
            SettingUpdate::Language(_) => "language",
        }
    }
}

/// Language codes look like `en`, `pt-BR` or `zh-Hant`
pub fn is_valid_language_code(code: &str) -> bool {
    let len = code.len();
    (2..=8).contains(&len)
        && code.starts_with(|c: char| c.is_ascii_alphabetic())
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
