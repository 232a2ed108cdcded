use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use validator::Validate;
use crate::core::{
    search::{NEARBY_FAILED_MESSAGE, SEARCH_FAILED_MESSAGE},
    PlaceSearch, SearchSession,
};
use crate::models::{
    ErrorResponse, FavoritesResponse, FilterChip, HealthResponse, LocationResponse, NearbyRequest, Place,
    PlaceCategory, PlacesResponse, SearchRequest, SettingUpdate,
};
use crate::services::{
    FavoritesManager, LocationProvider, LocationState, SettingsManager, LOCATION_ERROR_MESSAGE,
};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<PlaceSearch>,
    pub session: Arc<SearchSession>,
    pub favorites: Arc<FavoritesManager>,
    pub settings: Arc<SettingsManager>,
    pub location: Arc<LocationProvider>,
}

/// Configure all place-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/places/search", web::get().to(search_places))
        .route("/places/nearby", web::get().to(nearby_places))
        .route("/places/filters", web::get().to(filter_chips))
        .route("/favorites", web::get().to(get_favorites))
        .route("/favorites", web::delete().to(clear_favorites))
        .route("/favorites/toggle", web::post().to(toggle_favorite))
        .route("/settings", web::get().to(get_settings))
        .route("/settings", web::put().to(update_setting))
        .route("/settings/rows", web::get().to(settings_rows))
        .route("/settings/rows/{id}", web::post().to(activate_row))
        .route("/location", web::get().to(get_location))
        .route("/location/refresh", web::post().to(refresh_location));
}

fn bad_request(message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message,
        status_code: 400,
    })
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Search-as-you-type text search
///
/// GET /api/v1/places/search?query=coffee&filter=cafe
///
/// Goes through the search session: short queries answer with empty
/// results, and a request overtaken by a newer one answers 204.
async fn search_places(
    state: web::Data<AppState>,
    req: web::Query<SearchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request(errors.to_string());
    }

    let request = crate::core::SearchRequest::text(req.query.as_str(), req.filter.as_str());
    match state.session.try_submit(request).await {
        Ok(Some(results)) => HttpResponse::Ok().json(results),
        Ok(None) => HttpResponse::NoContent().finish(),
        Err(e) => HttpResponse::InternalServerError().json(ErrorResponse {
            error: SEARCH_FAILED_MESSAGE.to_string(),
            message: e.to_string(),
            status_code: 500,
        }),
    }
}

/// Nearby search
///
/// GET /api/v1/places/nearby?latitude=37.77&longitude=-122.41&filter=all
///
/// Without coordinates the provider's current location is used, requesting
/// one if none has resolved yet.
async fn nearby_places(
    state: web::Data<AppState>,
    req: web::Query<NearbyRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request(errors.to_string());
    }

    let location = match (req.latitude, req.longitude) {
        (Some(latitude), Some(longitude)) => {
            // NaN slips through the range rules
            if !latitude.is_finite() || !longitude.is_finite() {
                return bad_request("latitude and longitude must be finite numbers".to_string());
            }
            Some(crate::models::Location::new(latitude, longitude))
        }
        (None, None) => match state.location.location() {
            Some(location) => Some(location),
            None => state.location.request_location().await.location,
        },
        _ => return bad_request("latitude and longitude must be given together".to_string()),
    };

    let Some(location) = location else {
        return HttpResponse::ServiceUnavailable().json(ErrorResponse {
            error: "Location unavailable".to_string(),
            message: LOCATION_ERROR_MESSAGE.to_string(),
            status_code: 503,
        });
    };

    match state.search.search_nearby(&location, &req.filter).await {
        Ok(places) => HttpResponse::Ok().json(PlacesResponse {
            total_results: places.len(),
            places,
        }),
        Err(e) => HttpResponse::InternalServerError().json(ErrorResponse {
            error: NEARBY_FAILED_MESSAGE.to_string(),
            message: e.to_string(),
            status_code: 500,
        }),
    }
}

/// Category filter chips in display order
async fn filter_chips() -> impl Responder {
    let chips: Vec<FilterChip> = PlaceCategory::FILTER_CHIPS.into_iter().map(FilterChip::from).collect();
    HttpResponse::Ok().json(chips)
}

fn favorites_response(favorites: Vec<Place>) -> FavoritesResponse {
    FavoritesResponse {
        count: favorites.len(),
        label: FavoritesManager::label_for(favorites.len()),
        favorites,
    }
}

async fn get_favorites(state: web::Data<AppState>) -> impl Responder {
    let favorites = state.favorites.favorites();
    HttpResponse::Ok().json(favorites_response(favorites))
}

/// Toggle a place in or out of favorites
///
/// POST /api/v1/favorites/toggle with the place as the body
async fn toggle_favorite(
    state: web::Data<AppState>,
    place: web::Json<Place>,
) -> impl Responder {
    if place.id.is_empty() {
        return bad_request("place id must not be empty".to_string());
    }

    let favorites = state.favorites.toggle(place.into_inner()).await;
    HttpResponse::Ok().json(favorites_response(favorites))
}

async fn clear_favorites(state: web::Data<AppState>) -> impl Responder {
    let favorites = state.favorites.clear().await;
    HttpResponse::Ok().json(favorites_response(favorites))
}

async fn get_settings(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.settings.settings())
}

/// Change one setting
///
/// PUT /api/v1/settings
///
/// ```json
/// { "key": "notifications", "value": false }
/// ```
async fn update_setting(
    state: web::Data<AppState>,
    update: web::Json<SettingUpdate>,
) -> impl Responder {
    let settings = state.settings.update_setting(update.into_inner()).await;
    HttpResponse::Ok().json(settings)
}

async fn settings_rows(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.settings.rows())
}

#[derive(Debug, Default, Deserialize)]
struct ActivateRowBody {
    value: Option<bool>,
}

/// Activate a settings row; toggle rows accept an explicit `value`
async fn activate_row(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: Option<web::Json<ActivateRowBody>>,
) -> impl Responder {
    let value = body.and_then(|b| b.value);
    let outcome = state.settings.activate(&path, value).await;
    match outcome {
        crate::services::RowOutcome::UnknownRow => HttpResponse::NotFound().json(ErrorResponse {
            error: "Unknown settings row".to_string(),
            message: format!("No settings row with id {}", path.as_str()),
            status_code: 404,
        }),
        outcome => HttpResponse::Ok().json(outcome),
    }
}

fn location_response(state: LocationState) -> LocationResponse {
    LocationResponse {
        status: state.status.as_str().to_string(),
        loading: state.loading(),
        location: state.location,
        error: state.error,
    }
}

async fn get_location(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(location_response(state.location.state()))
}

async fn refresh_location(state: web::Data<AppState>) -> impl Responder {
    state.location.invalidate();
    let location = state.location.request_location().await;
    HttpResponse::Ok().json(location_response(location))
}
