use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use places_core::config::{AppConfig, LocationSourceKind, LoggingSettings, StorageBackend};
use places_core::core::{PlaceSearch, SearchSession};
use places_core::models::Location;
use places_core::routes::{self, AppState};
use places_core::services::{
    FavoritesManager, FileStore, FixedLocationSource, KeyValueStore, LocationProvider, LocationSource,
    MemoryStore, SettingsManager, UnavailableLocationSource,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Query error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "json" => subscriber.json().init(),
        _ => subscriber.init(),
    }
}

fn build_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    match config.storage.backend {
        StorageBackend::File => {
            info!("Using file store at {}", config.storage.path);
            Arc::new(FileStore::new(&config.storage.path))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory store, favorites and settings will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    }
}

fn build_location_source(config: &AppConfig) -> Arc<dyn LocationSource> {
    let settings = &config.location;
    match settings.source {
        LocationSourceKind::Fixed => Arc::new(FixedLocationSource::new(
            Location::new(settings.fallback_latitude, settings.fallback_longitude),
            Duration::from_millis(settings.fixed_delay_ms),
        )),
        LocationSourceKind::Unavailable => Arc::new(UnavailableLocationSource),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    init_tracing(&config.logging);
    info!("Starting places service...");

    let store = build_store(&config);

    let favorites = Arc::new(FavoritesManager::spawn(store.clone()).await);
    info!("Favorites loaded ({})", favorites.saved_places_label());

    let settings = Arc::new(SettingsManager::spawn(store).await);
    info!("Settings loaded: {:?}", settings.settings());

    let location = Arc::new(
        LocationProvider::spawn(build_location_source(&config), config.location.options()).await,
    );
    if let Some(err) = location.state().error {
        warn!("Initial location request failed: {}", err);
    }

    let search = Arc::new(
        PlaceSearch::with_demo_catalog().with_latency(config.search.text_latency(), config.search.nearby_latency()),
    );

    let session = Arc::new(SearchSession::new(search.clone(), config.search.session_options()));

    // Build application state
    let app_state = AppState {
        search,
        session,
        favorites: favorites.clone(),
        settings: settings.clone(),
        location,
    };

    // Configure HTTP server
    let host = config.server.host.clone();
    let port = config.server.port;
    let workers = config.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run();

    let result = server.await;

    // Let queued writes reach the store before exiting
    match Arc::try_unwrap(favorites) {
        Ok(favorites) => favorites.dispose().await,
        Err(_) => error!("Favorites still shared at shutdown, queued writes may be lost"),
    }
    match Arc::try_unwrap(settings) {
        Ok(settings) => settings.dispose().await,
        Err(_) => error!("Settings still shared at shutdown, queued writes may be lost"),
    }

    info!("Server stopped");
    result
}
