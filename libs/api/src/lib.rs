use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use repository::{DatabaseSettings, Repository};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use crate::clients::image_host::{ImageHost, Media};
use crate::response::ErrorBody;

pub mod booking;
pub mod clients;
pub mod diagnostics;
pub mod event;
pub mod response;

pub enum ApiError {
    ClientError(ErrorBody),
    NotFound(ErrorBody),
    Conflict(ErrorBody),
    ServerError(ErrorBody),
}

#[derive(Clone, Debug)]
pub struct ApiState {
    repo: Repository,
    images: Arc<dyn ImageHost>,
}

/// Contents of `Config.toml`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: Server,
    pub database: DatabaseSettings,
    pub media: Media,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Server {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Server {
    /// Parsed `allowed_origins`. A wildcard cannot be mixed into an origin
    /// list, so `"*"` is refused.
    pub fn cors_origins(&self) -> anyhow::Result<Vec<HeaderValue>> {
        self.allowed_origins
            .iter()
            .map(|origin| {
                if origin.trim() == "*" {
                    anyhow::bail!(
                        "wildcard CORS origin is not supported, list origins explicitly"
                    );
                }
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("invalid CORS origin: {origin}"))
            })
            .collect()
    }
}

impl Default for Server {
    fn default() -> Self {
        Self {
            port: 8000,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        event::get_events,
        event::get_event,
        event::create_event,
        event::get_similar_events,
        event::get_debug_events,
        booking::create_booking,
        diagnostics::get_db_state,
    ),
    components(schemas(
        event::response::EventResp,
        event::response::GetEventsResp,
        event::response::GetEventResp,
        event::response::CreateEventResp,
        event::response::SimilarEventsResp,
        event::response::EventSummaryResp,
        event::response::DebugEventsResp,
        booking::request::CreateBookingRequest,
        booking::response::BookingResp,
        booking::response::CreateBookingResp,
        diagnostics::DbStateResp,
        diagnostics::DbState,
    )),
    tags(
        (name = "events", description = "Event management API"),
        (name = "bookings", description = "Event bookings"),
        (name = "diagnostics", description = "Operational checks")
    )
)]
pub struct ApiDoc;

pub fn serve(
    repository: Repository,
    images: Arc<dyn ImageHost>,
    config: &Config,
) -> anyhow::Result<Router> {
    info!(task = "start api serving");

    let state = ApiState {
        repo: repository,
        images,
    };

    let origins = config.server.cors_origins()?;

    // events
    let event_router = Router::new()
        .route("/", get(event::get_events).post(event::create_event))
        .route("/debug/all", get(event::get_debug_events))
        .route("/:slug", get(event::get_event))
        .route("/:slug/similar", get(event::get_similar_events))
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .fallback(get_404)
        .with_state(state.clone());

    // bookings
    let booking_router = Router::new()
        .route("/", post(booking::create_booking))
        .fallback(get_404)
        .with_state(state.clone());

    // diagnostics
    let diagnostics_router = Router::new()
        .route("/db", get(diagnostics::get_db_state))
        .fallback(get_404)
        .with_state(state);

    let router = Router::new()
        .merge(Redoc::with_url("/redoc", ApiDoc::openapi()))
        .route("/api-docs/openapi.json", get(get_openapi))
        .route("/healthz", get(get_health))
        .nest("/events", event_router)
        .nest("/bookings", booking_router)
        .nest("/diagnostics", diagnostics_router)
        .layer(CorsLayer::new().allow_origin(origins))
        .fallback(get_404);

    Ok(router)
}

async fn get_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn get_health() -> StatusCode {
    StatusCode::OK
}

async fn get_404() -> StatusCode {
    StatusCode::NOT_FOUND
}
