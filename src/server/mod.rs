//! HTTP adapter.
//!
//! The handlers in `handler` and the dumps in `debug` are blocking, so each
//! request hands its work to tokio's blocking pool. Requests share only the
//! immutable startup configuration.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::{error, info, warn};

use crate::config::{MirrorConfig, Settings};
use crate::error::AppError;

pub mod handler;

use handler::{HttpReply, RequestFlags};

/// Shared, read-only state built once at startup.
pub struct AppState {
    pub settings: Settings,
    pub config: Result<MirrorConfig, AppError>,
    pub origin: String,
}

impl AppState {
    pub fn from_settings(settings: Settings) -> Self {
        let config = settings.validate();
        if let Err(err) = &config {
            warn!(error = %err, "Configuration invalid; catalog requests will fail");
        }
        Self {
            origin: settings.origin(),
            settings,
            config,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/courses", get(courses).options(preflight))
        .route("/api/section", get(section).options(preflight))
        .route("/api/courses_raw", get(courses_raw).options(preflight))
        .route("/api/diag", get(diag).options(preflight))
        .route("/api/schema", get(schema).options(preflight))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(settings: Settings, addr: &str) -> Result<(), AppError> {
    let state = Arc::new(AppState::from_settings(settings));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::io(format!("Failed to bind {addr}: {e}")))?;

    info!(addr, origin = %state.origin, "Serving catalog");
    axum::serve(listener, router(state))
        .await
        .map_err(|e| AppError::io(format!("Server error: {e}")))
}

async fn preflight(State(state): State<Arc<AppState>>) -> HttpReply {
    handler::preflight(&state.origin)
}

async fn courses(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HashMap<String, String>>,
) -> HttpReply {
    let flags = RequestFlags::from_query(&query);
    let origin = state.origin.clone();
    blocking(&origin, move || {
        handler::courses(state.config.as_ref(), &state.origin, flags)
    })
    .await
}

async fn section(State(state): State<Arc<AppState>>) -> HttpReply {
    let origin = state.origin.clone();
    blocking(&origin, move || handler::section(&state.settings)).await
}

async fn courses_raw(State(state): State<Arc<AppState>>) -> HttpReply {
    let origin = state.origin.clone();
    blocking(&origin, move || {
        let (status, body) = crate::debug::raw_items_dump(&state.settings);
        HttpReply::json(status, &body)
    })
    .await
}

async fn diag(State(state): State<Arc<AppState>>) -> HttpReply {
    let origin = state.origin.clone();
    blocking(&origin, move || {
        HttpReply::json(200, &crate::debug::site_probe_report(&state.settings))
    })
    .await
}

async fn schema(State(state): State<Arc<AppState>>) -> HttpReply {
    let origin = state.origin.clone();
    blocking(&origin, move || {
        let (status, body) = crate::debug::schema_dump(&state.settings);
        HttpReply::json(status, &body)
    })
    .await
}

/// Run blocking work on the blocking pool; a panicked task becomes a bare 500.
///
/// Every reply leaves with the CORS origin header.
async fn blocking<F>(origin: &str, work: F) -> HttpReply
where
    F: FnOnce() -> HttpReply + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(reply) => reply.with_origin(origin),
        Err(err) => {
            error!(error = %err, "Request task failed");
            HttpReply::cors(500, origin)
        }
    }
}

impl IntoResponse for HttpReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        // An empty body must not pick up axum's default text/plain content type.
        let mut response = if self.body.is_empty() {
            status.into_response()
        } else {
            (status, self.body).into_response()
        };
        let headers = response.headers_mut();
        for (name, value) in self.headers {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => warn!(header = name, "Dropping invalid response header"),
            }
        }
        response
    }
}
