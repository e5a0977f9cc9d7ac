//! HTTP query service over the sample store.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/scrape` | Start a background scrape of the configured listings |
//! | `GET`  | `/samples` | List samples, `?subject=&limit=` (default limit 10) |
//! | `GET`  | `/samples/count` | Count samples, `?subject=` |
//! | `GET`  | `/samples/{id}` | One sample by id |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "no sample with id: ..." } }
//! ```
//!
//! Error codes: `not_found` (404), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::batch::{Harvester, ListingSource};
use crate::error::Error;
use crate::record::{SampleFilter, StoredSample};
use crate::store::SampleStore;

/// Default page size for `GET /samples`.
pub const DEFAULT_LIST_LIMIT: usize = 10;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn SampleStore>,
    harvester: Harvester,
    listings: Arc<Vec<ListingSource>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SampleStore>,
        harvester: Harvester,
        listings: Vec<ListingSource>,
    ) -> Self {
        Self {
            store,
            harvester,
            listings: Arc::new(listings),
        }
    }
}

/// Build the router with CORS applied.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/scrape", post(handle_scrape))
        .route("/samples", get(handle_list))
        .route("/samples/count", get(handle_count))
        .route("/samples/{id}", get(handle_get))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve until the process is terminated.
///
/// # Errors
///
/// Returns [`Error::Io`] if the address cannot be bound or the server fails.
pub async fn run_server(addr: SocketAddr, state: AppState) -> crate::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "query service listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        error!(error = %err, "request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal",
            message: err.to_string(),
        }
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============ POST /scrape ============

#[derive(Serialize)]
struct ScrapeAccepted {
    status: &'static str,
    message: String,
}

async fn handle_scrape(State(state): State<AppState>) -> (StatusCode, Json<ScrapeAccepted>) {
    let listings = state.listings.len();
    let AppState {
        store,
        harvester,
        listings: sources,
    } = state;

    tokio::spawn(async move {
        match harvester.harvest_into(&sources, store.as_ref()).await {
            Ok(summary) => info!(
                stored = summary.stored,
                failures = summary.report.failures.len(),
                "background scrape finished"
            ),
            Err(err) => error!(error = %err, "background scrape failed"),
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(ScrapeAccepted {
            status: "accepted",
            message: format!("scraping started for {listings} listing(s)"),
        }),
    )
}

// ============ GET /samples ============

#[derive(Debug, Deserialize)]
struct ListParams {
    subject: Option<String>,
    limit: Option<usize>,
}

async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<StoredSample>>, AppError> {
    let filter = SampleFilter {
        subject: params.subject,
    };
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    Ok(Json(state.store.list(&filter, limit).await?))
}

// ============ GET /samples/count ============

#[derive(Debug, Deserialize)]
struct CountParams {
    subject: Option<String>,
}

#[derive(Serialize)]
struct CountResponse {
    total_samples: u64,
    subject: Option<String>,
}

async fn handle_count(
    State(state): State<AppState>,
    Query(params): Query<CountParams>,
) -> Result<Json<CountResponse>, AppError> {
    let filter = SampleFilter {
        subject: params.subject,
    };
    let total_samples = state.store.count(&filter).await?;
    Ok(Json(CountResponse {
        total_samples,
        subject: filter.subject,
    }))
}

// ============ GET /samples/{id} ============

async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredSample>, AppError> {
    state
        .store
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("no sample with id: {id}")))
}
