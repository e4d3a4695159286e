//! HTTP surface for powerstats.
//!
//! Exposes every power stats operation as a GET endpoint: the registry dump,
//! rail metadata, energy readings, state residency (JSON), and the combined
//! text report (plain or delta).

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

use powerstats_core::{
    DumpMode, EnergyData, PowerEntityInfo, PowerStats, RailInfo, ResidencyQuery, Status,
};

/// Shared server state.
struct AppState {
    stats: Arc<PowerStats>,
}

#[derive(Deserialize)]
struct ResidencyParams {
    /// Comma-separated entity ids; absent or empty means all.
    entities: Option<String>,
}

#[derive(Deserialize)]
struct EnergyParams {
    /// Comma-separated rail indices; absent or empty means all.
    rails: Option<String>,
}

#[derive(Deserialize)]
struct DumpParams {
    /// `plain` (default) or `delta`.
    mode: Option<String>,
}

#[derive(Serialize)]
struct RailsResponse {
    rails: Vec<RailInfo>,
    total: usize,
}

#[derive(Serialize)]
struct EnergyResponse {
    energy: Vec<EnergyData>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: msg.into() })).into_response()
}

/// Parse a comma-separated id list. `None`, empty and whitespace-only input
/// all mean "no ids" (which the service treats as "all").
pub fn parse_id_list(raw: Option<&str>) -> Result<Vec<i32>, String> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i32>().map_err(|_| format!("invalid id '{s}'")))
        .collect()
}

/// HTTP status for a residency query outcome. The body always carries the
/// partial results.
pub fn http_status(status: Status) -> StatusCode {
    match status {
        Status::Ok => StatusCode::OK,
        Status::BadValue => StatusCode::BAD_REQUEST,
        Status::FailedTransaction => StatusCode::BAD_GATEWAY,
    }
}

/// Run a blocking provider call off the async executor.
async fn blocking<T, F>(state: &AppState, f: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(&PowerStats) -> T + Send + 'static,
{
    let stats = Arc::clone(&state.stats);
    tokio::task::spawn_blocking(move || f(&stats))
        .await
        .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, format!("worker failed: {e}")))
}

async fn handle_entities(State(state): State<Arc<AppState>>) -> Json<Vec<PowerEntityInfo>> {
    Json(state.stats.list_entities())
}

async fn handle_rails(State(state): State<Arc<AppState>>) -> Response {
    match blocking(&state, |s| s.list_rails()).await {
        Ok(Ok(rails)) => {
            let total = rails.len();
            Json(RailsResponse { rails, total }).into_response()
        }
        Ok(Err(e)) => error(StatusCode::BAD_GATEWAY, e.to_string()),
        Err(resp) => resp,
    }
}

async fn handle_energy(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EnergyParams>,
) -> Response {
    let rails = match parse_id_list(params.rails.as_deref()) {
        Ok(ids) => ids,
        Err(msg) => return error(StatusCode::BAD_REQUEST, msg),
    };
    match blocking(&state, move |s| s.energy(&rails)).await {
        Ok(Ok(energy)) => Json(EnergyResponse { energy }).into_response(),
        Ok(Err(e)) => error(StatusCode::BAD_GATEWAY, e.to_string()),
        Err(resp) => resp,
    }
}

async fn handle_residency(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResidencyParams>,
) -> Response {
    let ids = match parse_id_list(params.entities.as_deref()) {
        Ok(ids) => ids,
        Err(msg) => return error(StatusCode::BAD_REQUEST, msg),
    };
    match blocking(&state, move |s| s.state_residency(&ids)).await {
        Ok(query) => {
            let status = http_status(query.status);
            (status, Json::<ResidencyQuery>(query)).into_response()
        }
        Err(resp) => resp,
    }
}

async fn handle_dump(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DumpParams>,
) -> Response {
    let mode = match params.mode.as_deref().map(str::parse::<DumpMode>) {
        None => DumpMode::Plain,
        Some(Ok(mode)) => mode,
        Some(Err(msg)) => return error(StatusCode::BAD_REQUEST, msg),
    };
    match blocking(&state, move |s| s.dump(mode)).await {
        Ok(text) => text.into_response(),
        Err(resp) => resp,
    }
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let entities = state.stats.registry().len();

    Json(serde_json::json!({
        "name": "powerstats server",
        "version": powerstats_core::VERSION,
        "entities": entities,
        "endpoints": {
            "/": "This API index",
            "/entities": "All registered power entities with their states",
            "/rails": "Rail metadata (empty when no rail provider is configured)",
            "/energy": {
                "method": "GET",
                "params": { "rails": "Comma-separated rail indices (default: all)" }
            },
            "/residency": {
                "method": "GET",
                "params": { "entities": "Comma-separated entity ids (default: all)" },
                "status": "200 ok, 400 bad_value, 502 failed_transaction; partial results always included"
            },
            "/dump": {
                "method": "GET",
                "params": { "mode": "plain (default) or delta" }
            },
        },
    }))
}

/// Build the axum router.
pub fn build_router(stats: Arc<PowerStats>) -> Router {
    let state = Arc::new(AppState { stats });

    Router::new()
        .route("/", get(handle_index))
        .route("/entities", get(handle_entities))
        .route("/rails", get(handle_rails))
        .route("/energy", get(handle_energy))
        .route("/residency", get(handle_residency))
        .route("/dump", get(handle_dump))
        .with_state(state)
}

/// Run the HTTP server until the listener fails.
pub async fn run_server(stats: PowerStats, host: &str, port: u16) -> std::io::Result<()> {
    let app = build_router(Arc::new(stats));
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("powerstats server listening on {addr}");
    axum::serve(listener, app).await
}
