//! HTTP API server for the Vigil service.
//!
//! Provides REST endpoints for service status, registered circuits and their
//! signal layouts, and proof verification.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use vigil_core::CircuitKind;

use crate::state::{ApiError, AppState, ErrorResponse, VerifyBody, VerifyResponse};

// --- Response types ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
    pub settings_version: u64,
    pub circuits: Vec<String>,
    pub ledger_states: usize,
    pub gist_roots: usize,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CircuitInfo {
    pub id: String,
    pub kind: CircuitKind,
    pub signal_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CircuitsResponse {
    pub circuits: Vec<CircuitInfo>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InputInfo {
    pub name: String,
    pub index: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InputsResponse {
    pub circuit: String,
    pub inputs: Vec<InputInfo>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

// --- Handlers ---

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

async fn handle_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let settings = state.engine.settings();
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        settings_version: settings.version,
        circuits: settings.circuits().into_iter().map(String::from).collect(),
        ledger_states: state.ledger.state_count(),
        gist_roots: state.ledger.gist_root_count(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

async fn handle_circuits(State(state): State<Arc<AppState>>) -> Json<CircuitsResponse> {
    let settings = state.engine.settings();
    let circuits: Vec<CircuitInfo> = settings
        .circuits()
        .into_iter()
        .filter_map(|id| {
            settings.circuit(id).map(|binding| CircuitInfo {
                id: id.to_string(),
                kind: binding.kind,
                signal_count: binding.inputs.required_len(),
            })
        })
        .collect();
    let count = circuits.len();
    Json(CircuitsResponse { circuits, count })
}

async fn handle_circuit_inputs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<InputsResponse>, ApiError> {
    let settings = state.engine.settings();
    let binding = settings.circuit(&id).ok_or_else(|| ApiError {
        status: StatusCode::NOT_FOUND,
        body: ErrorResponse {
            error: format!("circuit {} is not registered", id),
            kind: "unsupported_circuit".into(),
            class: vigil_verifier::ErrorClass::Malformed,
        },
    })?;
    let inputs = binding
        .inputs
        .names()
        .into_iter()
        .map(|(name, index)| InputInfo {
            name: name.to_string(),
            index,
        })
        .collect();
    Ok(Json(InputsResponse { circuit: id, inputs }))
}

async fn handle_verify(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<VerifyBody>, JsonRejection>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let Json(body) =
        payload.map_err(|e| ApiError::malformed("invalid_body", e.body_text()))?;
    state.verify(&body).map(Json)
}

// --- Server ---

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(handle_health))
        .route("/api/v1/status", get(handle_status))
        .route("/api/v1/circuits", get(handle_circuits))
        .route("/api/v1/circuits/{id}/inputs", get(handle_circuit_inputs))
        .route("/api/v1/verify", post(handle_verify))
        .with_state(state)
}

pub async fn start_api_server(listen_addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app).await?;
    Ok(())
}
