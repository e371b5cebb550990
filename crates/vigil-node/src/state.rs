//! Shared service state and the request-level verification path.

use std::time::Instant;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use vigil_core::{parse_signal, Address, Signal};
use vigil_state::InMemoryLedger;
use vigil_verifier::{CircuitProof, ErrorClass, VerificationEngine, VerificationError, VerifyRequest};

/// Shared state for the running service, accessible from HTTP handlers.
pub struct AppState {
    pub engine: VerificationEngine,
    pub ledger: InMemoryLedger,
    /// When the service started.
    pub start_time: Instant,
}

/// Body of `POST /api/v1/verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyBody {
    pub proof: CircuitProof,
    /// Public signals, decimal or `0x`-prefixed hex.
    pub signals: Vec<String>,
    /// Protobuf-encoded query, hex.
    pub query: String,
    /// Caller address.
    pub caller: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disclosure {
    pub name: String,
    pub index: usize,
    pub value: Signal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub request_id: String,
    pub valid: bool,
    pub disclosures: Vec<Disclosure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
    pub class: ErrorClass,
}

/// A rejected request: HTTP status plus body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl From<VerificationError> for ApiError {
    fn from(e: VerificationError) -> Self {
        let status = match e.class() {
            ErrorClass::Malformed => StatusCode::BAD_REQUEST,
            ErrorClass::Policy => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self {
            status,
            body: ErrorResponse {
                error: e.to_string(),
                kind: e.kind().to_string(),
                class: e.class(),
            },
        }
    }
}

impl ApiError {
    /// A request the service could not parse.
    pub fn malformed(kind: &str, error: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse {
                error,
                kind: kind.to_string(),
                class: ErrorClass::Malformed,
            },
        }
    }
}

impl AppState {
    pub fn new(engine: VerificationEngine, ledger: InMemoryLedger) -> Self {
        Self {
            engine,
            ledger,
            start_time: Instant::now(),
        }
    }

    /// Verify against the ledger as of the current wall-clock time.
    pub fn verify(&self, body: &VerifyBody) -> Result<VerifyResponse, ApiError> {
        self.verify_at(body, unix_now())
    }

    /// Verify against the ledger as of `now`.
    pub fn verify_at(&self, body: &VerifyBody, now: u64) -> Result<VerifyResponse, ApiError> {
        let request_id = uuid::Uuid::now_v7();
        let span = tracing::info_span!("verify", request_id = %request_id);
        let _enter = span.enter();

        let request = parse_body(body)?;
        let snapshot = self.ledger.snapshot(now);
        let pairs = self.engine.verify(&request, &snapshot)?;

        let disclosures = pairs
            .into_iter()
            .filter_map(|pair| {
                request.signals.get(pair.index).map(|value| Disclosure {
                    name: pair.name,
                    index: pair.index,
                    value: *value,
                })
            })
            .collect();
        Ok(VerifyResponse {
            request_id: request_id.to_string(),
            valid: true,
            disclosures,
        })
    }
}

/// Translate the JSON body into an engine request.
pub fn parse_body(body: &VerifyBody) -> Result<VerifyRequest, ApiError> {
    let signals = body
        .signals
        .iter()
        .enumerate()
        .map(|(index, text)| {
            parse_signal(text).map_err(|e| {
                ApiError::malformed("invalid_signal", format!("signal {}: {}", index, e))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let digits = body.query.strip_prefix("0x").unwrap_or(&body.query);
    let query = hex::decode(digits)
        .map_err(|e| VerificationError::MalformedQuery(format!("query is not hex: {}", e)))?;

    Ok(VerifyRequest {
        proof: body.proof.clone(),
        signals,
        query,
        caller: body.caller,
    })
}

/// Current unix time in seconds.
pub fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}
