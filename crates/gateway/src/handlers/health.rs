//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: ParserChecks,
}

#[derive(Serialize)]
pub struct ParserChecks {
    pub strategy: String,
    pub entities: String,
    pub dates: String,
    pub gazetteer_entries: usize,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Readiness probe - reports the parser wiring.
///
/// Capability backends degrade to fallbacks instead of failing, so the
/// gateway is ready as soon as the gazetteer has entries.
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let parser = &state.parser;
    let gazetteer_entries = parser.config().gazetteer.len();

    Json(ReadyResponse {
        status: if gazetteer_entries > 0 { "ready" } else { "not_ready" }.to_string(),
        checks: ParserChecks {
            strategy: parser.strategy().as_str().to_string(),
            entities: parser.recognizer_backend().to_string(),
            dates: parser.date_search_backend().to_string(),
            gazetteer_entries,
        },
    })
}
