//! Parse handlers

use axum::{extract::State, Json};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use validator::Validate;

use super::{validate, MAX_TEXT_CHARS};
use crate::AppState;
use wayfarer_common::{
    errors::{AppError, Result},
    query::structured,
    ParsedQuery,
};

/// Parse request
#[derive(Debug, Deserialize, Validate)]
pub struct ParseRequest {
    #[validate(length(max = 4000))]
    pub text: String,
}

/// Parse response
#[derive(Serialize)]
pub struct ParseResponse {
    pub query: ParsedQuery,
    pub strategy: String,
    pub processing_time_ms: u64,
}

/// Batch parse request
#[derive(Debug, Deserialize)]
pub struct BatchParseRequest {
    pub texts: Vec<String>,
}

/// Batch parse response, results in request order
#[derive(Serialize)]
pub struct BatchParseResponse {
    pub results: Vec<ParsedQuery>,
    pub strategy: String,
    pub processing_time_ms: u64,
}

/// Language-model completion to read
#[derive(Debug, Deserialize, Validate)]
pub struct StructuredRequest {
    #[validate(length(max = 16000))]
    pub output: String,
}

/// Parse one utterance
pub async fn parse(
    State(state): State<AppState>,
    Json(request): Json<ParseRequest>,
) -> Result<Json<ParseResponse>> {
    let start = Instant::now();
    validate(&request)?;

    let query = state.parser.parse(&request.text).await;
    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        destination = query.destination(),
        preference = query.preference(),
        latency_ms = processing_time_ms,
        "Parse completed"
    );

    Ok(Json(ParseResponse {
        query,
        strategy: state.parser.strategy().as_str().to_string(),
        processing_time_ms,
    }))
}

/// Parse several utterances concurrently
pub async fn parse_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchParseRequest>,
) -> Result<Json<BatchParseResponse>> {
    let start = Instant::now();
    let limit = state.config.server.max_batch_size;

    if request.texts.len() > limit {
        return Err(AppError::PayloadTooLarge {
            size: request.texts.len(),
            limit,
        });
    }
    if let Some(index) = request
        .texts
        .iter()
        .position(|text| text.chars().count() as u64 > MAX_TEXT_CHARS)
    {
        return Err(AppError::Validation {
            message: format!("texts[{}] exceeds {} characters", index, MAX_TEXT_CHARS),
            field: Some("texts".to_string()),
        });
    }

    let results = join_all(request.texts.iter().map(|text| state.parser.parse(text))).await;
    let processing_time_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        count = results.len(),
        latency_ms = processing_time_ms,
        "Batch parse completed"
    );

    Ok(Json(BatchParseResponse {
        results,
        strategy: state.parser.strategy().as_str().to_string(),
        processing_time_ms,
    }))
}

/// Read intent from a language model's JSON completion
pub async fn parse_structured(
    State(state): State<AppState>,
    Json(request): Json<StructuredRequest>,
) -> Result<Json<ParsedQuery>> {
    validate(&request)?;

    let query = structured::from_model_output(&request.output, state.parser.config());
    tracing::info!(destination = query.destination(), "Structured output read");

    Ok(Json(query))
}
