//! Analyzer endpoint handlers
//!
//! Request bodies are read with an upper bound of `MAX_POLICY_BYTES`; a
//! longer body fails the read and maps to a 400 like every other decode
//! error. Every terminal error becomes `{"error": "<message>"}` with the
//! status from `Error::http_status`.

use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, info, warn};

use parapet_core::decode;
use parapet_core::types::{AnalyzeResponse, ApplyResponse};
use parapet_core::utils::generate_request_id;
use parapet_core::{Error, MAX_POLICY_BYTES};
use parapet_engine::{analyzer, graph, normalizer, scorer, simplifier};

const REQUEST_ID_HEADER: &str = "x-request-id";

fn error_response(err: &Error, request_id: &str) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        [(REQUEST_ID_HEADER, request_id)],
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

fn success_response(body: impl serde::Serialize, request_id: &str) -> Response {
    (
        StatusCode::OK,
        [(REQUEST_ID_HEADER, request_id)],
        Json(body),
    )
        .into_response()
}

/// GET /healthz
pub async fn healthz() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// POST /analyze - analyze a raw policy document
pub async fn analyze(request: Request) -> Response {
    let request_id = generate_request_id();

    let body = match axum::body::to_bytes(request.into_body(), MAX_POLICY_BYTES).await {
        Ok(body) => body,
        Err(_) => {
            warn!(%request_id, "analyze body exceeds size limit");
            return error_response(&Error::InputTooLarge, &request_id);
        }
    };
    debug!(%request_id, bytes = body.len(), "Analyze request");

    let policy = match decode::parse_policy(&body) {
        Ok(policy) => policy,
        Err(e) => {
            warn!(%request_id, "rejecting policy: {}", e);
            return error_response(&e, &request_id);
        }
    };

    let normalized = normalizer::normalize(&policy);
    let graph = graph::build(&normalized);

    let score = scorer::score(&normalized);
    let findings = analyzer::analyze_with(&normalized, &graph);
    let mut suggestions = simplifier::suggest_with(&normalized, &graph);
    simplifier::render_previews(&normalized, &mut suggestions);
    let graph_data = graph::serialize(&graph, &normalized);

    info!(
        %request_id,
        findings = findings.len(),
        suggestions = suggestions.len(),
        score = score.score,
        "analysis complete"
    );

    success_response(
        AnalyzeResponse {
            original: policy,
            normalized,
            score,
            findings,
            suggestions,
            graph: Some(graph_data),
        },
        &request_id,
    )
}

/// POST /apply - apply selected patches to a policy
pub async fn apply(request: Request) -> Response {
    let request_id = generate_request_id();

    let body = match axum::body::to_bytes(request.into_body(), MAX_POLICY_BYTES).await {
        Ok(body) => body,
        Err(_) => {
            warn!(%request_id, "apply body exceeds size limit");
            return error_response(&Error::InputTooLarge, &request_id);
        }
    };
    debug!(%request_id, bytes = body.len(), "Apply request");

    let req = match decode::parse_apply_request(&body) {
        Ok(req) => req,
        Err(e) => {
            warn!(%request_id, "rejecting apply request: {}", e);
            return error_response(&e, &request_id);
        }
    };

    let normalized = normalizer::normalize(&req.policy);
    let suggestions = simplifier::suggest(&normalized);
    let simplified = simplifier::apply(&normalized, &suggestions, &req.patch_ids);

    let score = scorer::score(&simplified);
    let findings = analyzer::analyze(&simplified);

    info!(
        %request_id,
        selected = req.patch_ids.len(),
        statements = simplified.statement.len(),
        "apply complete"
    );

    success_response(
        ApplyResponse {
            simplified,
            score,
            findings,
        },
        &request_id,
    )
}
