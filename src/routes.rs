use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::orchestrator::Orchestrator;
use crate::types::{ErrorResponse, HealthResponse, VerificationRequest, VerifyBody};

/// Shared application state passed to all route handlers.
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub default_app_id: Option<String>,
    pub default_schema_id: Option<String>,
}

fn bad_request(error: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn parse_verify_body(raw: &[u8]) -> Result<VerifyBody, String> {
    if raw.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(VerifyBody::default());
    }
    serde_json::from_slice(raw).map_err(|e| format!("Invalid JSON body: {}", e))
}

/// POST /verify — Run one verification handshake.
///
/// Request body: VerifyBody { appId?, schemaId? } as JSON. Missing fields, or an
/// empty body, use the configured defaults.
/// Response: VerificationOutcome { status, proof?, errorMessage?, errorCode?, errorKind? }
pub async fn verify_handler(State(state): State<Arc<AppState>>, raw: Bytes) -> Response {
    let body = match parse_verify_body(&raw) {
        Ok(body) => body,
        Err(e) => return bad_request(&e),
    };

    let app_id = body
        .app_id
        .or_else(|| state.default_app_id.clone())
        .unwrap_or_default();
    let schema_id = body
        .schema_id
        .or_else(|| state.default_schema_id.clone())
        .unwrap_or_default();

    if app_id.trim().is_empty() {
        return bad_request("appId is required");
    }
    if schema_id.trim().is_empty() {
        return bad_request("schemaId is required");
    }

    tracing::info!("Verification requested: app={} schema={}", app_id, schema_id);

    let outcome = state
        .orchestrator
        .verify(VerificationRequest::new(app_id, schema_id))
        .await;

    (StatusCode::OK, Json(outcome)).into_response()
}

/// GET /health — Health check endpoint.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            wallet_configured: state.orchestrator.has_wallet(),
        }),
    )
}

/// Build the axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> axum::Router {
    use axum::routing::{get, post};
    use tower_http::cors::{Any, CorsLayer};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    axum::Router::new()
        .route("/verify", post(verify_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}
