//! Inference relay: HTTP front door for the local daemon
//!
//! Exposes two endpoints:
//! - POST /ask - verify the request signature (when a secret is
//!   configured), forward the prompt to the daemon, return its JSON
//!   verbatim
//! - GET /api/status - health check with daemon reachability
//!
//! The relay is stateless per request; failures talking to the daemon
//! come back as structured `{"error": ...}` bodies instead of hanging or
//! crashing the handler.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, header},
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::auth::{self, SIGNATURE_HEADER, SignedPayload, TIMESTAMP_HEADER};
use crate::config::Settings;
use crate::error::CellmateError;
use crate::provider::OllamaClient;
use crate::secret;

// ============================================================================
// Request Types
// ============================================================================

/// Body of POST /ask
///
/// `system_prompt` rides along for signature coverage only; the relay does
/// not forward it to the daemon.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

// ============================================================================
// Server State
// ============================================================================

#[derive(Clone)]
pub struct RelayState {
    pub daemon: OllamaClient,
    /// Substituted when a request names no model
    pub default_model: String,
    /// None runs the unauthenticated minimal variant
    pub secret: Option<String>,
    pub max_skew_secs: i64,
}

// ============================================================================
// Routes
// ============================================================================

/// Create the router with all endpoints
pub fn create_router(state: RelayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/ask", post(ask_handler))
        .route("/api/status", get(status_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the relay server until shutdown
pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let secret = secret::load(&settings.secret_file)?;
    if secret.is_none() {
        warn!(
            "no shared secret at {}; running without request authentication",
            settings.secret_file.display()
        );
    }

    let state = RelayState {
        daemon: OllamaClient::new(
            settings.ollama_url.clone(),
            std::time::Duration::from_secs(settings.timeout_secs),
        ),
        default_model: settings.default_model.clone(),
        secret,
        max_skew_secs: settings.max_skew_secs,
    };

    let app = create_router(state);
    let bind_address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("relay listening on http://{bind_address}");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

type ApiError = (StatusCode, Json<Value>);

fn error_body(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

async fn status_handler(State(state): State<RelayState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "daemon": state.daemon.is_reachable().await,
        "auth": state.secret.is_some(),
    }))
}

async fn ask_handler(
    State(state): State<RelayState>,
    headers: HeaderMap,
    Json(request): Json<AskRequest>,
) -> Result<Json<Value>, ApiError> {
    if let Some(secret) = &state.secret {
        if let Err(e) = check_signature(secret, &headers, &request, state.max_skew_secs) {
            warn!("rejected request: {e}");
            return Err(error_body(StatusCode::UNAUTHORIZED, e.to_string()));
        }
    }

    let model = request.model.as_deref().unwrap_or(&state.default_model);
    info!(model, prompt_chars = request.prompt.len(), "forwarding to daemon");

    match state.daemon.generate(model, &request.prompt).await {
        Ok(completion) => Ok(Json(completion)),
        Err(e @ CellmateError::DaemonStatus { .. }) => {
            Err(error_body(StatusCode::BAD_GATEWAY, e.to_string()))
        }
        Err(e) => {
            warn!("daemon unreachable: {e}");
            Err(error_body(
                StatusCode::BAD_GATEWAY,
                format!("daemon unreachable: {e}"),
            ))
        }
    }
}

/// Rebuild the signed payload from the request body and verify the header
/// signature against it. Absent optional fields are covered as empty
/// strings, matching what the client signs.
fn check_signature(
    secret: &str,
    headers: &HeaderMap,
    request: &AskRequest,
    max_skew_secs: i64,
) -> crate::Result<()> {
    let timestamp = headers
        .get(TIMESTAMP_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CellmateError::Auth("missing timestamp header".into()))?;
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CellmateError::Auth("missing signature header".into()))?;

    let payload = SignedPayload {
        model: request.model.clone().unwrap_or_default(),
        prompt: request.prompt.clone(),
        system_prompt: request.system_prompt.clone().unwrap_or_default(),
    };

    auth::verify(
        &payload,
        secret,
        timestamp,
        signature,
        max_skew_secs,
        chrono::Utc::now().timestamp(),
    )
}
