//! The chat endpoint and router.
//!
//! POST /api/v1/chat validates the request body against the configured
//! (model, provider) pair, then hands the conversation to the inference
//! gateway and answers with its streamed byte chunks.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::ollama::{self, ChatMessage};
use crate::pool::HttpPool;
use crate::server::static_files;
use crate::server::streaming::relay_to_body_stream;

/// Application state shared across handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: Arc<HttpPool>,
}

/// Build the axum router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    // The UI may be served from any origin; no credentials are used.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(static_files::serve_index))
        .route("/{asset}", get(static_files::serve_asset))
        .route("/api/v1/chat", post(chat_completion))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ─── Request/Response Types ────────────────────────────────────────────────

/// Chat request body. Malformed bodies are rejected by the Json extractor
/// before this handler runs.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    #[serde(rename = "modelProvider")]
    pub model_provider: String,
    pub message: String,
}

/// Pre-stream error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

fn bad_request(detail: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { detail })).into_response()
}

// ─── Route Handlers ────────────────────────────────────────────────────────

async fn chat_completion(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();

    info!(
        request_id,
        model = %req.model,
        provider = %req.model_provider,
        "Chat request"
    );

    if req.model != state.config.chat.default_model {
        warn!(request_id, model = %req.model, "Rejecting unsupported model");
        return bad_request(format!("Model {} not supported", req.model));
    }
    if req.model_provider != state.config.chat.default_provider {
        warn!(
            request_id,
            provider = %req.model_provider,
            "Rejecting unsupported model provider"
        );
        return bad_request(format!(
            "Model Provider {} not supported",
            req.model_provider
        ));
    }

    let Some(client) = state.pool.get().await else {
        warn!(request_id, "Chat request before client pool initialization");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorBody {
                detail: "HTTP client pool not initialized".to_string(),
            }),
        )
            .into_response();
    };

    let messages = vec![
        ChatMessage::system(state.config.chat.system_prompt.clone()),
        ChatMessage::user(req.message),
    ];

    let rx = ollama::stream_chat(
        client,
        state.config.clone(),
        req.model,
        messages,
        request_id,
    );

    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(relay_to_body_stream(rx)),
    )
        .into_response()
}
