//! HTTP surface
//!
//! Every well-formed request gets a 200 with a JSON body; failures while
//! answering a chat are reported in the `reply` text rather than the status
//! code, which is what the browser front end expects. Unparsable chat bodies
//! get a 4xx with a JSON `detail`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use friday_ai::Turn;
use friday_conversation::ConversationStore;
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{Config, CorsConfig};

pub const INITIALIZING_REPLY: &str = "AI systems are still initializing. Please try again in a moment.";
pub const OVERLOADED_REPLY: &str = "Systems overloaded. Try again.";
pub const TECHNICAL_DIFFICULTIES_REPLY: &str =
    "I'm experiencing technical difficulties. Please try again.";
pub const CLEARED_MESSAGE: &str = "Conversation history cleared";

/// How many turns `GET /api/conversation` returns
pub const CONVERSATION_WINDOW: usize = 10;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: ConversationStore,
    pub config: Arc<Config>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ai_systems: AiSystems,
}

#[derive(Debug, Serialize)]
pub struct AiSystems {
    pub tts_initialized: bool,
    pub ollama_initialized: bool,
    pub conversation_length: usize,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub conversation: Vec<Turn>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: &'static str,
}

/// Body sent when a request cannot be parsed
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

fn reject(rejection: JsonRejection) -> Response {
    let status: StatusCode = rejection.status();
    let detail = rejection.body_text();
    tracing::warn!(%status, "Rejected chat request: {}", detail);
    (status, Json(ErrorResponse { detail })).into_response()
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route("/api/chat", post(chat))
        .route("/health", get(health))
        .route("/api/conversation", get(conversation))
        .route("/api/clear", post(clear))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return reject(rejection),
    };
    tracing::info!("Received message: {}", request.message);

    let reply = match state.store.exchange(&request.message).await {
        Ok(reply) => {
            tracing::info!("AI response: {}", reply);
            reply
        }
        Err(e) if e.is_not_ready() => INITIALIZING_REPLY.to_string(),
        Err(e) if e.is_backend_failure() => {
            tracing::error!("AI error: {}", e);
            OVERLOADED_REPLY.to_string()
        }
        Err(e) => {
            tracing::error!("Error in chat endpoint: {}", e);
            TECHNICAL_DIFFICULTIES_REPLY.to_string()
        }
    };

    Json(ChatResponse { reply }).into_response()
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        ai_systems: AiSystems {
            // No speech pipeline exists; the browser speaks replies itself.
            tts_initialized: false,
            ollama_initialized: state.store.is_ready(),
            conversation_length: state.store.len(),
        },
    })
}

async fn conversation(State(state): State<AppState>) -> Json<ConversationResponse> {
    Json(ConversationResponse {
        conversation: state.store.window(CONVERSATION_WINDOW),
    })
}

async fn clear(State(state): State<AppState>) -> Json<ClearResponse> {
    let message = match state.store.clear_async().await {
        Ok(()) => {
            tracing::info!("Conversation history cleared");
            CLEARED_MESSAGE
        }
        Err(e) => {
            tracing::error!("Error clearing conversation: {}", e);
            TECHNICAL_DIFFICULTIES_REPLY
        }
    };
    Json(ClearResponse { message })
}
