//! The coaching endpoint.
//!
//! `POST /agent` drives the full pipeline: detached fact extraction, memory
//! recall, prompt composition, provider dispatch, and mode-specific cleanup
//! of the reply.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use vq_core::mode::{clean_fences, Mode};
use vq_core::request::build_request;
use vq_core::types::AgentRequest;
use vq_core::{prompt, Error};

use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/agent", post(handle_agent))
}

// ============================================================================
// Response Types
// ============================================================================

/// Successful reply; the field name depends on the mode
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AgentReply {
    Text { text: String },
    Title { title: String },
    Summary { summary: String },
}

/// Title when generation fails or returns nothing
const FALLBACK_TITLE: &str = "New Chat";
/// Summary when the model returns empty text
const FALLBACK_SUMMARY_EMPTY: &str = "Keep pushing forward! You're doing great!";
/// Summary when the provider call fails outright
const FALLBACK_SUMMARY_FAILED: &str = "Keep going! You're making progress every day!";

// ============================================================================
// Handler
// ============================================================================

pub async fn handle_agent(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<Value>,
) -> Result<Json<AgentReply>, (StatusCode, Json<Value>)> {
    let request: AgentRequest =
        serde_json::from_value(raw).map_err(|err| bad_request(err.to_string()))?;
    let mode = request.mode.unwrap_or_default();
    debug!(
        ?mode,
        user = request.user_id.as_deref().unwrap_or("anonymous"),
        "agent request"
    );

    let result = run(&state, mode, &request).await;

    // Title and summary generation degrade to canned copy instead of
    // surfacing provider failures to the app
    match (mode, result) {
        (Mode::Title, Ok(text)) => Ok(Json(title_reply(&text))),
        (Mode::Title, Err(err)) => {
            warn!(%err, "title generation failed");
            Ok(Json(AgentReply::Title {
                title: FALLBACK_TITLE.to_string(),
            }))
        }
        (Mode::GenerateSummary, Ok(text)) => Ok(Json(summary_reply(&text))),
        (Mode::GenerateSummary, Err(err)) => {
            warn!(%err, "summary generation failed");
            Ok(Json(AgentReply::Summary {
                summary: FALLBACK_SUMMARY_FAILED.to_string(),
            }))
        }
        (_, Ok(text)) => Ok(Json(AgentReply::Text {
            text: clean_fences(&text, mode.profile().fences),
        })),
        (_, Err(err)) => Err(error_response(err)),
    }
}

/// Run the pipeline up through the provider call and return the raw reply
async fn run(state: &AppState, mode: Mode, request: &AgentRequest) -> vq_core::Result<String> {
    let profile = mode.profile();
    let message = request.message.as_deref().filter(|m| !m.is_empty());
    let user_id = request.user_id.as_deref().filter(|u| !u.is_empty());

    // Fire-and-forget; the reply never waits on fact storage
    if profile.extracts_facts {
        if let (Some(message), Some(user_id)) = (message, user_id) {
            state
                .memory
                .spawn_remember(user_id.to_string(), message.to_string());
        }
    }

    // Recall only feeds modes whose template consumes the memory block
    let memory_block = match user_id {
        Some(user_id) if profile.injects_memory => {
            state.memory.recall(user_id, message).await.render()
        }
        _ => String::new(),
    };

    let prompt = prompt::compose(mode, message, request.context.as_ref(), &memory_block);

    let provider_request = build_request(
        &state.http,
        &profile,
        &prompt,
        message,
        request.history.as_deref(),
        request.attachments.as_deref(),
    )
    .await;

    state.provider.generate(&provider_request).await
}

fn title_reply(text: &str) -> AgentReply {
    let title = text.trim();
    AgentReply::Title {
        title: if title.is_empty() {
            FALLBACK_TITLE.to_string()
        } else {
            title.to_string()
        },
    }
}

fn summary_reply(text: &str) -> AgentReply {
    let summary = text.trim();
    AgentReply::Summary {
        summary: if summary.is_empty() {
            FALLBACK_SUMMARY_EMPTY.to_string()
        } else {
            summary.to_string()
        },
    }
}

fn bad_request(message: String) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

/// Provider failures mirror the upstream status; a success response without
/// candidates passes the raw provider body through at 500; everything else
/// is a 400
fn error_response(err: Error) -> (StatusCode, Json<Value>) {
    match err {
        Error::Upstream { status, body } => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            Json(json!({ "error": "Generation request failed", "details": body })),
        ),
        Error::EmptyResponse(raw) => {
            let body = match serde_json::from_str::<Value>(&raw) {
                Ok(body) => body,
                Err(_) => json!({ "error": "Generation request failed", "details": raw }),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body))
        }
        other => bad_request(other.to_string()),
    }
}
