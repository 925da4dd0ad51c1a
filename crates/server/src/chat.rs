//! The chat endpoint: `POST /chat` with `{"message": string}` in,
//! `{"reply": string}` out. Empty messages are rejected before the agent is
//! ever invoked; agent failures become the fixed apology reply with a 200,
//! never a 500.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use datachat_agent::SqlAgent;
use datachat_core::errors::AgentError;

/// What the endpoint needs from the agent; a seam so routes are testable
/// with a stub.
#[async_trait]
pub trait ChatAgent: Send + Sync {
    async fn answer(&self, question: &str) -> Result<String, AgentError>;
}

#[async_trait]
impl ChatAgent for SqlAgent {
    async fn answer(&self, question: &str) -> Result<String, AgentError> {
        SqlAgent::answer(self, question).await
    }
}

#[derive(Clone)]
pub struct ChatState {
    agent: Arc<dyn ChatAgent>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRejection {
    pub error: String,
}

pub fn router(agent: Arc<dyn ChatAgent>) -> Router {
    Router::new().route("/chat", post(chat)).with_state(ChatState { agent })
}

pub async fn chat(
    State(state): State<ChatState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ChatRejection>)> {
    if request.message.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ChatRejection { error: "message cannot be empty".to_string() }),
        ));
    }

    let request_id = Uuid::new_v4();

    match state.agent.answer(&request.message).await {
        Ok(reply) => {
            info!(
                event_name = "api.chat.answered",
                request_id = %request_id,
                reply_chars = reply.len(),
                "chat request answered"
            );
            Ok(Json(ChatResponse { reply }))
        }
        Err(failure) => {
            warn!(
                event_name = "api.chat.agent_failure",
                request_id = %request_id,
                reason_code = failure.reason_code(),
                error = %failure,
                "agent failed; returning apology reply"
            );
            Ok(Json(ChatResponse { reply: failure.user_reply().to_string() }))
        }
    }
}
