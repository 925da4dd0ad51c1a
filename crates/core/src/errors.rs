use thiserror::Error;

/// The single user-facing reply for any internal agent failure. The typed
/// reason is logged for operators; the caller only ever sees this text.
pub const APOLOGY_REPLY: &str =
    "Sorry, I encountered an error trying to process your request.";

/// Failure reasons an `answer` call can carry back to its boundary. The
/// boundary decides presentation; none of these propagate as a transport
/// error to the end user.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error("language model request failed: {0}")]
    Model(String),
    #[error("warehouse query failed: {0}")]
    Query(String),
    #[error("no final answer after {iterations} reasoning iterations")]
    Exhausted { iterations: u32 },
}

impl AgentError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Model(_) => "model_failure",
            Self::Query(_) => "query_failure",
            Self::Exhausted { .. } => "iteration_budget_exhausted",
        }
    }

    /// Blanket apology, independent of cause.
    pub fn user_reply(&self) -> &'static str {
        APOLOGY_REPLY
    }
}
