//! SQL reasoning agent: translates a natural-language question into
//! warehouse queries and a final textual answer.
//!
//! The agent is a bounded loop over a pluggable [`llm::LlmClient`]: the
//! model picks one of three fixed tools per step (list tables, describe a
//! table, run a query), the tool's output goes back as an observation, and
//! the loop ends when the model emits a final answer or the iteration
//! budget runs out. Which queries run is entirely the model's decision;
//! callers see only `answer(question) -> Result<String, AgentError>`.

pub mod http;
pub mod llm;
pub mod protocol;
pub mod runtime;

pub use http::HttpLlmClient;
pub use llm::{ChatMessage, ChatRole, LlmClient, LlmError};
pub use runtime::{QueryTools, SqlAgent, ToolError, WarehouseTools};
