use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use datachat_core::errors::AgentError;
use datachat_warehouse::{connection::WarehousePool, introspect, query};

use crate::llm::{ChatMessage, LlmClient};
use crate::protocol::{
    self, AgentStep, FORMAT_REMINDER, TOOL_DESCRIBE_TABLE, TOOL_LIST_TABLES, TOOL_RUN_QUERY,
};

const DEFAULT_MAX_ITERATIONS: u32 = 10;
const DEFAULT_MAX_RESULT_ROWS: usize = 50;

/// A failed tool execution, fed back to the model as an observation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ToolError(pub String);

/// The warehouse operations the agent may invoke. A trait seam so the loop
/// is testable without a live warehouse.
#[async_trait]
pub trait QueryTools: Send + Sync {
    async fn list_tables(&self) -> Result<String, ToolError>;
    async fn describe_table(&self, table: &str) -> Result<String, ToolError>;
    async fn run_query(&self, sql: &str) -> Result<String, ToolError>;
}

/// Live implementation over the warehouse pool.
pub struct WarehouseTools {
    pool: WarehousePool,
    max_result_rows: usize,
}

impl WarehouseTools {
    pub fn new(pool: WarehousePool) -> Self {
        Self { pool, max_result_rows: DEFAULT_MAX_RESULT_ROWS }
    }
}

#[async_trait]
impl QueryTools for WarehouseTools {
    async fn list_tables(&self) -> Result<String, ToolError> {
        let tables = introspect::list_tables(&self.pool)
            .await
            .map_err(|error| ToolError(error.to_string()))?;
        if tables.is_empty() {
            return Ok("no tables are visible in this warehouse".to_string());
        }
        Ok(tables.join("\n"))
    }

    async fn describe_table(&self, table: &str) -> Result<String, ToolError> {
        introspect::describe_table(&self.pool, table)
            .await
            .map_err(|error| ToolError(error.to_string()))
    }

    async fn run_query(&self, sql: &str) -> Result<String, ToolError> {
        let output = query::run_query(&self.pool, sql, self.max_result_rows)
            .await
            .map_err(|error| ToolError(error.to_string()))?;
        Ok(output.render())
    }
}

/// The agent wrapper: one operation, `answer`. Configuration is fixed at
/// construction and never mutated afterwards.
pub struct SqlAgent {
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn QueryTools>,
    system_prompt: String,
    max_iterations: u32,
}

impl SqlAgent {
    pub fn new(llm: Arc<dyn LlmClient>, tools: Arc<dyn QueryTools>, dataset: Option<&str>) -> Self {
        Self {
            llm,
            tools,
            system_prompt: protocol::system_prompt(dataset),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Answer a natural-language question. Returns the model's final answer
    /// text, or the typed reason the loop could not produce one; the caller
    /// decides how to present a failure.
    pub async fn answer(&self, question: &str) -> Result<String, AgentError> {
        let mut messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(question.to_string()),
        ];
        let mut last_query_failure: Option<String> = None;

        for iteration in 1..=self.max_iterations {
            let reply = self
                .llm
                .complete(&messages)
                .await
                .map_err(|error| AgentError::Model(error.to_string()))?;
            messages.push(ChatMessage::assistant(reply.clone()));

            match protocol::parse_step(&reply) {
                AgentStep::FinalAnswer(answer) => {
                    debug!(iteration, "agent produced a final answer");
                    return Ok(answer);
                }
                AgentStep::Action { tool, input } => {
                    debug!(iteration, tool = %tool, "agent invoked a tool");
                    let observation = match self.dispatch(&tool, &input).await {
                        Ok(output) => {
                            last_query_failure = None;
                            output
                        }
                        Err(ToolError(detail)) => {
                            last_query_failure = Some(detail.clone());
                            format!("the tool call failed: {detail}")
                        }
                    };
                    messages.push(ChatMessage::user(format!("Observation: {observation}")));
                }
                AgentStep::Unparsable => {
                    debug!(iteration, "agent reply did not follow the step format");
                    messages.push(ChatMessage::user(FORMAT_REMINDER.to_string()));
                }
            }
        }

        match last_query_failure {
            Some(detail) => Err(AgentError::Query(detail)),
            None => Err(AgentError::Exhausted { iterations: self.max_iterations }),
        }
    }

    async fn dispatch(&self, tool: &str, input: &str) -> Result<String, ToolError> {
        match tool {
            TOOL_LIST_TABLES => self.tools.list_tables().await,
            TOOL_DESCRIBE_TABLE => self.tools.describe_table(input).await,
            TOOL_RUN_QUERY => self.tools.run_query(input).await,
            unknown => Ok(format!(
                "unknown tool `{unknown}`; available tools: \
                 {TOOL_LIST_TABLES}, {TOOL_DESCRIBE_TABLE}, {TOOL_RUN_QUERY}"
            )),
        }
    }
}
