//! The text protocol between the agent loop and the model: a system prompt
//! enumerating the tools, and a parser for the model's step replies.
//!
//! One step is either an action (`Action:` + `Action Input:`) or a final
//! answer (`Final Answer:`). Anything else is unparsable and earns a format
//! reminder observation rather than an error, so the model can correct
//! itself on the next iteration.

pub const TOOL_LIST_TABLES: &str = "list_tables";
pub const TOOL_DESCRIBE_TABLE: &str = "describe_table";
pub const TOOL_RUN_QUERY: &str = "run_query";

pub const FORMAT_REMINDER: &str = "Observation: your reply did not follow the required format. \
     Reply with either `Action:` and `Action Input:` lines to use a tool, \
     or a `Final Answer:` line with your answer.";

/// One parsed model reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentStep {
    Action { tool: String, input: String },
    FinalAnswer(String),
    Unparsable,
}

pub fn system_prompt(dataset: Option<&str>) -> String {
    let scope = match dataset {
        Some(dataset) => format!("the `{dataset}` dataset of a SQL data warehouse"),
        None => "a SQL data warehouse".to_string(),
    };

    format!(
        "You answer questions about data in {scope}. You can inspect the schema \
and run read-only SQL queries.\n\
\n\
Available tools:\n\
- {TOOL_LIST_TABLES}: list the available tables. Input: none.\n\
- {TOOL_DESCRIBE_TABLE}: show the columns of one table. Input: the table name.\n\
- {TOOL_RUN_QUERY}: run one SQL query and see its result. Input: the SQL.\n\
\n\
Use exactly this format for each step:\n\
Thought: what you want to find out next\n\
Action: the tool name\n\
Action Input: the input for the tool\n\
\n\
After each action you receive an `Observation:` with the tool's output. \
When you know the answer, reply with:\n\
Final Answer: the answer to the user's question\n\
\n\
Always look at the schema before querying a table you have not seen. \
If a query fails, read the error and try a corrected query."
    )
}

pub fn parse_step(reply: &str) -> AgentStep {
    if let Some(action) = parse_action(reply) {
        return action;
    }

    if let Some(answer) = text_after(reply, "Final Answer:") {
        let answer = answer.trim();
        if !answer.is_empty() {
            return AgentStep::FinalAnswer(answer.to_string());
        }
    }

    AgentStep::Unparsable
}

fn parse_action(reply: &str) -> Option<AgentStep> {
    let action_body = text_after(reply, "Action:")?;
    let tool = action_body.lines().next().unwrap_or_default().trim().to_string();
    if tool.is_empty() {
        return None;
    }

    let input = text_after(action_body, "Action Input:")?;
    let input = strip_code_fences(
        until_marker(input, &["Observation:", "Thought:", "Final Answer:"]).trim(),
    );
    Some(AgentStep::Action { tool, input })
}

fn text_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    text.find(marker).map(|position| &text[position + marker.len()..])
}

fn until_marker<'a>(text: &'a str, markers: &[&str]) -> &'a str {
    let end = markers.iter().filter_map(|marker| text.find(marker)).min().unwrap_or(text.len());
    &text[..end]
}

/// Models often wrap SQL in markdown fences; the warehouse does not want them.
fn strip_code_fences(input: &str) -> String {
    let trimmed = input.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    trimmed
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{parse_step, system_prompt, AgentStep};

    #[test]
    fn parses_final_answer() {
        let step = parse_step("Thought: I have what I need.\nFinal Answer: There are 42 orders.");
        assert_eq!(step, AgentStep::FinalAnswer("There are 42 orders.".to_string()));
    }

    #[test]
    fn parses_action_with_multiline_input() {
        let step = parse_step(
            "Thought: check row count\nAction: run_query\nAction Input:\nSELECT count(*)\nFROM orders",
        );
        assert_eq!(
            step,
            AgentStep::Action {
                tool: "run_query".to_string(),
                input: "SELECT count(*)\nFROM orders".to_string(),
            }
        );
    }

    #[test]
    fn strips_markdown_fences_from_action_input() {
        let step = parse_step(
            "Action: run_query\nAction Input: ```sql\nSELECT 1\n```",
        );
        assert_eq!(
            step,
            AgentStep::Action { tool: "run_query".to_string(), input: "SELECT 1".to_string() }
        );
    }

    #[test]
    fn action_wins_when_reply_also_mentions_final_answer() {
        let step = parse_step(
            "Action: describe_table\nAction Input: orders\nThen I will give a Final Answer: soon",
        );
        assert!(matches!(step, AgentStep::Action { ref tool, .. } if tool == "describe_table"));
    }

    #[test]
    fn action_input_stops_at_hallucinated_observation() {
        let step = parse_step(
            "Action: run_query\nAction Input: SELECT 1\nObservation: 1 row",
        );
        assert_eq!(
            step,
            AgentStep::Action { tool: "run_query".to_string(), input: "SELECT 1".to_string() }
        );
    }

    #[test]
    fn malformed_replies_are_unparsable() {
        assert_eq!(parse_step("I think the answer might be in the orders table."), AgentStep::Unparsable);
        assert_eq!(parse_step("Action: run_query"), AgentStep::Unparsable);
        assert_eq!(parse_step("Final Answer:"), AgentStep::Unparsable);
    }

    #[test]
    fn system_prompt_mentions_every_tool_and_the_dataset() {
        let prompt = system_prompt(Some("events"));
        assert!(prompt.contains("list_tables"));
        assert!(prompt.contains("describe_table"));
        assert!(prompt.contains("run_query"));
        assert!(prompt.contains("`events`"));

        let unscoped = system_prompt(None);
        assert!(unscoped.contains("a SQL data warehouse"));
    }
}
