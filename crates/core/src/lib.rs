pub mod chat;
pub mod config;
pub mod errors;

pub use chat::{ChatTurn, Role, Transcript};
pub use errors::{AgentError, APOLOGY_REPLY};
