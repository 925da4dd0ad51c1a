pub mod chat;
pub mod config;
pub mod doctor;

#[derive(Debug, Clone)]
pub struct CommandReport {
    pub exit_code: u8,
    pub output: String,
}
