pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "datachat",
    about = "Chat with a SQL data warehouse in natural language",
    after_help = "Examples:\n  datachat chat\n  datachat config\n  datachat doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start an interactive chat session against the datachat server")]
    Chat {
        #[arg(long, help = "Chat endpoint URL, overriding frontend.backend_url")]
        backend_url: Option<String>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, LLM credential readiness, and warehouse connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Chat { backend_url } => commands::chat::run(backend_url).await,
        Command::Config => {
            println!("{}", commands::config::run());
            ExitCode::SUCCESS
        }
        Command::Doctor { json } => {
            let report = commands::doctor::run(json).await;
            println!("{}", report.output);
            ExitCode::from(report.exit_code)
        }
    }
}
