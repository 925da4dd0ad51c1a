use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    datachat_cli::run().await
}
