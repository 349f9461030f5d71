use clap::Parser;
use gatekeep::cli::{Cli, Output};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            Output::new(false, quiet).error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
