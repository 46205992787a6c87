mod cli;
mod config;
mod input;
mod tail;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // stdout carries data, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tailpipe=warn".parse()?),
        )
        .init();

    let cli = Cli::parse();
    cli::run(cli).await
}
