use std::future::Future;
use std::io::{BufWriter, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use crate::config::{self, Tailfile};
use crate::input::{Inputs, OpenError};
use crate::tail::error::TailError;
use crate::tail::orchestrator::SourceFailure;
use crate::tail::{MultiTail, TailConfig, TailReport, WindowStrategy};

/// Name reported when the final flush of stdout fails
const STDOUT_NAME: &str = "standard output";

/// Exit status after a second interrupt, when a read is stuck
const INTERRUPTED_EXIT: i32 = 130;

#[derive(Parser, Debug)]
#[command(
    name = "tailpipe",
    version,
    about = "Print the last 10 lines of each FILE to standard output"
)]
pub struct Cli {
    /// Files to read; with no FILE, or when FILE is -, read standard input
    pub files: Vec<String>,

    /// Output the last NUM lines
    #[arg(short = 'n', long, value_name = "NUM")]
    pub lines: Option<u64>,

    /// Output the last NUM bytes (overrides --lines)
    #[arg(short = 'c', long, value_name = "NUM")]
    pub bytes: Option<u64>,

    /// Accepted for compatibility; has no effect
    #[arg(short, long)]
    pub follow: bool,

    /// Accepted for compatibility; has no effect
    #[arg(short = 'F')]
    pub follow_retry: bool,

    /// Accepted for compatibility; has no effect
    #[arg(long, value_name = "NUM")]
    pub from_line: Option<u64>,

    /// Never print headers giving file names
    #[arg(short, long, visible_alias = "silent")]
    pub quiet: bool,

    /// Always print headers giving file names
    #[arg(short, long)]
    pub verbose: bool,

    /// Give up after MS milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// How lines are buffered while reading
    #[arg(long, value_enum)]
    pub strategy: Option<WindowStrategy>,

    /// Config file path (default: ~/.config/tailpipe/default.toml)
    #[arg(long)]
    pub config: Option<String>,
}

impl Cli {
    /// Settings given on the command line, as the top config layer
    fn overrides(&self) -> Tailfile {
        let mut overrides = Tailfile::default();
        overrides.output.lines = self.lines;
        overrides.output.bytes = self.bytes;
        overrides.output.quiet = self.quiet.then_some(true);
        overrides.output.verbose = self.verbose.then_some(true);
        overrides.buffer.strategy = self.strategy;
        overrides.runtime.timeout_ms = self.timeout;
        overrides
    }

    fn input_names(&self) -> Vec<String> {
        if self.files.is_empty() {
            vec!["-".to_string()]
        } else {
            self.files.clone()
        }
    }
}

pub async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = match &cli.config {
        Some(path) => Some(config::expand_config_path(path)),
        None => config::global_config_path().ok(),
    };
    let settings = Tailfile::resolve(config_path.as_deref(), Some(&cli.overrides()))?;

    let mut tail_config = settings.to_tail_config();
    tail_config.follow = cli.follow;
    tail_config.follow_retry = cli.follow_retry;
    tail_config.start_from_line = cli.from_line.unwrap_or(0);

    let names = cli.input_names();
    let show_headers = tail_config.show_headers(names.len());
    tracing::debug!(
        mode = ?tail_config.mode(),
        inputs = names.len(),
        show_headers,
        "Starting"
    );

    let outcome = run_with_deadline(settings.timeout(), move |cancel| {
        tail_inputs(&tail_config, names, show_headers, &cancel)
    })
    .await?;

    Ok(outcome.exit_code())
}

/// Everything that went wrong across one invocation
pub struct Outcome {
    pub report: TailReport,
    pub open_failures: Vec<OpenError>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.report.is_success() && self.open_failures.is_empty()
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Tail the named inputs to stdout. Runs on a blocking thread.
fn tail_inputs(
    config: &TailConfig,
    names: Vec<String>,
    show_headers: bool,
    cancel: &CancellationToken,
) -> Outcome {
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    tail_inputs_to(config, names, show_headers, cancel, &mut out)
}

fn tail_inputs_to<W: Write>(
    config: &TailConfig,
    names: Vec<String>,
    show_headers: bool,
    cancel: &CancellationToken,
    out: &mut W,
) -> Outcome {
    let mut inputs = Inputs::new(names);

    let mut report = MultiTail::new(config, show_headers, cancel).run(&mut inputs, out);
    if let Err(e) = out.flush() {
        tracing::warn!(error = %e, "Failed to flush stdout");
        report.failures.push(SourceFailure {
            name: STDOUT_NAME.to_string(),
            error: TailError::Write(e),
        });
    }
    if report.was_cancelled() {
        tracing::warn!(processed = report.processed, "Cancelled, remaining inputs skipped");
    }

    for failure in &report.failures {
        eprintln!("{}: {}: {}", env!("CARGO_PKG_NAME"), failure.name, failure.error);
    }

    Outcome {
        report,
        open_failures: inputs.into_failures(),
    }
}

/// Run blocking engine work with a token that is cancelled on Ctrl+C or
/// once `timeout` elapses.
pub async fn run_with_deadline<F, T>(timeout: Option<Duration>, job: F) -> Result<T>
where
    F: FnOnce(CancellationToken) -> T + Send + 'static,
    T: Send + 'static,
{
    run_with_watcher(timeout, interrupted(), job).await
}

async fn run_with_watcher<F, T, S>(timeout: Option<Duration>, interrupt: S, job: F) -> Result<T>
where
    F: FnOnce(CancellationToken) -> T + Send + 'static,
    T: Send + 'static,
    S: Future<Output = ()> + Send + 'static,
{
    let cancel = CancellationToken::new();
    let done = CancellationToken::new();
    let watcher = tokio::spawn(watch(cancel.clone(), done.clone(), timeout, interrupt));

    let result = tokio::task::spawn_blocking(move || job(cancel))
        .await
        .context("Tail worker failed");

    // Stop the watcher so a late deadline doesn't fire
    done.cancel();
    let _ = watcher.await;
    result
}

/// Cancel on the first interrupt or at the deadline, whichever comes first.
async fn watch<S>(
    cancel: CancellationToken,
    done: CancellationToken,
    timeout: Option<Duration>,
    interrupt: S,
) where
    S: Future<Output = ()>,
{
    let deadline = async {
        match timeout {
            Some(timeout) => tokio::time::sleep(timeout).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = done.cancelled() => return,
        _ = interrupt => {
            tracing::info!("Interrupted, cancelling");
            cancel.cancel();
        }
        _ = deadline => {
            tracing::warn!(?timeout, "Deadline reached, cancelling");
            cancel.cancel();
        }
    }

    // A read blocked on an idle input never sees the token; a second
    // interrupt gives up on it
    tokio::select! {
        _ = done.cancelled() => {}
        _ = interrupted() => {
            tracing::warn!("Interrupted again, exiting");
            std::process::exit(INTERRUPTED_EXIT);
        }
    }
}

/// Resolves on Ctrl+C. Never resolves if the signal can't be watched.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::debug!(error = %e, "Cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
