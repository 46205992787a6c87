use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::tail::{TailConfig, WindowStrategy};

/// Top-level config file structure (default.toml)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Tailfile {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub buffer: BufferConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Number of trailing lines (default: 10)
    pub lines: Option<u64>,
    /// Number of trailing bytes; overrides `lines` when non-zero
    pub bytes: Option<u64>,
    /// Never print headers
    pub quiet: Option<bool>,
    /// Always print headers
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct BufferConfig {
    /// Line window strategy (default: ring)
    pub strategy: Option<WindowStrategy>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Cancel processing after this many milliseconds
    pub timeout_ms: Option<u64>,
}

impl Tailfile {
    /// Parse a config file from a TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let tailfile: Tailfile = toml::from_str(content).context("Failed to parse config file")?;
        Ok(tailfile)
    }

    /// Load a config file from a path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content)
    }

    /// Merge another Tailfile on top of this one (other overrides self)
    pub fn merge(&mut self, other: &Tailfile) {
        // Output: a layer that only names a line count switches back to lines
        if other.output.lines.is_some() {
            self.output.lines = other.output.lines;
            if other.output.bytes.is_none() {
                self.output.bytes = None;
            }
        }
        if other.output.bytes.is_some() {
            self.output.bytes = other.output.bytes;
        }

        // Quiet and verbose cancel each other; the later layer wins
        match (other.output.quiet, other.output.verbose) {
            (Some(true), None) => {
                self.output.quiet = Some(true);
                self.output.verbose = Some(false);
            }
            (None, Some(true)) => {
                self.output.verbose = Some(true);
                self.output.quiet = Some(false);
            }
            (quiet, verbose) => {
                if quiet.is_some() {
                    self.output.quiet = quiet;
                }
                if verbose.is_some() {
                    self.output.verbose = verbose;
                }
            }
        }

        // Buffer
        if other.buffer.strategy.is_some() {
            self.buffer.strategy = other.buffer.strategy;
        }

        // Runtime
        if other.runtime.timeout_ms.is_some() {
            self.runtime.timeout_ms = other.runtime.timeout_ms;
        }
    }

    /// Resolve the effective settings by merging layers: defaults -> file -> CLI.
    /// A missing file is skipped.
    pub fn resolve(path: Option<&Path>, cli_overrides: Option<&Tailfile>) -> Result<Self> {
        let mut config = Tailfile::default();

        match path {
            Some(path) if path.exists() => {
                let file = Tailfile::load(path)?;
                config.merge(&file);
            }
            _ => tracing::debug!(path = ?path, "No config file, using defaults"),
        }

        if let Some(overrides) = cli_overrides {
            config.merge(overrides);
        }

        Ok(config)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.runtime.timeout_ms.map(Duration::from_millis)
    }

    /// Build the engine configuration from the resolved settings
    pub fn to_tail_config(&self) -> TailConfig {
        TailConfig::new()
            .with_lines(self.output.lines.unwrap_or(0))
            .with_bytes(self.output.bytes.unwrap_or(0))
            .with_quiet(self.output.quiet.unwrap_or(false))
            .with_verbose(self.output.verbose.unwrap_or(false))
            .with_strategy(self.buffer.strategy.unwrap_or_default())
    }
}
