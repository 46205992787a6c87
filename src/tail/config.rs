use serde::{Deserialize, Serialize};

/// Line count used when neither lines nor bytes were requested
pub const DEFAULT_LINES: u64 = 10;

/// How the line-mode window is accumulated
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WindowStrategy {
    /// Keep only the requested number of lines while reading
    #[default]
    Ring,
    /// Read every line into memory, then slice the tail
    Materialize,
}

/// Unit the window is measured in, resolved from a [`TailConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailMode {
    Lines(u64),
    Bytes(u64),
}

/// Options for one tail invocation.
///
/// `follow`, `follow_retry` and `start_from_line` are accepted for
/// compatibility but have no effect; no live-follow is implemented.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TailConfig {
    pub lines: u64,
    pub bytes: u64,
    pub start_from_line: u64,
    pub follow: bool,
    pub follow_retry: bool,
    pub quiet: bool,
    pub suppress_headers: bool,
    pub verbose: bool,
    pub always_headers: bool,
    pub strategy: WindowStrategy,
}

impl TailConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines(mut self, lines: u64) -> Self {
        self.lines = lines;
        self
    }

    pub fn with_bytes(mut self, bytes: u64) -> Self {
        self.bytes = bytes;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_strategy(mut self, strategy: WindowStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Byte mode wins whenever a byte count is set
    pub fn mode(&self) -> TailMode {
        if self.bytes > 0 {
            TailMode::Bytes(self.bytes)
        } else if self.lines == 0 {
            TailMode::Lines(DEFAULT_LINES)
        } else {
            TailMode::Lines(self.lines)
        }
    }

    pub fn headers_suppressed(&self) -> bool {
        self.quiet || self.suppress_headers
    }

    pub fn headers_forced(&self) -> bool {
        self.verbose || self.always_headers
    }

    /// Whether a `==> name <==` header goes before each source
    pub fn show_headers(&self, source_count: usize) -> bool {
        !self.headers_suppressed() && (source_count > 1 || self.headers_forced())
    }
}
