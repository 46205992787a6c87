use thiserror::Error;

/// Failure while tailing a single source
#[derive(Debug, Error)]
pub enum TailError {
    #[error("error reading input: {0}")]
    Read(#[source] std::io::Error),

    #[error("error writing output: {0}")]
    Write(#[source] std::io::Error),

    #[error("operation cancelled")]
    Cancelled,
}

impl TailError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TailError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, TailError>;
