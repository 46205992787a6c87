use std::fs::File;

use thiserror::Error;

use crate::tail::Source;

/// Display name used for standard input
pub const STDIN_NAME: &str = "standard input";

#[derive(Debug, Error)]
#[error("cannot open '{name}' for reading: {source}")]
pub struct OpenError {
    pub name: String,
    #[source]
    pub source: std::io::Error,
}

/// Opens named inputs one at a time as they are consumed.
///
/// `-` reads standard input. Files that can't be opened are skipped and
/// kept for reporting; each one is announced on stderr as it is reached so
/// diagnostics line up with the surrounding output.
pub struct Inputs {
    names: std::vec::IntoIter<String>,
    failures: Vec<OpenError>,
}

impl Inputs {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names: names.into_iter(),
            failures: Vec::new(),
        }
    }

    pub fn into_failures(self) -> Vec<OpenError> {
        self.failures
    }
}

impl Iterator for Inputs {
    type Item = Source;

    fn next(&mut self) -> Option<Source> {
        for name in self.names.by_ref() {
            match open(&name) {
                Ok(source) => return Some(source),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping input");
                    eprintln!("{}: {}", env!("CARGO_PKG_NAME"), e);
                    self.failures.push(e);
                }
            }
        }
        None
    }
}

/// Open a single named input
pub fn open(name: &str) -> Result<Source, OpenError> {
    if name == "-" {
        return Ok(Source::new(STDIN_NAME, std::io::stdin()));
    }
    let file = File::open(name).map_err(|source| OpenError {
        name: name.to_string(),
        source,
    })?;
    Ok(Source::new(name, file))
}
