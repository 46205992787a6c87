use std::fmt;
use std::io::{Read, Write};

use tokio_util::sync::CancellationToken;

use super::config::TailConfig;
use super::error::{Result, TailError};
use super::processor::StreamProcessor;

/// A named input handed over by the caller.
pub struct Source {
    pub name: String,
    reader: Box<dyn Read + Send>,
}

impl Source {
    pub fn new(name: impl Into<String>, reader: impl Read + Send + 'static) -> Self {
        Self {
            name: name.into(),
            reader: Box::new(reader),
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source").field("name", &self.name).finish()
    }
}

#[derive(Debug)]
pub struct SourceFailure {
    pub name: String,
    pub error: TailError,
}

/// Outcome of tailing a batch of sources
#[derive(Debug, Default)]
pub struct TailReport {
    pub processed: usize,
    pub failures: Vec<SourceFailure>,
}

impl TailReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn was_cancelled(&self) -> bool {
        self.failures.iter().any(|f| f.error.is_cancelled())
    }
}

/// Tails each source in turn into one sink.
pub struct MultiTail<'a> {
    config: &'a TailConfig,
    show_headers: bool,
    cancel: &'a CancellationToken,
}

impl<'a> MultiTail<'a> {
    pub fn new(config: &'a TailConfig, show_headers: bool, cancel: &'a CancellationToken) -> Self {
        Self {
            config,
            show_headers,
            cancel,
        }
    }

    /// Process every source in order.
    ///
    /// A read or write failure is recorded and the next source is tried.
    /// Cancellation is recorded and ends the batch.
    pub fn run<I, W>(&self, sources: I, output: &mut W) -> TailReport
    where
        I: IntoIterator<Item = Source>,
        W: Write + ?Sized,
    {
        let processor = StreamProcessor::new(self.config, self.cancel);
        if self.config.follow || self.config.follow_retry || self.config.start_from_line > 0 {
            tracing::debug!(
                follow = self.config.follow,
                follow_retry = self.config.follow_retry,
                start_from_line = self.config.start_from_line,
                "Ignoring unsupported follow options"
            );
        }

        let mut report = TailReport::default();
        for (index, source) in sources.into_iter().enumerate() {
            let Source { name, reader } = source;
            tracing::debug!(source = %name, mode = ?self.config.mode(), "Tailing source");

            match self.tail_one(&processor, index, &name, reader, output) {
                Ok(()) => report.processed += 1,
                Err(error) => {
                    let cancelled = error.is_cancelled();
                    tracing::warn!(source = %name, error = %error, "Failed to tail source");
                    report.failures.push(SourceFailure { name, error });
                    if cancelled {
                        break;
                    }
                }
            }
        }
        report
    }

    fn tail_one<W>(
        &self,
        processor: &StreamProcessor<'_>,
        index: usize,
        name: &str,
        reader: Box<dyn Read + Send>,
        output: &mut W,
    ) -> Result<()>
    where
        W: Write + ?Sized,
    {
        if self.cancel.is_cancelled() {
            return Err(TailError::Cancelled);
        }
        if index > 0 {
            output.write_all(b"\n").map_err(TailError::Write)?;
        }
        if self.show_headers {
            write_header(output, name)?;
        }
        processor.process(reader, output)?;
        output.flush().map_err(TailError::Write)
    }
}

fn write_header<W: Write + ?Sized>(output: &mut W, name: &str) -> Result<()> {
    writeln!(output, "==> {} <==", name).map_err(TailError::Write)
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use super::*;

    fn source(name: &str, data: &str) -> Source {
        Source::new(name, Cursor::new(data.as_bytes().to_vec()))
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    /// Cancels the token once it has been read from
    struct CancelOnRead(CancellationToken);

    impl Read for CancelOnRead {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.cancel();
            buf[0] = b'\n';
            Ok(1)
        }
    }

    #[test]
    fn test_two_sources_with_headers() {
        let config = TailConfig::new().with_lines(2);
        let cancel = CancellationToken::new();
        let mut out = Vec::new();

        let report = MultiTail::new(&config, true, &cancel)
            .run(vec![source("a.txt", "1\n2\n3\n"), source("b.txt", "x\ny\n")], &mut out);

        assert!(report.is_success());
        assert_eq!(report.processed, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "==> a.txt <==\n2\n3\n\n==> b.txt <==\nx\ny\n"
        );
    }

    #[test]
    fn test_headers_off() {
        let config = TailConfig::new().with_lines(1);
        let cancel = CancellationToken::new();
        let mut out = Vec::new();

        MultiTail::new(&config, false, &cancel)
            .run(vec![source("a", "1\n2\n"), source("b", "3\n4\n")], &mut out);

        assert_eq!(String::from_utf8(out).unwrap(), "2\n\n4\n");
    }

    #[test]
    fn test_single_source_header() {
        let config = TailConfig::new();
        let cancel = CancellationToken::new();
        let mut out = Vec::new();

        MultiTail::new(&config, true, &cancel).run(vec![source("only", "")], &mut out);

        assert_eq!(String::from_utf8(out).unwrap(), "==> only <==\n");
    }

    #[test]
    fn test_read_failure_continues() {
        let config = TailConfig::new();
        let cancel = CancellationToken::new();
        let mut out = Vec::new();

        let report = MultiTail::new(&config, true, &cancel).run(
            vec![
                Source::new("bad", FailingReader),
                source("good", "fine\n"),
            ],
            &mut out,
        );

        assert!(!report.is_success());
        assert!(!report.was_cancelled());
        assert_eq!(report.processed, 1);
        let failure = &report.failures[0];
        assert_eq!(failure.name, "bad");
        assert!(matches!(failure.error, TailError::Read(_)));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "==> bad <==\n\n==> good <==\nfine\n"
        );
    }

    #[test]
    fn test_cancellation_stops_batch() {
        let config = TailConfig::new();
        let cancel = CancellationToken::new();
        let mut out = Vec::new();

        let report = MultiTail::new(&config, true, &cancel).run(
            vec![
                source("first", "1\n"),
                Source::new("second", CancelOnRead(cancel.clone())),
                source("third", "3\n"),
            ],
            &mut out,
        );

        assert!(report.was_cancelled());
        assert_eq!(report.processed, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "second");
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "==> first <==\n1\n\n==> second <==\n"
        );
    }

    #[test]
    fn test_cancelled_before_run() {
        let config = TailConfig::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut out = Vec::new();

        let report = MultiTail::new(&config, true, &cancel)
            .run(vec![source("a", "1\n"), source("b", "2\n")], &mut out);

        assert!(report.was_cancelled());
        assert_eq!(report.failures.len(), 1);
        assert!(out.is_empty());
    }

    #[test]
    fn test_byte_mode_across_sources() {
        let config = TailConfig::new().with_bytes(3);
        let cancel = CancellationToken::new();
        let mut out = Vec::new();

        let report = MultiTail::new(&config, true, &cancel)
            .run(vec![source("a", "abcdef"), source("b", "xy")], &mut out);

        assert!(report.is_success());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "==> a <==\ndef\n==> b <==\nxy"
        );
    }
}
