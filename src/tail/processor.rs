use std::io::{BufRead, BufReader, Read, Write};

use tokio_util::sync::CancellationToken;

use super::config::{TailConfig, TailMode, WindowStrategy};
use super::error::{Result, TailError};
use super::selector::{tail_slice, window, TailRing};

/// Tails a single source into a sink according to a [`TailConfig`].
pub struct StreamProcessor<'a> {
    mode: TailMode,
    strategy: WindowStrategy,
    cancel: &'a CancellationToken,
}

impl<'a> StreamProcessor<'a> {
    pub fn new(config: &TailConfig, cancel: &'a CancellationToken) -> Self {
        Self {
            mode: config.mode(),
            strategy: config.strategy,
            cancel,
        }
    }

    /// Read `reader` to the end and write its trailing window to `output`.
    ///
    /// Nothing is written if the read fails or is cancelled.
    pub fn process<R, W>(&self, reader: R, output: &mut W) -> Result<()>
    where
        R: Read,
        W: Write + ?Sized,
    {
        match self.mode {
            TailMode::Lines(count) => self.process_lines(to_count(count), reader, output),
            TailMode::Bytes(count) => self.process_bytes(to_count(count), reader, output),
        }
    }

    fn process_lines<R, W>(&self, count: usize, reader: R, output: &mut W) -> Result<()>
    where
        R: Read,
        W: Write + ?Sized,
    {
        let lines = match self.strategy {
            WindowStrategy::Ring => {
                let mut ring = TailRing::with_capacity(count);
                self.scan_lines(reader, |line| ring.push(line))?;
                let seen = ring.seen();
                let kept = ring.into_vec();
                tracing::debug!(seen, kept = kept.len(), "Line window filled");
                kept
            }
            WindowStrategy::Materialize => {
                let mut all = Vec::new();
                self.scan_lines(reader, |line| all.push(line))?;
                let start = window(all.len(), count).start;
                tracing::debug!(seen = all.len(), kept = all.len() - start, "Lines buffered");
                all.split_off(start)
            }
        };

        for line in &lines {
            output.write_all(line).map_err(TailError::Write)?;
            output.write_all(b"\n").map_err(TailError::Write)?;
        }
        Ok(())
    }

    /// Feed every line of `reader` to `sink`, polling for cancellation
    /// before each read.
    fn scan_lines<R, F>(&self, reader: R, mut sink: F) -> Result<()>
    where
        R: Read,
        F: FnMut(Vec<u8>),
    {
        let mut reader = BufReader::new(reader);
        loop {
            self.check_cancelled()?;

            let mut line = Vec::new();
            let read = reader
                .read_until(b'\n', &mut line)
                .map_err(TailError::Read)?;
            if read == 0 {
                return Ok(());
            }
            strip_line_ending(&mut line);
            sink(line);
        }
    }

    fn process_bytes<R, W>(&self, count: usize, mut reader: R, output: &mut W) -> Result<()>
    where
        R: Read,
        W: Write + ?Sized,
    {
        // Bulk reads are not interruptible, so this is the only check
        self.check_cancelled()?;

        let mut data = Vec::new();
        reader.read_to_end(&mut data).map_err(TailError::Read)?;

        let tail = tail_slice(&data, count);
        tracing::debug!(total = data.len(), kept = tail.len(), "Byte window selected");
        output.write_all(tail).map_err(TailError::Write)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(TailError::Cancelled);
        }
        Ok(())
    }
}

/// Drop the trailing `\n` or `\r\n` from a raw line
fn strip_line_ending(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
}

fn to_count(count: u64) -> usize {
    usize::try_from(count).unwrap_or(usize::MAX)
}
