use std::io::{self, Write};

use crate::runtime::runtime_error::RuntimeError;

/// Destination for values printed by `yap`.
pub trait OutputSink {
    fn emit(&mut self, value: i64) -> Result<(), RuntimeError>;
}

/// Writes one decimal value per line to any writer.
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn emit(&mut self, value: i64) -> Result<(), RuntimeError> {
        writeln!(self.writer, "{}", value)?;
        Ok(())
    }
}

/// Standard output, flushed after every value so output interleaves
/// correctly with diagnostics on stderr.
pub struct StdoutSink {
    out: io::Stdout,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for StdoutSink {
    fn emit(&mut self, value: i64) -> Result<(), RuntimeError> {
        let mut lock = self.out.lock();
        writeln!(lock, "{}", value)?;
        lock.flush()?;
        Ok(())
    }
}

/// Collects values in memory.
#[derive(Debug, Default)]
pub struct CaptureSink {
    pub values: Vec<i64>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for CaptureSink {
    fn emit(&mut self, value: i64) -> Result<(), RuntimeError> {
        self.values.push(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_sink_one_value_per_line() {
        let mut sink = WriterSink::new(Vec::new());
        sink.emit(1).unwrap();
        sink.emit(-20).unwrap();
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "1\n-20\n");
    }

    #[test]
    fn test_capture_sink() {
        let mut sink = CaptureSink::new();
        sink.emit(3).unwrap();
        sink.emit(4).unwrap();
        assert_eq!(sink.values, vec![3, 4]);
    }

    #[test]
    fn test_write_failure_is_output_error() {
        let mut sink = WriterSink::new(BrokenWriter);
        assert!(matches!(sink.emit(1), Err(RuntimeError::Output(_))));
    }
}
