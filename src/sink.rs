use std::error::Error;
use std::io::{self, Write};
use std::sync::Mutex;

/// Destination for encoded log lines produced by `JsonEventLayer` (`layer`
/// feature).
///
/// Implementations append the bytes they are given to a concrete output
/// (stdout, a file, a socket owned by the caller, ...). The layer calls
/// `write` synchronously on the thread that emitted the event, once per
/// event.
pub trait LogSink: Send + Sync {
    /// Append one encoded line.
    ///
    /// **Parameters**
    /// - `line`: a complete JSON document followed by `\n`, already in the
    ///   layout's charset.
    ///
    /// **Returns**
    /// - `Ok(())` if the line was accepted.
    /// - `Err(..)` if the output failed. The layer reports and counts the
    ///   failure and moves on; it never retries.
    fn write(&self, line: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush anything the sink holds back.
    ///
    /// Default implementation is a no-op.
    fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

/// Sink over any [`io::Write`], serialized by a mutex so concurrent events
/// never interleave within a line.
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        WriterSink {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and return the wrapped writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        WriterSink::new(io::stdout())
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn write(&self, line: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("log writer mutex poisoned"))?;
        writer.write_all(line)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("log writer mutex poisoned"))?;
        writer.flush()?;
        Ok(())
    }
}
