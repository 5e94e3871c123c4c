use crate::sink::LogSink;
use std::error::Error;

/// A sink that simply drops all lines.
///
/// Useful for measuring the cost of encoding without any output, and for
/// tests that only look at the layer's counters.
#[derive(Clone, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn write(&self, _line: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
