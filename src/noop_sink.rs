use crate::sink::{LineSink, SinkError};

/// A sink that simply drops all lines.
///
/// Useful for measuring the overhead of formatting without any I/O.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl LineSink for NoopSink {
    fn write_line(&self, _line: &str) -> Result<(), SinkError> {
        Ok(())
    }
}
