/// Destination for formatted lines.
///
/// The formatter never delivers anything itself; whoever embeds it
/// decides where lines go (file, socket, stdout, a pipeline agent) by
/// implementing this trait. The tracing layer calls `write_line` on the
/// thread that emitted the event, so implementations should be cheap or
/// hand the line off to their own buffer.
pub trait LineSink: Send + Sync {
    /// Deliver one line. `line` already ends with `\n`.
    ///
    /// **Returns**
    /// - `Ok(())` if the line was accepted.
    /// - `Err(..)` if the destination failed. The layer counts the
    ///   failure and moves on; it never retries.
    fn write_line(&self, line: &str) -> Result<(), SinkError>;

    /// Flush anything buffered by the sink.
    ///
    /// Default implementation is a no-op.
    fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Error type returned by [`LineSink`] implementations.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("i/o error writing log line: {0}")]
    Io(#[from] std::io::Error),

    #[error("log sink is closed")]
    Closed,
}
