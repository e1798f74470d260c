use crate::sink::{LineSink, SinkError};
use std::sync::{Arc, Mutex};

/// Collects lines in memory.
///
/// Clones share the same buffer, so one handle can be given to the layer
/// while another is kept for inspection.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Remove and return every line written so far.
    pub fn take(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|mut lines| std::mem::take(&mut *lines))
            .unwrap_or_default()
    }
}

impl LineSink for MemorySink {
    fn write_line(&self, line: &str) -> Result<(), SinkError> {
        let mut lines = self.lines.lock().map_err(|_| SinkError::Closed)?;
        lines.push(line.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_buffer() {
        let sink = MemorySink::new();
        let handle = sink.clone();

        sink.write_line("a\n").unwrap();
        sink.write_line("b\n").unwrap();

        assert_eq!(handle.lines(), vec!["a\n", "b\n"]);
        assert_eq!(handle.take().len(), 2);
        assert!(sink.lines().is_empty());
    }
}
