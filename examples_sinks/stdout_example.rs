use std::io::Write;
use std::sync::Arc;

use applog_formatter::{
    env::config_from_env,
    init::init_tracing,
    sink::{LineSink, SinkError},
    LogLineFormatter,
};
use tracing::{error, info};

/// Example of a caller-owned destination. The formatter only produces
/// lines; this sink decides they go to stdout.
struct StdoutSink;

impl LineSink for StdoutSink {
    fn write_line(&self, line: &str) -> Result<(), SinkError> {
        let mut out = std::io::stdout().lock();
        out.write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<(), SinkError> {
        std::io::stdout().flush()?;
        Ok(())
    }
}

fn main() {
    let sink: Arc<dyn LineSink> = Arc::new(StdoutSink);
    // APPLOG_SERVICE / APPLOG_ENV describe the service; fall back for a bare run.
    let formatter = match config_from_env() {
        Ok(config) => LogLineFormatter::new(config),
        Err(e) => {
            eprintln!("{}, using example defaults", e);
            LogLineFormatter::with_service("example.server", "dev")
        }
    };

    if let Err(e) = init_tracing(formatter, Arc::clone(&sink)) {
        eprintln!("{}", e);
        return;
    }

    info!(user_id = 7, "stdout sink example started");
    error!(db = "orders", "simulated failure");

    let _ = sink.flush();
}
