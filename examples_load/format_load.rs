use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use applog_formatter::init::init_tracing;
use applog_formatter::noop_sink::NoopSink;
use applog_formatter::LogLineFormatter;

fn main() {
    let formatter = LogLineFormatter::with_service("load.test", "dev");
    if let Err(e) = init_tracing(formatter, Arc::new(NoopSink)) {
        eprintln!("{}", e);
        return;
    }

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        warn!(iteration = i, user = "alice", "format load test");
    }

    let elapsed = start.elapsed();
    println!("formatted {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
