use crate::formatter::LogLineFormatter;
use crate::level::Level;
use crate::record::{ContextValue, RawEvent};
use crate::sink::LineSink;
use chrono::Local;
use serde_json::{Map, Value};
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Events from this crate never reach the sink, otherwise the
/// formatter's own debug output would loop back through the layer.
const OWN_TARGET: &str = "applog_formatter";

fn is_own_target(target: &str) -> bool {
    target
        .strip_prefix(OWN_TARGET)
        .map_or(false, |rest| rest.is_empty() || rest.starts_with("::"))
}

/// `tracing_subscriber` layer that turns events into [`RawEvent`]s,
/// formats them with a [`LogLineFormatter`] and hands the resulting line
/// to a [`LineSink`].
///
/// Formatting and delivery happen inline on the emitting thread. Sink
/// failures are counted and otherwise ignored so that logging can never
/// fail the application. The layer forwards every event it sees; narrow
/// it with a per-layer filter such as
/// `layer.with_filter(LevelFilter::INFO)`.
pub struct AppLogLayer {
    formatter: LogLineFormatter,
    sink: Arc<dyn LineSink>,
    /// Total events seen by the layer, including skipped ones.
    pub total_events: Arc<AtomicU64>,
    /// Lines accepted by the sink.
    pub written_lines: Arc<AtomicU64>,
    /// Lines the sink rejected.
    pub failed_lines: Arc<AtomicU64>,
}

impl AppLogLayer {
    /// Create a layer forwarding every event to `sink`.
    pub fn new(formatter: LogLineFormatter, sink: Arc<dyn LineSink>) -> Self {
        Self {
            formatter,
            sink,
            total_events: Arc::new(AtomicU64::new(0)),
            written_lines: Arc::new(AtomicU64::new(0)),
            failed_lines: Arc::new(AtomicU64::new(0)),
        }
    }

    fn to_raw_event(&self, event: &Event<'_>) -> RawEvent {
        let mut fields = Map::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor { fields: &mut fields, message: &mut message };
        event.record(&mut visitor);

        let meta = event.metadata();
        let mut extra = Map::new();
        if let Some(module_path) = meta.module_path() {
            extra.insert("module_path".to_string(), Value::from(module_path));
        }
        if let Some(file) = meta.file() {
            extra.insert("file".to_string(), Value::from(file));
        }
        if let Some(line) = meta.line() {
            extra.insert("line".to_string(), Value::from(line));
        }

        let level = Level::from(*meta.level());
        RawEvent::new(
            message.unwrap_or_default(),
            level.as_str(),
            meta.target(),
            Local::now().fixed_offset(),
        )
        .with_context(ContextValue::Map(fields))
        .with_extra(extra)
    }
}

impl<S> Layer<S> for AppLogLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        if is_own_target(event.metadata().target()) {
            return;
        }

        let line = self.formatter.format(&self.to_raw_event(event));
        match self.sink.write_line(&line) {
            Ok(()) => {
                self.written_lines.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed_lines.fetch_add(1, Ordering::Relaxed);
                eprintln!("log sink rejected line: {}", e);
            }
        }
    }
}

pub struct FieldVisitor<'a> {
    pub fields: &'a mut Map<String, Value>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // NaN and infinities have no JSON number form.
        let value = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(value.to_string()));
        self.fields.insert(field.name().to_string(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), Value::String(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_sink::MemorySink;
    use crate::sink::SinkError;
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    struct BrokenSink;

    impl LineSink for BrokenSink {
        fn write_line(&self, _line: &str) -> Result<(), SinkError> {
            Err(SinkError::Closed)
        }
    }

    fn parse(line: &str) -> Value {
        serde_json::from_str(line.trim_end()).unwrap()
    }

    #[test]
    fn events_become_lines() {
        let sink = MemorySink::new();
        let layer = AppLogLayer::new(
            LogLineFormatter::with_service("svc", "dev"),
            Arc::new(sink.clone()),
        );
        let subscriber = Registry::default().with(layer.with_filter(LevelFilter::INFO));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "orders", order_id = 42, ratio = 0.5, "order stuck");
            tracing::debug!(target: "orders", "filtered out");
        });

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        let line = parse(&lines[0]);
        assert_eq!(line["l"], "warning");
        assert_eq!(line["s"], "svc");
        assert_eq!(line["e"], "dev");
        assert_eq!(line["c"], "orders");
        assert_eq!(line["m"], "order stuck");
        assert_eq!(line["ctx"]["order_id"], 42);
        assert_eq!(line["ctx"]["ratio"], 0.5);
        assert!(line["ctx"]["module_path"].is_string());
    }

    #[test]
    fn own_events_are_skipped() {
        let sink = MemorySink::new();
        let layer = AppLogLayer::new(
            LogLineFormatter::with_service("svc", "dev"),
            Arc::new(sink.clone()),
        );
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(target: "applog_formatter::context", "internal");
        });

        assert!(sink.lines().is_empty());
    }

    #[test]
    fn own_target_matches_crate_paths_only() {
        assert!(is_own_target("applog_formatter"));
        assert!(is_own_target("applog_formatter::formatter"));
        assert!(!is_own_target("applog_formatter_ext"));
        assert!(!is_own_target("applog_formatter_ext::sink"));
        assert!(!is_own_target("orders"));
    }

    #[test]
    fn similarly_named_crates_still_reach_the_sink() {
        let sink = MemorySink::new();
        let layer = AppLogLayer::new(
            LogLineFormatter::with_service("svc", "dev"),
            Arc::new(sink.clone()),
        );
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!(target: "applog_formatter_ext", "from a neighbour crate");
        });

        assert_eq!(sink.lines().len(), 1);
    }

    #[test]
    fn every_level_is_forwarded_without_a_filter() {
        let sink = MemorySink::new();
        let layer = AppLogLayer::new(
            LogLineFormatter::with_service("svc", "dev"),
            Arc::new(sink.clone()),
        );
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::trace!(target: "orders", "lowest");
            tracing::error!(target: "orders", "highest");
        });

        let levels: Vec<String> = sink
            .lines()
            .iter()
            .map(|line| parse(line)["l"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(levels, vec!["debug", "error"]);
    }

    #[test]
    fn sink_failures_are_counted() {
        let layer = AppLogLayer::new(
            LogLineFormatter::with_service("svc", "dev"),
            Arc::new(BrokenSink),
        );
        let failed = Arc::clone(&layer.failed_lines);
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(target: "app", "boom");
        });

        assert_eq!(failed.load(Ordering::Relaxed), 1);
    }
}
