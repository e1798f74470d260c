use serde::Serialize;
use serde_json::{Map, Value};

use crate::context::{inject_diagnostics, resolve_context, ContextError};
use crate::level::Level;
use crate::record::RawEvent;

/// Version of the line layout, written verbatim as the `schema` field.
pub const SCHEMA: u32 = 1;

/// `YYYY-MM-DDThh:mm:ss.ffffff±hh:mm`
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

/// Values stamped onto every line, fixed for the formatter's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterConfig {
    pub service: String,
    pub environment: String,
}

impl FormatterConfig {
    pub fn new(service: impl Into<String>, environment: impl Into<String>) -> Self {
        FormatterConfig {
            service: service.into(),
            environment: environment.into(),
        }
    }
}

/// One output line before serialization.
///
/// Field declaration order is the wire order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedLine {
    pub schema: u32,
    pub t: String,
    pub l: &'static str,
    pub s: String,
    pub c: String,
    pub e: String,
    pub m: String,
    pub ctx: Map<String, Value>,
}

/// Formats [`RawEvent`]s into newline-terminated JSON lines.
///
/// Formatting is total: a malformed level name or context never turns
/// into an error for the caller, it is reported under `ctx.ctxErr`
/// instead. The formatter holds no mutable state and can be shared
/// freely between threads.
#[derive(Debug, Clone)]
pub struct LogLineFormatter {
    config: FormatterConfig,
}

impl LogLineFormatter {
    pub fn new(config: FormatterConfig) -> Self {
        LogLineFormatter { config }
    }

    pub fn with_service(service: impl Into<String>, environment: impl Into<String>) -> Self {
        Self::new(FormatterConfig::new(service, environment))
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// Assemble the output object for `event`.
    pub fn format_record(&self, event: &RawEvent) -> FormattedLine {
        let mut diagnostics = Vec::new();
        let level = resolve_level(&event.level_name);

        let mut ctx = resolve_context(&event.context, &event.extra, &mut diagnostics);
        // A context that was already rejected carries only its own diagnostic.
        if let Err(unknown) = &level {
            if diagnostics.is_empty() {
                diagnostics.push(ContextError::UndefinedLevelName {
                    level_name: unknown.0.clone(),
                });
            }
        }
        inject_diagnostics(&mut ctx, &diagnostics);

        FormattedLine {
            schema: SCHEMA,
            t: event.datetime.format(TIME_FORMAT).to_string(),
            l: level.unwrap_or(Level::Warning).as_str(),
            s: self.config.service.clone(),
            c: event.channel.clone(),
            e: self.config.environment.clone(),
            m: event.message.clone(),
            ctx,
        }
    }

    /// Format a single event as one JSON line, `\n` included.
    pub fn format(&self, event: &RawEvent) -> String {
        encode_line(self.format_record(event))
    }

    /// Format several events into consecutive lines.
    pub fn format_batch(&self, events: &[RawEvent]) -> String {
        events.iter().map(|event| self.format(event)).collect()
    }
}

fn resolve_level(name: &str) -> Result<Level, crate::level::UnknownLevel> {
    name.parse::<Level>().map_err(|err| {
        tracing::debug!(level_name = %err.0, "unknown level name, degrading to warning");
        err
    })
}

fn encode_line(line: FormattedLine) -> String {
    serde_json::to_string(&line).unwrap_or_else(|err| {
        tracing::error!(error = %err, "failed to encode log line");
        "{}".to_string()
    }) + "\n"
}
