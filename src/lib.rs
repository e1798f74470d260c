//! Formats loosely-typed log events into schema-versioned JSON lines.
//!
//! ```
//! use applog_formatter::{LogLineFormatter, RawEvent};
//! use chrono::DateTime;
//!
//! let formatter = LogLineFormatter::with_service("billing.api", "prod");
//! let at = DateTime::parse_from_rfc3339("2024-01-02T03:04:05.123456+01:00").unwrap();
//! let line = formatter.format(&RawEvent::new("charged", "INFO", "payments", at));
//! assert!(line.ends_with("\"ctx\":{}}\n"));
//! ```

pub mod level;
pub mod record;
pub mod context;
pub mod formatter;
pub mod sink;
pub mod env;

#[cfg(feature = "layer")]
pub mod layer;
#[cfg(feature = "layer")]
pub mod init;

pub mod noop_sink;
pub mod memory_sink;

pub use context::{ContextError, CTX_ERR_KEY};
pub use formatter::{FormattedLine, FormatterConfig, LogLineFormatter, SCHEMA};
pub use level::{Level, UnknownLevel};
pub use record::{ContextValue, RawEvent};
