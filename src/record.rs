use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use crate::level::Level;

/// Context payload as handed over by the caller.
///
/// The logging call does not guarantee a keyed mapping, so the three
/// shapes the formatter distinguishes are made explicit here.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    /// Key-value mapping, including the empty one.
    Map(Map<String, Value>),
    /// Positional collection. An empty one is formatted as an empty mapping.
    List(Vec<Value>),
    /// Anything else. A wrapped array or object is formatted by what it holds.
    Scalar(Value),
}

impl ContextValue {
    /// Lowercase name of the runtime type, as reported in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ContextValue::Map(_) | ContextValue::List(_) => "array",
            ContextValue::Scalar(value) => match value {
                Value::Null => "null",
                Value::Bool(_) => "boolean",
                Value::Number(n) if n.is_f64() => "double",
                Value::Number(_) => "integer",
                Value::String(_) => "string",
                Value::Array(_) | Value::Object(_) => "array",
            },
        }
    }
}

/// How a context is treated, whichever variant it was built as.
pub(crate) enum ContextShape<'a> {
    /// A mapping; `None` for an empty collection of either kind.
    Keyed(Option<&'a Map<String, Value>>),
    /// A non-empty positional collection.
    Positional(&'a [Value]),
    /// Not a collection; carries the runtime type name.
    Other(&'static str),
}

impl ContextValue {
    pub(crate) fn shape(&self) -> ContextShape<'_> {
        let value = match self {
            ContextValue::Map(map) => return ContextShape::Keyed(Some(map)),
            ContextValue::List(items) => return positional(items),
            ContextValue::Scalar(value) => value,
        };
        match value {
            Value::Object(map) => ContextShape::Keyed(Some(map)),
            Value::Array(items) => positional(items),
            _ => ContextShape::Other(self.type_name()),
        }
    }
}

fn positional(items: &[Value]) -> ContextShape<'_> {
    if items.is_empty() {
        ContextShape::Keyed(None)
    } else {
        ContextShape::Positional(items)
    }
}

impl Default for ContextValue {
    fn default() -> Self {
        ContextValue::Map(Map::new())
    }
}

impl From<Value> for ContextValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => ContextValue::Map(map),
            // An empty array carries no keys either way; treat it as a mapping.
            Value::Array(items) if items.is_empty() => ContextValue::Map(Map::new()),
            Value::Array(items) => ContextValue::List(items),
            other => ContextValue::Scalar(other),
        }
    }
}

impl From<Map<String, Value>> for ContextValue {
    fn from(map: Map<String, Value>) -> Self {
        ContextValue::Map(map)
    }
}

/// A single log event as produced by the logging call site.
///
/// Only `message`, `channel` and `datetime` are trusted as-is; the level
/// name and context are validated by the formatter.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub message: String,
    pub level_name: String,
    /// Numeric severity. Not used for formatting.
    pub level: u16,
    pub channel: String,
    pub datetime: DateTime<FixedOffset>,
    pub context: ContextValue,
    pub extra: Map<String, Value>,
}

impl RawEvent {
    pub fn new(
        message: impl Into<String>,
        level_name: impl Into<String>,
        channel: impl Into<String>,
        datetime: DateTime<FixedOffset>,
    ) -> Self {
        let level_name = level_name.into();
        let level = level_name
            .parse::<Level>()
            .map(Level::number)
            .unwrap_or_default();
        RawEvent {
            message: message.into(),
            level_name,
            level,
            channel: channel.into(),
            datetime,
            context: ContextValue::default(),
            extra: Map::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<ContextValue>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_extra(mut self, extra: Map<String, Value>) -> Self {
        self.extra = extra;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-05-01T10:00:00.5+02:00").unwrap()
    }

    #[test]
    fn context_shapes_from_json() {
        assert!(matches!(ContextValue::from(json!({"a": 1})), ContextValue::Map(_)));
        assert!(matches!(ContextValue::from(json!(["abc"])), ContextValue::List(_)));
        assert_eq!(ContextValue::from(json!([])), ContextValue::Map(Map::new()));
        assert!(matches!(ContextValue::from(json!("x")), ContextValue::Scalar(_)));
    }

    #[test]
    fn scalar_type_names() {
        assert_eq!(ContextValue::from(json!("x")).type_name(), "string");
        assert_eq!(ContextValue::from(json!(3)).type_name(), "integer");
        assert_eq!(ContextValue::from(json!(3.5)).type_name(), "double");
        assert_eq!(ContextValue::from(json!(true)).type_name(), "boolean");
        assert_eq!(ContextValue::from(Value::Null).type_name(), "null");
    }

    #[test]
    fn level_number_follows_name() {
        assert_eq!(RawEvent::new("m", "INFO", "c", ts()).level, 200);
        assert_eq!(RawEvent::new("m", "nope", "c", ts()).level, 0);
    }
}
