//! Context resolution: shape checks, extra merging and in-band diagnostics.
//!
//! Nothing in here can fail. Every anomaly becomes a [`ContextError`]
//! that ends up under the reserved [`CTX_ERR_KEY`] of the output context.

use serde_json::{json, Map, Value};

use crate::record::{ContextShape, ContextValue};

/// Reserved context key holding the diagnostics of an event.
pub const CTX_ERR_KEY: &str = "ctxErr";

/// Normalization anomaly recorded inside the produced line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    UndefinedLevelName { level_name: String },
    InvalidContextType { type_name: &'static str },
    NotAssociative,
}

impl ContextError {
    pub fn err_msg(&self) -> &'static str {
        match self {
            ContextError::UndefinedLevelName { .. } => "undefined level name",
            ContextError::InvalidContextType { .. } => "invalid context type in log data",
            ContextError::NotAssociative => "context should be an assoc array",
        }
    }

    /// Wire shape: `{"errMsg": ..., <detail fields>}`.
    pub fn to_value(&self) -> Value {
        let err_msg = self.err_msg();
        match self {
            ContextError::UndefinedLevelName { level_name } => {
                json!({ "errMsg": err_msg, "levelName": level_name })
            }
            ContextError::InvalidContextType { type_name } => {
                json!({ "errMsg": err_msg, "type": type_name })
            }
            ContextError::NotAssociative => json!({ "errMsg": err_msg }),
        }
    }
}

/// Turn the caller's context into the keyed object written as `ctx`.
///
/// Scalars are discarded, lists keep their entries under their index and
/// skip the merge, mappings get `extra` merged in underneath them.
/// Dispatch follows what the value holds, not the variant it was built
/// as: an empty list is an empty mapping, a wrapped object is a mapping.
pub fn resolve_context(
    context: &ContextValue,
    extra: &Map<String, Value>,
    diagnostics: &mut Vec<ContextError>,
) -> Map<String, Value> {
    match context.shape() {
        ContextShape::Other(type_name) => {
            tracing::debug!(type_name, "discarding non-collection log context");
            diagnostics.push(ContextError::InvalidContextType { type_name });
            Map::new()
        }
        ContextShape::Positional(items) => {
            tracing::debug!(len = items.len(), "log context is positional, skipping extra merge");
            diagnostics.push(ContextError::NotAssociative);
            items
                .iter()
                .enumerate()
                .map(|(idx, value)| (idx.to_string(), value.clone()))
                .collect()
        }
        ContextShape::Keyed(Some(map)) => merge_extra(map, extra),
        ContextShape::Keyed(None) => extra.clone(),
    }
}

/// Extra keys first, context laid over them. A context key keeps the
/// position its extra namesake had, and its own value.
fn merge_extra(context: &Map<String, Value>, extra: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = extra.clone();
    for (key, value) in context {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Append the collected diagnostics as the last key of `ctx`.
///
/// A `ctxErr` the caller put into context or extra is dropped when there
/// is anything to report, so it can never shadow a diagnostic.
pub fn inject_diagnostics(ctx: &mut Map<String, Value>, diagnostics: &[ContextError]) {
    if diagnostics.is_empty() {
        return;
    }
    if ctx.contains_key(CTX_ERR_KEY) {
        tracing::debug!("caller supplied {CTX_ERR_KEY} replaced by formatter diagnostics");
        ctx.retain(|key, _| key != CTX_ERR_KEY);
    }
    let entries = diagnostics.iter().map(ContextError::to_value).collect();
    ctx.insert(CTX_ERR_KEY.to_string(), Value::Array(entries));
}
