//! Structural checks for values which arrive without a static type,
//! such as actions read off a wire.

use serde_json::Value;

/// Returns `true` if `value` is an ordinary keyed record.
///
/// Arrays, `null` and primitives are not plain records. The check is
/// structural: a value which crossed a serialization boundary only
/// keeps its shape, never its nominal type.
pub fn is_plain_record(value: &Value) -> bool {
    matches!(value, Value::Object(_))
}

/// The kind of a value, as reported in error messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
