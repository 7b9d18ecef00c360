//! Size-bounding helpers for structured payloads
//!
//! [`truncate`] replaces oversized strings anywhere in a JSON tree with a
//! short placeholder; [`build_extra`] turns any serializable payload into
//! the single `raw_json` attribute that the console appender shows by
//! default.

use super::log_context::{non_serializable, short_type_name, LogContext};
use serde::Serialize;
use serde_json::Value;

/// Attribute name under which [`build_extra`] stores the encoded payload
pub const RAW_JSON_FIELD: &str = "raw_json";

/// Default string length limit for [`truncate`] and [`build_extra`]
pub const DEFAULT_MAX_LENGTH: usize = 100;

const PLACEHOLDER_PREFIX: &str = "<truncated: ";
const PLACEHOLDER_SUFFIX: &str = " chars>";

fn placeholder(length: usize) -> String {
    format!("{}{}{}", PLACEHOLDER_PREFIX, length, PLACEHOLDER_SUFFIX)
}

/// True only for text [`placeholder`] could have produced
///
/// The count must fit in a `usize`, so an exempt string is never longer
/// than a placeholder for `usize::MAX`.
fn is_placeholder(text: &str) -> bool {
    text.strip_prefix(PLACEHOLDER_PREFIX)
        .and_then(|rest| rest.strip_suffix(PLACEHOLDER_SUFFIX))
        .is_some_and(|digits| {
            digits.bytes().all(|b| b.is_ascii_digit()) && digits.parse::<usize>().is_ok()
        })
}

/// Recursively bound the size of a JSON value
///
/// Strings longer than `max_length` characters become
/// `<truncated: N chars>`. Objects and arrays keep their keys, order and
/// length; every other value is returned unchanged. Placeholders are left
/// alone, so applying `truncate` twice gives the same result as once.
///
/// # Example
///
/// ```
/// use elk_logger::truncate;
/// use serde_json::json;
///
/// let value = json!({"body": "x".repeat(300), "tags": ["a", "b"]});
/// assert_eq!(
///     truncate(&value, 100),
///     json!({"body": "<truncated: 300 chars>", "tags": ["a", "b"]})
/// );
/// ```
pub fn truncate(value: &Value, max_length: usize) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), truncate(item, max_length)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| truncate(item, max_length)).collect())
        }
        Value::String(text) if !is_placeholder(text) => {
            let length = text.chars().count();
            if length > max_length {
                Value::String(placeholder(length))
            } else {
                value.clone()
            }
        }
        _ => value.clone(),
    }
}

/// Encode a payload as the `raw_json` log attribute
///
/// The payload is converted to JSON, truncated with `max_length`, then
/// pretty-printed with two-space indentation. A payload that cannot be
/// serialized is logged as `<non-serializable: TypeName>`.
///
/// # Example
///
/// ```
/// use elk_logger::{build_extra, RAW_JSON_FIELD};
/// use serde_json::json;
///
/// let extra = build_extra(&json!({"user": "a".repeat(500), "id": 7}), 100);
/// assert_eq!(
///     extra.get(RAW_JSON_FIELD).unwrap().to_string(),
///     "{\n  \"user\": \"<truncated: 500 chars>\",\n  \"id\": 7\n}"
/// );
/// ```
pub fn build_extra<T: Serialize + ?Sized>(data: &T, max_length: usize) -> LogContext {
    let value = serde_json::to_value(data)
        .unwrap_or_else(|_| Value::String(non_serializable(&short_type_name::<T>())));
    let truncated = truncate(&value, max_length);
    // Serializing a Value tree with string keys cannot fail
    let text = serde_json::to_string_pretty(&truncated).unwrap_or_else(|_| truncated.to_string());

    LogContext::new().with_field(RAW_JSON_FIELD, text)
}

/// [`build_extra`] with [`DEFAULT_MAX_LENGTH`]
pub fn build_extra_default<T: Serialize + ?Sized>(data: &T) -> LogContext {
    build_extra(data, DEFAULT_MAX_LENGTH)
}
