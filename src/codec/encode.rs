//! Canonical encoder.

use crate::error::EncodeErrorKind;
use crate::value::Value;

use super::escape;

/// Encode a value into its canonical query string.
///
/// The top-level value is expected to be a mapping. An empty mapping or
/// sequence encodes to the empty string; a scalar or a non-empty sequence at
/// the top has no key to live under and is rejected. Empty mapping keys are
/// rejected as well: they would decode as a dropped fragment or as `[]`.
///
/// # Examples
///
/// ```
/// use signed_params::{codec, Value};
///
/// let value = Value::from(serde_json::json!({
///     "transaction": {"currency": "USD", "amount_in_cents": 5000},
///     "account": {"account_code": "123"},
/// }));
/// assert_eq!(
///     codec::encode(&value).unwrap(),
///     "account[account_code]=123&transaction[amount_in_cents]=5000&transaction[currency]=USD"
/// );
/// ```
pub fn encode(value: &Value) -> Result<String, EncodeErrorKind> {
    encode_under(value, None)
}

/// Encode `value` under an already escaped key path.
fn encode_under(value: &Value, key: Option<&str>) -> Result<String, EncodeErrorKind> {
    match value {
        Value::Mapping(map) => {
            let mut chunks = map
                .iter()
                .map(|(name, child)| {
                    if name.is_empty() {
                        return Err(EncodeErrorKind::EmptyKey {
                            parent: key.unwrap_or_default().to_string(),
                        });
                    }
                    let name = escape(name);
                    let path = match key {
                        Some(parent) => format!("{}[{}]", parent, name),
                        None => name,
                    };
                    encode_under(child, Some(&path))
                })
                .collect::<Result<Vec<_>, _>>()?;

            // Sorting whole chunks keeps each entry's fragments together.
            chunks.retain(|chunk| !chunk.is_empty());
            chunks.sort_unstable();
            Ok(chunks.join("&"))
        }
        Value::Sequence(items) => {
            if items.is_empty() {
                return Ok(String::new());
            }
            let key = key.ok_or(EncodeErrorKind::UnkeyedValue)?;
            let path = format!("{}[]", key);

            let mut chunks = items
                .iter()
                .map(|item| encode_under(item, Some(&path)))
                .collect::<Result<Vec<_>, _>>()?;
            chunks.retain(|chunk| !chunk.is_empty());
            Ok(chunks.join("&"))
        }
        Value::Scalar(text) => {
            let key = key.ok_or(EncodeErrorKind::UnkeyedValue)?;
            Ok(format!("{}={}", key, escape(text)))
        }
    }
}
