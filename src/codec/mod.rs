//! Canonical query-string codec.
//!
//! ## Wire Format
//!
//! Nested values are flattened into form-encoded `key=value` pairs joined
//! by `&`, using bracket path notation:
//! ```text
//! account[account_code]=123&items[]=a&items[]=b&timestamp=1329942896
//! ```
//! Mapping entries are sorted by their rendered text, sequence elements keep
//! their order.

mod decode;
mod encode;
mod path;

pub use decode::decode;
pub use encode::encode;
pub use path::{KeyPath, Segment};

/// Form-encode one key component or value.
pub(crate) fn escape(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

/// Reverse of [`escape`]. Invalid UTF-8 is replaced rather than rejected.
pub(crate) fn unescape(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_encoding::percent_decode_str(&spaced)
        .decode_utf8_lossy()
        .into_owned()
}
