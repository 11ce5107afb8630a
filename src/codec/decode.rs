//! Nested decoder: rebuilds a value tree from a flat query string.

use crate::error::DecodeErrorKind;
use crate::value::{Mapping, Value};

use super::path::{KeyPath, Segment};
use super::unescape;

/// Decode a canonical query string into a mapping.
///
/// Keys and values are unescaped before the key's bracket path is read, so
/// `account%5Bcode%5D=1` nests just like `account[code]=1`. All scalars come
/// back as strings. Fragments without a key are skipped; a fragment without
/// `=` carries an empty value.
///
/// Collision policy at a single node:
/// - scalar against mapping or sequence: the later fragment wins;
/// - mapping against sequence: [`DecodeErrorKind::ShapeConflict`].
pub fn decode(input: &str) -> Result<Value, DecodeErrorKind> {
    let mut root = Mapping::new();

    for fragment in input.split('&').filter(|f| !f.is_empty()) {
        let (raw_key, raw_value) = fragment.split_once('=').unwrap_or((fragment, ""));
        let Some(path) = KeyPath::parse(&unescape(raw_key)) else {
            continue;
        };

        let mut insert = Insert {
            path: &path,
            value: Some(unescape(raw_value)),
        };
        insert.insert_into_mapping(&mut root, &path.head, &path.segments)?;
    }

    Ok(Value::Mapping(root))
}

/// A single fragment being written into the tree.
struct Insert<'a> {
    path: &'a KeyPath,
    value: Option<String>,
}

impl Insert<'_> {
    fn conflict(&self) -> DecodeErrorKind {
        DecodeErrorKind::ShapeConflict {
            path: self.path.to_string(),
        }
    }

    fn take_value(&mut self) -> Value {
        Value::Scalar(self.value.take().unwrap_or_default())
    }

    /// Write at `map[key]` followed by `rest`.
    fn insert_into_mapping(
        &mut self,
        map: &mut Mapping,
        key: &str,
        rest: &[Segment],
    ) -> Result<(), DecodeErrorKind> {
        match rest.split_first() {
            None => {
                map.insert(key.to_string(), self.take_value());
                Ok(())
            }
            Some((Segment::Key(child), tail)) => {
                let node = map.entry(key.to_string()).or_insert_with(Value::mapping);
                let inner = self.ensure_mapping(node)?;
                self.insert_into_mapping(inner, child, tail)
            }
            Some((Segment::Push, tail)) => {
                let node = map
                    .entry(key.to_string())
                    .or_insert_with(|| Value::Sequence(Vec::new()));
                let items = self.ensure_sequence(node)?;
                self.insert_into_sequence(items, tail)
            }
        }
    }

    /// Write a new element (or into the last one) of a sequence.
    ///
    /// For `a[][k]=v` the last element is reused while it does not hold `k`
    /// yet, which is how a sequence of mappings comes back together.
    fn insert_into_sequence(
        &mut self,
        items: &mut Vec<Value>,
        rest: &[Segment],
    ) -> Result<(), DecodeErrorKind> {
        match rest.split_first() {
            None => {
                items.push(self.take_value());
                Ok(())
            }
            Some((Segment::Key(child), tail)) => {
                let reuse = match items.last() {
                    Some(last) => matches!(last, Value::Mapping(_)) && !holds(last, rest),
                    None => false,
                };
                if !reuse {
                    items.push(Value::mapping());
                }
                match items.last_mut() {
                    Some(Value::Mapping(inner)) => {
                        self.insert_into_mapping(inner, child, tail)
                    }
                    _ => Err(self.conflict()),
                }
            }
            Some((Segment::Push, tail)) => {
                if !matches!(items.last(), Some(Value::Sequence(_))) {
                    items.push(Value::Sequence(Vec::new()));
                }
                match items.last_mut() {
                    Some(Value::Sequence(inner)) => self.insert_into_sequence(inner, tail),
                    _ => Err(self.conflict()),
                }
            }
        }
    }

    fn ensure_mapping<'v>(&self, node: &'v mut Value) -> Result<&'v mut Mapping, DecodeErrorKind> {
        if matches!(node, Value::Scalar(_)) {
            *node = Value::mapping();
        }
        match node {
            Value::Mapping(map) => Ok(map),
            _ => Err(self.conflict()),
        }
    }

    fn ensure_sequence<'v>(
        &self,
        node: &'v mut Value,
    ) -> Result<&'v mut Vec<Value>, DecodeErrorKind> {
        if matches!(node, Value::Scalar(_)) {
            *node = Value::Sequence(Vec::new());
        }
        match node {
            Value::Sequence(items) => Ok(items),
            _ => Err(self.conflict()),
        }
    }
}

/// Whether `node` already has a value at the mapping path `rest`.
///
/// A path containing `[]` never collides: appending is always possible.
fn holds(node: &Value, rest: &[Segment]) -> bool {
    let mut node = node;
    for segment in rest {
        match segment {
            Segment::Key(name) => match node.get(name) {
                Some(child) => node = child,
                None => return false,
            },
            Segment::Push => return false,
        }
    }
    true
}
