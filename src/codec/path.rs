//! Bracket path notation for query keys.

use std::fmt;

/// One bracketed component of a key path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `[name]`: descend into a mapping.
    Key(String),
    /// `[]`: append to a sequence.
    Push,
}

/// A parsed query key such as `account[addresses][][city]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    /// The leading bare identifier.
    pub head: String,
    /// Bracketed components after the head.
    pub segments: Vec<Segment>,
}

impl KeyPath {
    /// Parse an already unescaped query key.
    ///
    /// Brackets are structure wherever they appear, so a wire key escaped as
    /// a whole (`a%5Bb%5D`) parses the same as `a[b]`. A key with malformed
    /// brackets is kept literally as a single head. Returns `None` when the
    /// head is empty.
    pub fn parse(key: &str) -> Option<Self> {
        let (head, mut rest) = match key.find('[') {
            Some(idx) => (&key[..idx], &key[idx..]),
            None => (key, ""),
        };
        if head.is_empty() {
            return None;
        }

        let mut segments = Vec::new();
        while !rest.is_empty() {
            let close = match (rest.strip_prefix('['), rest.find(']')) {
                (Some(_), Some(close)) => close,
                _ => {
                    return Some(Self {
                        head: key.to_string(),
                        segments: Vec::new(),
                    })
                }
            };
            let name = &rest[1..close];
            segments.push(if name.is_empty() {
                Segment::Push
            } else {
                Segment::Key(name.to_string())
            });
            rest = &rest[close + 1..];
        }

        Some(Self {
            head: head.to_string(),
            segments,
        })
    }

    /// True when the key ends in `[]`.
    pub fn is_push(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Push))
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        for segment in &self.segments {
            match segment {
                Segment::Key(name) => write!(f, "[{}]", name)?,
                Segment::Push => write!(f, "[]")?,
            }
        }
        Ok(())
    }
}
