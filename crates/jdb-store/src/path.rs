//! Dotted key paths.
//!
//! A key such as `"user.profile.name"` addresses a slot in the nested
//! document. Rules:
//! - Must be non-empty
//! - Segments are separated by `.`
//! - Every segment must be non-empty, so `"a..b"`, `".a"` and `"a."` are
//!   rejected rather than treated as empty-string map keys
//!
//! All segments but the last are *intermediate* segments and must name
//! mappings. The last is the *terminal* segment: the slot actually read or
//! written.

use std::fmt;

use crate::error::{DbError, DbResult};

/// Separator between key segments.
pub const SEPARATOR: char = '.';

/// A validated dotted key, borrowed from the caller's string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPath<'a> {
    raw: &'a str,
    segments: Vec<&'a str>,
}

impl<'a> KeyPath<'a> {
    /// Parse and validate a dotted key.
    ///
    /// # Examples
    ///
    /// ```
    /// use jdb_store::KeyPath;
    ///
    /// let path = KeyPath::parse("user.name").unwrap();
    /// assert_eq!(path.parents(), &["user"]);
    /// assert_eq!(path.leaf(), "name");
    /// assert!(KeyPath::parse("").is_err());
    /// assert!(KeyPath::parse("a..b").is_err());
    /// ```
    pub fn parse(raw: &'a str) -> DbResult<Self> {
        if raw.is_empty() {
            return Err(DbError::InvalidKey {
                key: raw.to_string(),
                reason: "key must not be empty".into(),
            });
        }

        let segments: Vec<&str> = raw.split(SEPARATOR).collect();
        if let Some(pos) = segments.iter().position(|s| s.is_empty()) {
            return Err(DbError::InvalidKey {
                key: raw.to_string(),
                reason: format!("segment {pos} is empty"),
            });
        }

        Ok(Self { raw, segments })
    }

    /// The key as supplied by the caller.
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// All segments in order.
    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    /// The intermediate segments (everything but the terminal one).
    pub fn parents(&self) -> &[&'a str] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The terminal segment.
    pub fn leaf(&self) -> &'a str {
        self.segments[self.segments.len() - 1]
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for KeyPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw)
    }
}
