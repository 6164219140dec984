//! The in-memory document and its path resolver.
//!
//! [`Document`] owns the root mapping and implements every operation purely
//! in memory. Persistence is layered on top by [`Store`](crate::Store).
//!
//! # Resolution
//!
//! A key is split into intermediate segments and a terminal segment. The
//! resolver walks the intermediates from the root:
//!
//! - an existing child that is a mapping is descended into;
//! - an existing child of any other kind fails with `TypeMismatch`;
//! - a missing child fails with `KeyNotFound` for reads and deletes, and is
//!   created as an empty mapping for the other writes.
//!
//! Type conflicts can only be raised by nodes that already existed, and all
//! of those are visited before the first node is created. A failing write
//! therefore never leaves half-built intermediates behind.

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{DbError, DbResult};
use crate::path::KeyPath;
use crate::value::{as_counter, ValueKind};

/// Root mapping of the store.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    root: Map<String, Value>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing root mapping.
    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    /// The root mapping.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Consume the document, returning its root mapping.
    pub fn into_map(self) -> Map<String, Value> {
        self.root
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Returns `true` if the document has no top-level keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    // ---------------------------------------------------------------
    // Resolution
    // ---------------------------------------------------------------

    /// Walk the intermediate segments without creating anything.
    fn resolve(&self, path: &KeyPath<'_>) -> DbResult<&Map<String, Value>> {
        let mut node = &self.root;
        for segment in path.parents() {
            node = match node.get(*segment) {
                Some(Value::Object(child)) => child,
                Some(other) => return Err(not_a_mapping(path, segment, other)),
                None => return Err(missing(path, segment)),
            };
        }
        Ok(node)
    }

    /// Walk the intermediate segments mutably, failing on missing ones.
    fn resolve_existing_mut(&mut self, path: &KeyPath<'_>) -> DbResult<&mut Map<String, Value>> {
        let mut node = &mut self.root;
        for segment in path.parents() {
            node = match node.get_mut(*segment) {
                Some(Value::Object(child)) => child,
                Some(other) => return Err(not_a_mapping(path, segment, other)),
                None => return Err(missing(path, segment)),
            };
        }
        Ok(node)
    }

    /// Walk the intermediate segments, creating empty mappings where absent.
    fn resolve_or_create(&mut self, path: &KeyPath<'_>) -> DbResult<&mut Map<String, Value>> {
        let mut node = &mut self.root;
        for segment in path.parents() {
            let child = node.entry(*segment).or_insert_with(|| {
                trace!(key = %path, segment = *segment, "creating intermediate mapping");
                Value::Object(Map::new())
            });
            node = match child {
                Value::Object(child) => child,
                other => return Err(not_a_mapping(path, segment, other)),
            };
        }
        Ok(node)
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// Read the value at `key`.
    ///
    /// A missing intermediate segment is an error, but a missing terminal
    /// segment is not: it yields `Ok(None)`.
    pub fn get(&self, key: &str) -> DbResult<Option<&Value>> {
        let path = KeyPath::parse(key)?;
        let parent = self.resolve(&path)?;
        Ok(parent.get(path.leaf()))
    }

    /// Returns `true` iff every intermediate is a mapping and the terminal
    /// segment is present. Never fails.
    pub fn has(&self, key: &str) -> bool {
        let Ok(path) = KeyPath::parse(key) else {
            return false;
        };
        match self.resolve(&path) {
            Ok(parent) => parent.contains_key(path.leaf()),
            Err(_) => false,
        }
    }

    // ---------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------

    /// Assign `value` at `key`, creating intermediate mappings as needed.
    ///
    /// Any previous value is overwritten regardless of its type. Null values
    /// are rejected.
    pub fn set(&mut self, key: &str, value: Value) -> DbResult<()> {
        let path = KeyPath::parse(key)?;
        if value.is_null() {
            return Err(DbError::MissingValue {
                key: key.to_string(),
            });
        }
        let parent = self.resolve_or_create(&path)?;
        parent.insert(path.leaf().to_string(), value);
        Ok(())
    }

    /// Remove the value at `key`. Returns whether anything was removed.
    ///
    /// Intermediate segments must exist; an absent terminal is a no-op.
    pub fn delete(&mut self, key: &str) -> DbResult<bool> {
        let path = KeyPath::parse(key)?;
        let parent = self.resolve_existing_mut(&path)?;
        Ok(parent.remove(path.leaf()).is_some())
    }

    /// Append `value` to the sequence at `key`, creating it if absent.
    pub fn push(&mut self, key: &str, value: Value) -> DbResult<()> {
        let path = KeyPath::parse(key)?;
        if value.is_null() {
            return Err(DbError::MissingValue {
                key: key.to_string(),
            });
        }
        let parent = self.resolve_or_create(&path)?;
        let slot = parent
            .entry(path.leaf())
            .or_insert_with(|| Value::Array(Vec::new()));
        match slot {
            Value::Array(items) => {
                items.push(value);
                Ok(())
            }
            other => Err(DbError::TypeMismatch {
                key: key.to_string(),
                segment: path.leaf().to_string(),
                expected: ValueKind::Array,
                found: ValueKind::of(other),
            }),
        }
    }

    /// Add `count` to the integer at `key`, starting from 0 if absent.
    ///
    /// Arithmetic wraps on `i64` overflow. Returns the new value.
    pub fn add(&mut self, key: &str, count: i64) -> DbResult<i64> {
        self.apply_counter(key, |current| current.wrapping_add(count))
    }

    /// Subtract `count` from the integer at `key`, starting from 0 if absent.
    ///
    /// Arithmetic wraps on `i64` overflow. Returns the new value.
    pub fn sub(&mut self, key: &str, count: i64) -> DbResult<i64> {
        self.apply_counter(key, |current| current.wrapping_sub(count))
    }

    fn apply_counter(&mut self, key: &str, op: impl FnOnce(i64) -> i64) -> DbResult<i64> {
        let path = KeyPath::parse(key)?;
        let parent = self.resolve_or_create(&path)?;
        let slot = parent.entry(path.leaf()).or_insert_with(|| Value::from(0));
        let Some(current) = as_counter(slot) else {
            return Err(DbError::TypeMismatch {
                key: key.to_string(),
                segment: path.leaf().to_string(),
                expected: ValueKind::Integer,
                found: ValueKind::of(slot),
            });
        };
        let next = op(current);
        *slot = Value::from(next);
        Ok(next)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(root: Map<String, Value>) -> Self {
        Self::from_map(root)
    }
}

fn missing(path: &KeyPath<'_>, segment: &str) -> DbError {
    DbError::KeyNotFound {
        key: path.as_str().to_string(),
        segment: segment.to_string(),
    }
}

fn not_a_mapping(path: &KeyPath<'_>, segment: &str, found: &Value) -> DbError {
    DbError::TypeMismatch {
        key: path.as_str().to_string(),
        segment: segment.to_string(),
        expected: ValueKind::Object,
        found: ValueKind::of(found),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => Document::from_map(map),
            other => panic!("test document must be an object, got {other}"),
        }
    }

    // ---- Set / Get ----

    #[test]
    fn set_then_get_top_level() {
        let mut d = Document::new();
        d.set("key1", json!("value1")).unwrap();
        assert_eq!(d.get("key1").unwrap(), Some(&json!("value1")));
    }

    #[test]
    fn set_creates_intermediate_mappings() {
        let mut d = Document::new();
        d.set("a.b.c", json!(1)).unwrap();
        assert_eq!(d.as_map(), doc(json!({"a": {"b": {"c": 1}}})).as_map());
    }

    #[test]
    fn set_overwrites_and_changes_type() {
        let mut d = Document::new();
        d.set("k", json!(1)).unwrap();
        d.set("k", json!(["x"])).unwrap();
        assert_eq!(d.get("k").unwrap(), Some(&json!(["x"])));
    }

    #[test]
    fn set_rejects_null_value() {
        let mut d = Document::new();
        let err = d.set("k", Value::Null).unwrap_err();
        assert!(matches!(err, DbError::MissingValue { .. }));
        assert!(d.is_empty());
    }

    #[test]
    fn set_rejects_empty_key() {
        let mut d = Document::new();
        let err = d.set("", json!(1)).unwrap_err();
        assert!(matches!(err, DbError::InvalidKey { .. }));
    }

    #[test]
    fn set_through_scalar_is_type_mismatch() {
        let mut d = Document::new();
        d.set("a", json!("x")).unwrap();
        let err = d.set("a.b", json!(1)).unwrap_err();
        match err {
            DbError::TypeMismatch {
                segment,
                expected,
                found,
                ..
            } => {
                assert_eq!(segment, "a");
                assert_eq!(expected, ValueKind::Object);
                assert_eq!(found, ValueKind::String);
            }
            other => panic!("expected TypeMismatch, got: {other}"),
        }
        assert_eq!(d.get("a").unwrap(), Some(&json!("x")));
    }

    #[test]
    fn failed_write_creates_nothing() {
        let mut d = doc(json!({"a": {"b": 5}}));
        let before = d.clone();
        assert!(d.set("a.b.c.d", json!(1)).is_err());
        assert!(d.push("a.b.c", json!(1)).is_err());
        assert!(d.add("a.b.x.y", 1).is_err());
        assert_eq!(d, before);
    }

    #[test]
    fn get_missing_leaf_is_none() {
        let mut d = Document::new();
        d.set("a.b", json!(1)).unwrap();
        assert_eq!(d.get("a.c").unwrap(), None);
        assert_eq!(d.get("zzz").unwrap(), None);
    }

    #[test]
    fn get_missing_intermediate_is_not_found() {
        let d = Document::new();
        let err = d.get("x.c").unwrap_err();
        match err {
            DbError::KeyNotFound { key, segment } => {
                assert_eq!(key, "x.c");
                assert_eq!(segment, "x");
            }
            other => panic!("expected KeyNotFound, got: {other}"),
        }
    }

    #[test]
    fn get_through_array_is_type_mismatch() {
        let d = doc(json!({"list": [1, 2]}));
        let err = d.get("list.0").unwrap_err();
        assert!(matches!(err, DbError::TypeMismatch { .. }));
    }

    #[test]
    fn get_does_not_create() {
        let d = Document::new();
        let _ = d.get("a.b.c");
        assert!(d.is_empty());
    }

    // ---- Has ----

    #[test]
    fn has_tracks_presence() {
        let mut d = Document::new();
        assert!(!d.has("a.b"));
        d.set("a.b", json!(1)).unwrap();
        assert!(d.has("a.b"));
        assert!(d.has("a"));
        assert!(!d.has("a.c"));
        d.delete("a.b").unwrap();
        assert!(!d.has("a.b"));
    }

    #[test]
    fn counters_become_present() {
        let mut d = Document::new();
        assert!(!d.has("stats.hits"));
        d.add("stats.hits", 2).unwrap();
        assert!(d.has("stats.hits"));

        assert!(!d.has("stats.misses"));
        d.sub("stats.misses", 1).unwrap();
        assert!(d.has("stats.misses"));
        assert_eq!(d.get("stats.misses").unwrap(), Some(&json!(-1)));
    }

    #[test]
    fn has_is_total() {
        let d = doc(json!({"s": "x"}));
        assert!(!d.has(""));
        assert!(!d.has("a..b"));
        assert!(!d.has("s.inner"));
        assert!(!d.has("missing.inner"));
    }

    // ---- Delete ----

    #[test]
    fn delete_absent_leaf_is_noop() {
        let mut d = doc(json!({"a": {}}));
        assert!(!d.delete("a.b").unwrap());
        assert!(!d.delete("top").unwrap());
    }

    #[test]
    fn delete_missing_intermediate_is_not_found() {
        let mut d = Document::new();
        let err = d.delete("a.b").unwrap_err();
        assert!(matches!(err, DbError::KeyNotFound { .. }));
    }

    #[test]
    fn delete_keeps_emptied_parent() {
        let mut d = Document::new();
        d.set("a.b", json!(1)).unwrap();
        assert!(d.delete("a.b").unwrap());
        assert_eq!(d.get("a").unwrap(), Some(&json!({})));
    }

    // ---- Push ----

    #[test]
    fn push_appends_in_call_order() {
        let mut d = Document::new();
        d.push("key3", json!("value1")).unwrap();
        d.push("key3", json!("value2")).unwrap();
        assert_eq!(d.get("key3").unwrap(), Some(&json!(["value1", "value2"])));
    }

    #[test]
    fn push_nested_creates_path() {
        let mut d = Document::new();
        d.push("log.events", json!({"n": 1})).unwrap();
        assert_eq!(d.as_map(), doc(json!({"log": {"events": [{"n": 1}]}})).as_map());
    }

    #[test]
    fn push_onto_non_sequence_is_type_mismatch() {
        let mut d = doc(json!({"k": 3}));
        let err = d.push("k", json!(1)).unwrap_err();
        match err {
            DbError::TypeMismatch { expected, found, .. } => {
                assert_eq!(expected, ValueKind::Array);
                assert_eq!(found, ValueKind::Integer);
            }
            other => panic!("expected TypeMismatch, got: {other}"),
        }
        assert_eq!(d.get("k").unwrap(), Some(&json!(3)));
    }

    #[test]
    fn push_rejects_null_value() {
        let mut d = Document::new();
        let err = d.push("k", Value::Null).unwrap_err();
        assert!(matches!(err, DbError::MissingValue { .. }));
        assert!(!d.has("k"));
    }

    // ---- Add / Sub ----

    #[test]
    fn add_and_sub_sequence() {
        let mut d = Document::new();
        assert_eq!(d.add("key4", 1).unwrap(), 1);
        assert_eq!(d.add("key4", 2).unwrap(), 3);
        assert_eq!(d.sub("key4", 2).unwrap(), 1);
        assert_eq!(d.sub("key4", 1).unwrap(), 0);
        assert_eq!(d.get("key4").unwrap(), Some(&json!(0)));
    }

    #[test]
    fn sub_from_absent_goes_negative() {
        let mut d = Document::new();
        assert_eq!(d.sub("stats.debt", 5).unwrap(), -5);
    }

    #[test]
    fn add_rejects_non_integers() {
        let mut d = doc(json!({"f": 1.5, "s": "3", "whole": 3.0, "b": true}));
        for key in ["f", "s", "whole", "b"] {
            let err = d.add(key, 1).unwrap_err();
            assert!(
                matches!(err, DbError::TypeMismatch { expected: ValueKind::Integer, .. }),
                "expected TypeMismatch for {key}, got: {err}"
            );
        }
    }

    #[test]
    fn add_wraps_on_overflow() {
        let mut d = Document::new();
        d.set("n", json!(i64::MAX)).unwrap();
        assert_eq!(d.add("n", 1).unwrap(), i64::MIN);
        assert_eq!(d.sub("n", 1).unwrap(), i64::MAX);
    }

    // ---- Properties ----

    fn segment() -> impl Strategy<Value = String> {
        "[a-z]{1,6}"
    }

    fn key() -> impl Strategy<Value = String> {
        prop::collection::vec(segment(), 1..4).prop_map(|s| s.join("."))
    }

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[ -~]{0,12}".prop_map(Value::from),
        ]
    }

    proptest! {
        #[test]
        fn set_then_get_returns_value(k in key(), v in scalar()) {
            let mut d = Document::new();
            d.set(&k, v.clone()).unwrap();
            prop_assert_eq!(d.get(&k).unwrap(), Some(&v));
            prop_assert!(d.has(&k));
        }

        #[test]
        fn adds_compose(k in key(), n in -1_000_000i64..1_000_000, m in -1_000_000i64..1_000_000) {
            let mut split = Document::new();
            split.add(&k, n).unwrap();
            split.add(&k, m).unwrap();

            let mut single = Document::new();
            single.add(&k, n + m).unwrap();

            prop_assert_eq!(split.get(&k).unwrap(), single.get(&k).unwrap());
        }

        #[test]
        fn sub_inverts_add(k in key(), start in any::<i64>(), n in any::<i64>()) {
            let mut d = Document::new();
            d.set(&k, Value::from(start)).unwrap();
            d.add(&k, n).unwrap();
            prop_assert_eq!(d.sub(&k, n).unwrap(), start);
        }

        #[test]
        fn pushes_preserve_order(k in key(), items in prop::collection::vec(scalar(), 1..8)) {
            let mut d = Document::new();
            for item in &items {
                d.push(&k, item.clone()).unwrap();
            }
            prop_assert_eq!(d.get(&k).unwrap(), Some(&Value::Array(items)));
        }
    }
}
