//! In-memory backend for testing and ephemeral use.
//!
//! [`InMemoryBackend`] keeps the last saved document as serialized JSON text
//! behind a `RwLock`, so loads go through the same parser as the file
//! backend. Writes can be made to fail on demand to exercise the store's
//! behavior when persistence breaks.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use serde_json::{Map, Value};

use crate::error::{DbError, DbResult};
use crate::traits::Backend;
use crate::value::ValueKind;

/// An in-memory implementation of [`Backend`].
///
/// Data is lost when the backend is dropped.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    text: RwLock<Option<String>>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryBackend {
    /// Create a backend with nothing persisted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend whose persisted content is `text`, verbatim.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: RwLock::new(Some(text.into())),
            ..Default::default()
        }
    }

    /// The persisted JSON text, if anything has been saved.
    pub fn contents(&self) -> Option<String> {
        self.text.read().ok().and_then(|t| t.clone())
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make every subsequent save fail with an I/O error (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl Backend for InMemoryBackend {
    fn load(&self) -> DbResult<Option<Map<String, Value>>> {
        let text = self
            .text
            .read()
            .map_err(|e| DbError::Poisoned(e.to_string()))?;
        let Some(text) = text.as_deref() else {
            return Ok(None);
        };
        if text.trim().is_empty() {
            return Ok(None);
        }

        let value: Value = serde_json::from_str(text).map_err(|source| DbError::Parse {
            path: PathBuf::from(self.describe()),
            source,
        })?;
        match value {
            Value::Object(root) => Ok(Some(root)),
            other => Err(DbError::NotAnObject {
                path: PathBuf::from(self.describe()),
                found: ValueKind::of(&other),
            }),
        }
    }

    fn save(&self, root: &Map<String, Value>) -> DbResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DbError::Io(io::Error::new(
                io::ErrorKind::Other,
                "simulated write failure",
            )));
        }

        let rendered = serde_json::to_string_pretty(root)
            .map_err(|e| DbError::Serialization(e.to_string()))?;
        let mut text = self
            .text
            .write()
            .map_err(|e| DbError::Poisoned(e.to_string()))?;
        *text = Some(rendered);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_backend_loads_none() {
        let backend = InMemoryBackend::new();
        assert!(backend.load().unwrap().is_none());
        assert!(backend.contents().is_none());
    }

    #[test]
    fn save_then_load() {
        let backend = InMemoryBackend::new();
        let Value::Object(root) = json!({"a": [1, 2]}) else {
            unreachable!()
        };
        backend.save(&root).unwrap();
        assert_eq!(backend.load().unwrap(), Some(root));
        assert_eq!(backend.save_count(), 1);
    }

    #[test]
    fn seeded_garbage_is_parse_error() {
        let backend = InMemoryBackend::with_text("nope");
        let err = backend.load().unwrap_err();
        assert!(matches!(err, DbError::Parse { .. }));
    }

    #[test]
    fn seeded_scalar_is_not_an_object() {
        let backend = InMemoryBackend::with_text("42");
        let err = backend.load().unwrap_err();
        assert!(matches!(err, DbError::NotAnObject { found: ValueKind::Integer, .. }));
    }

    #[test]
    fn failing_writes_keep_previous_contents() {
        let backend = InMemoryBackend::with_text("{}");
        backend.set_fail_writes(true);
        let err = backend.save(&Map::new()).unwrap_err();
        assert!(matches!(err, DbError::Io(_)));
        assert_eq!(backend.contents().as_deref(), Some("{}"));
        assert_eq!(backend.save_count(), 0);
    }

    #[test]
    fn poisoned_lock_is_io_kind() {
        use crate::error::ErrorKind;
        use std::panic::{self, AssertUnwindSafe};

        let backend = InMemoryBackend::with_text("{}");
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = backend.text.write().unwrap();
            panic!("writer died holding the lock");
        }));
        assert!(result.is_err());

        let err = backend.load().unwrap_err();
        assert!(matches!(err, DbError::Poisoned(_)), "got: {err}");
        assert_eq!(err.kind(), ErrorKind::Io);

        let err = backend.save(&Map::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
