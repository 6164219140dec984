//! The persistent [`Store`].
//!
//! A store loads its document once on construction and writes the whole
//! document back through its [`Backend`] after every successful mutation.
//! Reads are served from memory.
//!
//! If a save fails after the in-memory mutation has been applied, the error
//! is returned but the mutation is not rolled back: memory is ahead of the
//! persisted copy until the next successful save.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::document::Document;
use crate::error::{DbError, DbResult};
use crate::file::JsonFileBackend;
use crate::traits::Backend;

/// A dotted-key store over a single persisted JSON document.
///
/// Mutating methods take `&mut self`; wrap the store in a
/// [`SharedStore`](crate::SharedStore) to use it from several threads.
#[derive(Debug)]
pub struct Store<B: Backend = JsonFileBackend> {
    backend: B,
    doc: Document,
}

impl Store<JsonFileBackend> {
    /// Open the store at `path` with default settings.
    ///
    /// A missing file is created holding an empty document. An existing file
    /// must contain a JSON object.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Self::open_with_config(path, StoreConfig::default())
    }

    /// Open the store at `path` with explicit settings.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty.
    pub fn open_with_config(path: impl AsRef<Path>, config: StoreConfig) -> DbResult<Self> {
        let path = path.as_ref();
        assert!(
            !path.as_os_str().is_empty(),
            "store file path must not be empty"
        );
        Self::with_backend(JsonFileBackend::new(path, config))
    }

    /// Path to the document file.
    pub fn path(&self) -> &Path {
        self.backend.path()
    }
}

impl<B: Backend> Store<B> {
    /// Build a store over any backend, loading its document.
    ///
    /// If the backend has nothing persisted yet, an empty document is saved
    /// immediately.
    pub fn with_backend(backend: B) -> DbResult<Self> {
        let doc = match backend.load()? {
            Some(root) => {
                debug!(location = %backend.describe(), keys = root.len(), "store opened");
                Document::from_map(root)
            }
            None => {
                let doc = Document::new();
                backend.save(doc.as_map())?;
                info!(location = %backend.describe(), "created empty document");
                doc
            }
        };
        Ok(Self { backend, doc })
    }

    /// The backend this store persists through.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The in-memory document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.doc.len()
    }

    /// Returns `true` if the document has no top-level keys.
    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }

    /// Discard the in-memory document and load it again from the backend.
    pub fn reload(&mut self) -> DbResult<()> {
        self.doc = match self.backend.load()? {
            Some(root) => Document::from_map(root),
            None => Document::new(),
        };
        debug!(location = %self.backend.describe(), "store reloaded");
        Ok(())
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// Read the value at `key`.
    ///
    /// Returns `Ok(None)` when every intermediate segment exists but the
    /// terminal one does not. A missing intermediate segment is
    /// [`DbError::KeyNotFound`].
    pub fn get(&self, key: &str) -> DbResult<Option<&Value>> {
        self.doc.get(key)
    }

    /// Read the value at `key` and deserialize it into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> DbResult<Option<T>> {
        self.doc
            .get(key)?
            .map(|value| {
                T::deserialize(value).map_err(|e| DbError::Serialization(e.to_string()))
            })
            .transpose()
    }

    /// Returns `true` iff a value is present at `key`. Never fails.
    pub fn has(&self, key: &str) -> bool {
        self.doc.has(key)
    }

    // ---------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------

    /// Assign `value` at `key`, creating intermediate mappings as needed.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> DbResult<()> {
        self.doc.set(key, value.into())?;
        self.persist("set", key)
    }

    /// Serialize `value` and assign it at `key`.
    pub fn set_as<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> DbResult<()> {
        let value =
            serde_json::to_value(value).map_err(|e| DbError::Serialization(e.to_string()))?;
        self.set(key, value)
    }

    /// Remove the value at `key`. Returns whether anything was removed.
    ///
    /// Removing an absent terminal segment is not an error, and the
    /// document is still saved.
    pub fn delete(&mut self, key: &str) -> DbResult<bool> {
        let removed = self.doc.delete(key)?;
        self.persist("delete", key)?;
        Ok(removed)
    }

    /// Append `value` to the sequence at `key`, creating the sequence if
    /// absent.
    pub fn push(&mut self, key: &str, value: impl Into<Value>) -> DbResult<()> {
        self.doc.push(key, value.into())?;
        self.persist("push", key)
    }

    /// Add `count` to the integer at `key`. Returns the new value.
    pub fn add(&mut self, key: &str, count: i64) -> DbResult<i64> {
        let next = self.doc.add(key, count)?;
        self.persist("add", key)?;
        Ok(next)
    }

    /// Subtract `count` from the integer at `key`. Returns the new value.
    pub fn sub(&mut self, key: &str, count: i64) -> DbResult<i64> {
        let next = self.doc.sub(key, count)?;
        self.persist("sub", key)?;
        Ok(next)
    }

    fn persist(&self, op: &'static str, key: &str) -> DbResult<()> {
        match self.backend.save(self.doc.as_map()) {
            Ok(()) => {
                debug!(op, key, "document persisted");
                Ok(())
            }
            Err(e) => {
                warn!(
                    op,
                    key,
                    location = %self.backend.describe(),
                    error = %e,
                    "persist failed; in-memory document is ahead of storage"
                );
                Err(e)
            }
        }
    }
}
