//! Thread-safe handle around a [`Store`].
//!
//! [`Store`] itself has no internal locking. [`SharedStore`] puts one mutex
//! around the whole store, so every operation (including its save) runs to
//! completion before the next one starts. It does not coordinate separate
//! processes writing the same file.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::StoreConfig;
use crate::error::DbResult;
use crate::file::JsonFileBackend;
use crate::store::Store;
use crate::traits::Backend;

/// A cloneable, mutex-guarded [`Store`].
#[derive(Debug)]
pub struct SharedStore<B: Backend = JsonFileBackend> {
    inner: Arc<Mutex<Store<B>>>,
}

impl<B: Backend> Clone for SharedStore<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SharedStore<JsonFileBackend> {
    /// Open a shared store at `path` with default settings.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::new(Store::open(path)?))
    }

    /// Open a shared store at `path` with explicit settings.
    ///
    /// # Panics
    ///
    /// Panics if `path` is empty.
    pub fn open_with_config(path: impl AsRef<Path>, config: StoreConfig) -> DbResult<Self> {
        Ok(Self::new(Store::open_with_config(path, config)?))
    }
}

impl<B: Backend> SharedStore<B> {
    /// Wrap an already opened store.
    pub fn new(store: Store<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Lock the store for a sequence of operations that must not interleave
    /// with other callers.
    ///
    /// A lock poisoned by a panicking holder is recovered: every store
    /// operation leaves the document consistent before it can panic.
    pub fn lock(&self) -> MutexGuard<'_, Store<B>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the value at `key`, cloned out of the store.
    pub fn get(&self, key: &str) -> DbResult<Option<Value>> {
        Ok(self.lock().get(key)?.cloned())
    }

    /// Read the value at `key` and deserialize it into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> DbResult<Option<T>> {
        self.lock().get_as(key)
    }

    /// Returns `true` iff a value is present at `key`.
    pub fn has(&self, key: &str) -> bool {
        self.lock().has(key)
    }

    /// Assign `value` at `key`.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> DbResult<()> {
        self.lock().set(key, value)
    }

    /// Serialize `value` and assign it at `key`.
    pub fn set_as<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> DbResult<()> {
        self.lock().set_as(key, value)
    }

    /// Remove the value at `key`.
    pub fn delete(&self, key: &str) -> DbResult<bool> {
        self.lock().delete(key)
    }

    /// Append `value` to the sequence at `key`.
    pub fn push(&self, key: &str, value: impl Into<Value>) -> DbResult<()> {
        self.lock().push(key, value)
    }

    /// Add `count` to the integer at `key`.
    pub fn add(&self, key: &str, count: i64) -> DbResult<i64> {
        self.lock().add(key, count)
    }

    /// Subtract `count` from the integer at `key`.
    pub fn sub(&self, key: &str, count: i64) -> DbResult<i64> {
        self.lock().sub(key, count)
    }
}
