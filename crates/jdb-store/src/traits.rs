//! The [`Backend`] trait defining where a document is persisted.
//!
//! A backend stores exactly one document and always reads and writes it
//! whole. [`Store`](crate::Store) calls [`Backend::load`] once on
//! construction and [`Backend::save`] after every successful mutation.

use serde_json::{Map, Value};

use crate::error::DbResult;

/// Whole-document persistence target.
///
/// Implementations must be `Send` so a store can move behind a mutex and be
/// shared between threads.
pub trait Backend: Send {
    /// Read the persisted document.
    ///
    /// Returns `Ok(None)` if nothing has been persisted yet.
    /// Returns `Err` if the data exists but cannot be read or parsed.
    fn load(&self) -> DbResult<Option<Map<String, Value>>>;

    /// Replace the persisted document with `root`.
    ///
    /// This is always a full rewrite, never a diff.
    fn save(&self, root: &Map<String, Value>) -> DbResult<()>;

    /// Human-readable location used in log output.
    fn describe(&self) -> String;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn load(&self) -> DbResult<Option<Map<String, Value>>> {
        (**self).load()
    }

    fn save(&self, root: &Map<String, Value>) -> DbResult<()> {
        (**self).save(root)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
