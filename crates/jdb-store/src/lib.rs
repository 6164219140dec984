//! A small persistent key-value store over a single JSON document.
//!
//! Values live in one JSON object on disk and are addressed by dotted key
//! paths such as `"user.profile.name"`. The document is loaded once when the
//! store opens and rewritten whole after every mutation.
//!
//! ```no_run
//! use jdb_store::Store;
//!
//! let mut store = Store::open("state.json")?;
//! store.set("user.name", "ava")?;
//! store.add("user.logins", 1)?;
//! store.push("user.roles", "admin")?;
//!
//! assert!(store.has("user.name"));
//! assert_eq!(store.get("user.logins")?, Some(&jdb_store::json!(1)));
//! # Ok::<(), jdb_store::DbError>(())
//! ```
//!
//! # Architecture
//!
//! - **Key paths** are split on `.`. All segments but the last must name
//!   mappings; the last names the slot being read or written.
//! - **Reads** never create anything. A missing intermediate segment is an
//!   error, a missing terminal segment reads as `None`.
//! - **Writes** create missing intermediate mappings, then save the whole
//!   document through the store's [`Backend`].
//! - **Concurrency** is the caller's concern: [`Store`] takes `&mut self`
//!   for writes, and [`SharedStore`] adds a single mutex for multi-threaded
//!   use. Multiple processes must not share a file.
//!
//! # Modules
//!
//! - [`error`] — Error types for store operations
//! - [`path`] — Dotted key parsing and validation
//! - [`value`] — Runtime kinds of untyped values
//! - [`document`] — The in-memory [`Document`] and path resolver
//! - [`config`] — [`StoreConfig`] and [`WriteMode`]
//! - [`traits`] — The [`Backend`] persistence trait
//! - [`file`] — [`JsonFileBackend`], the on-disk backend
//! - [`memory`] — [`InMemoryBackend`] for tests
//! - [`store`] — [`Store`], document plus persistence
//! - [`shared`] — [`SharedStore`], a mutex-guarded store handle

pub mod config;
pub mod document;
pub mod error;
pub mod file;
pub mod memory;
pub mod path;
pub mod shared;
pub mod store;
pub mod traits;
pub mod value;

pub use config::{StoreConfig, WriteMode};
pub use document::Document;
pub use error::{DbError, DbResult, ErrorKind};
pub use file::JsonFileBackend;
pub use memory::InMemoryBackend;
pub use path::KeyPath;
pub use shared::SharedStore;
pub use store::Store;
pub use traits::Backend;
pub use value::ValueKind;

pub use serde_json::{json, Map, Value};
