//! JSON file backend.
//!
//! The document is kept as a single pretty-printed JSON object. Every save
//! serializes the whole document; with [`WriteMode::Atomic`] the bytes go to
//! a temporary file in the same directory which is then renamed over the
//! target, so a crash mid-write leaves the previous version intact.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{StoreConfig, WriteMode};
use crate::error::{DbError, DbResult};
use crate::traits::Backend;
use crate::value::ValueKind;

/// A [`Backend`] that persists the document to a JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    config: StoreConfig,
}

impl JsonFileBackend {
    /// Create a backend for `path`. Nothing is touched on disk until the
    /// first load or save.
    pub fn new(path: impl Into<PathBuf>, config: StoreConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    /// Path to the document file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Active configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Render the document exactly as it is written to disk.
    pub fn render(&self, root: &Map<String, Value>) -> DbResult<Vec<u8>> {
        let indent = vec![b' '; self.config.indent];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        root.serialize(&mut ser)
            .map_err(|e| DbError::Serialization(e.to_string()))?;
        buf.push(b'\n');
        Ok(buf)
    }

    /// Directory that receives temporary files. A bare file name lives in
    /// the current directory.
    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        let dir = self.parent_dir();
        let mut tmp = tempfile::Builder::new()
            .prefix(".jdb-")
            .suffix(".tmp")
            .tempfile_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        // The replacement inherits the target's permissions; the configured
        // mode only applies to a newly created file.
        match fs::metadata(&self.path) {
            Ok(meta) => fs::set_permissions(tmp.path(), meta.permissions())?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                set_mode(tmp.path(), self.config.file_mode)?
            }
            Err(e) => return Err(e),
        }
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn write_in_place(&self, bytes: &[u8]) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.config.file_mode);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        Ok(())
    }
}

impl Backend for JsonFileBackend {
    fn load(&self) -> DbResult<Option<Map<String, Value>>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if text.trim().is_empty() {
            debug!(path = %self.path.display(), "document file is empty");
            return Ok(None);
        }

        let value: Value = serde_json::from_str(&text).map_err(|source| DbError::Parse {
            path: self.path.clone(),
            source,
        })?;

        match value {
            Value::Object(root) => {
                debug!(path = %self.path.display(), keys = root.len(), "document loaded");
                Ok(Some(root))
            }
            other => Err(DbError::NotAnObject {
                path: self.path.clone(),
                found: ValueKind::of(&other),
            }),
        }
    }

    fn save(&self, root: &Map<String, Value>) -> DbResult<()> {
        let bytes = self.render(root)?;

        if self.config.create_dirs {
            fs::create_dir_all(self.parent_dir())?;
        }

        match self.config.write_mode {
            WriteMode::Atomic => self.write_atomic(&bytes)?,
            WriteMode::InPlace => self.write_in_place(&bytes)?,
        }

        debug!(
            path = %self.path.display(),
            bytes = bytes.len(),
            mode = ?self.config.write_mode,
            "document saved"
        );
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
