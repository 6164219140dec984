use serde::{Deserialize, Serialize};

/// How the document is written back to its file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteMode {
    /// Write a temporary file next to the target, then rename it over the
    /// target. Readers never observe a half-written document.
    #[default]
    Atomic,
    /// Truncate and rewrite the target in place.
    InPlace,
}

/// Configuration for a file-backed store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Spaces per indentation level in the persisted JSON.
    pub indent: usize,
    /// Write strategy used on every save.
    pub write_mode: WriteMode,
    /// Create missing parent directories of the document file before each
    /// save.
    pub create_dirs: bool,
    /// Unix permission bits applied to the document file.
    pub file_mode: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            write_mode: WriteMode::default(),
            create_dirs: false,
            file_mode: 0o644,
        }
    }
}

impl StoreConfig {
    /// Default settings, but rewriting the file in place instead of renaming.
    pub fn in_place() -> Self {
        Self {
            write_mode: WriteMode::InPlace,
            ..Default::default()
        }
    }

    /// Set the indentation width.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Create parent directories before each save.
    pub fn with_create_dirs(mut self, create_dirs: bool) -> Self {
        self.create_dirs = create_dirs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.indent, 2);
        assert_eq!(config.write_mode, WriteMode::Atomic);
        assert!(!config.create_dirs);
        assert_eq!(config.file_mode, 0o644);
    }

    #[test]
    fn in_place_keeps_other_defaults() {
        let config = StoreConfig::in_place().with_indent(4);
        assert_eq!(config.write_mode, WriteMode::InPlace);
        assert_eq!(config.indent, 4);
        assert_eq!(config.file_mode, 0o644);
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = StoreConfig::in_place().with_create_dirs(true);
        let text = serde_json::to_string(&config).unwrap();
        let back: StoreConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.write_mode, WriteMode::InPlace);
        assert!(back.create_dirs);
    }
}
