//! Persistent key/value storage for cart and order-history records.
//!
//! # Backends
//!
//! - [`MemoryStorage`] - `HashMap`-backed, for tests and ephemeral sessions
//! - [`FileStorage`] - one `<key>.json` file per record inside a directory
//!
//! Each record is a JSON array. Stores read a record once when they load and
//! overwrite it after every mutation; there is no partial update.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the record failed.
    #[error("I/O error on record '{key}': {source}")]
    Io {
        /// Record key.
        key: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The key cannot be used as a record name.
    #[error("Invalid storage key: '{0}'")]
    InvalidKey(String),
}

/// A localStorage-like string store.
pub trait Storage {
    /// Read the record stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the record stored under `key`. Missing records are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    records: HashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.records.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.records.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.records.remove(key);
        Ok(())
    }
}

/// Directory-backed storage with one JSON file per key.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the record, so a crash mid-write leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// The storage directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.record_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_owned(),
                source,
            }),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.record_path(key)?;
        let io_error = |source| StorageError::Io {
            key: key.to_owned(),
            source,
        };

        let mut temp = tempfile::NamedTempFile::new_in(&self.dir).map_err(io_error)?;
        temp.write_all(value.as_bytes()).map_err(io_error)?;
        temp.persist(&path).map_err(|e| io_error(e.error))?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.record_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io {
                key: key.to_owned(),
                source,
            }),
        }
    }
}

/// Check that a key is usable as a record name.
///
/// Keys are limited to ASCII letters, digits, `_`, `-` and `.`, and may not
/// start with `.`.
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] otherwise.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.');
    if key.is_empty() || key.starts_with('.') || !key.chars().all(allowed) {
        return Err(StorageError::InvalidKey(key.to_owned()));
    }
    Ok(())
}

// =============================================================================
// Record Helpers
// =============================================================================

/// Outcome of reading a persisted JSON-array record.
#[derive(Debug)]
pub(crate) enum Record {
    /// Nothing stored under the key.
    Absent,
    /// The record exists but is not a JSON array; it has been removed.
    Corrupted,
    /// The raw array entries, still to be validated one by one.
    Entries(Vec<Value>),
}

/// Read a record as a JSON array.
///
/// A record that does not parse is removed so the next load starts clean.
/// Read failures are treated like an absent record.
pub(crate) fn read_record(storage: &mut dyn Storage, key: &str) -> Record {
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Record::Absent,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read record, starting empty");
            return Record::Absent;
        }
    };

    match serde_json::from_str::<Vec<Value>>(&raw) {
        Ok(entries) => Record::Entries(entries),
        Err(e) => {
            tracing::warn!(key, error = %e, "Record is corrupted, clearing it");
            if let Err(e) = storage.remove_item(key) {
                tracing::error!(key, error = %e, "Failed to clear corrupted record");
            }
            Record::Corrupted
        }
    }
}

/// Serialize `value` and store it under `key`.
pub(crate) fn write_record<T: Serialize + ?Sized>(
    storage: &mut dyn Storage,
    key: &str,
    value: &T,
) -> crate::error::Result<()> {
    let json = serde_json::to_string(value)?;
    storage.set_item(key, &json)?;
    tracing::debug!(key, bytes = json.len(), "Record persisted");
    Ok(())
}
