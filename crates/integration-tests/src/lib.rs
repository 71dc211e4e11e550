//! Integration tests for the Parfum cart.
//!
//! Scenarios drive [`CartWidget`] end to end over file-backed storage in a
//! temporary directory, the way a page would across reloads.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p parfum-integration-tests
//! RUST_LOG=parfum_storefront=debug cargo test -p parfum-integration-tests -- --nocapture
//! ```

use std::io;
use std::path::PathBuf;

use parfum_storefront::{CartWidget, FileStorage, StorageError, WidgetConfig};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Install a test-friendly tracing subscriber, filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs it.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A storage directory that lives as long as the test.
pub struct TestContext {
    dir: TempDir,
    pub config: WidgetConfig,
}

impl TestContext {
    /// Create an empty storage directory with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> io::Result<Self> {
        init_test_tracing();
        Ok(Self {
            dir: tempfile::tempdir()?,
            config: WidgetConfig::default(),
        })
    }

    /// Path of the file backing a record.
    #[must_use]
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir.path().join(format!("{key}.json"))
    }

    /// Open file-backed storage over the test directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be opened.
    pub fn storage(&self) -> Result<FileStorage, StorageError> {
        FileStorage::open(self.dir.path())
    }

    /// Open a widget over the test directory, as on page load.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be opened.
    pub fn open_widget(&self) -> Result<CartWidget<FileStorage>, StorageError> {
        Ok(CartWidget::open(self.storage()?, self.config.clone()))
    }
}
