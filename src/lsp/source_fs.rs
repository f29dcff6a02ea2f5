//! Filesystem access for resolved destinations
//!
//! The resolution engine only needs to know whether a destination exists and
//! what it contains. Going through this trait keeps the engine testable
//! against an in-memory project.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::Url;

/// Read-only view of the files a resolution may land in.
pub trait SourceFs: Send + Sync {
    /// Succeeds when `path` exists, analogous to a stat call.
    fn stat(&self, path: &Path) -> io::Result<()>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Human-readable name of this implementation (for logging)
    fn name(&self) -> &'static str;
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl SourceFs for LocalFs {
    fn stat(&self, path: &Path) -> io::Result<()> {
        std::fs::metadata(path).map(|_| ())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// A fixed set of files held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryFs {
    files: HashMap<PathBuf, String>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

impl SourceFs for MemoryFs {
    fn stat(&self, path: &Path) -> io::Result<()> {
        if self.files.contains_key(path) {
            Ok(())
        } else {
            Err(io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display())))
        }
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display())))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Turns a destination URI into a filesystem path.
///
/// `file://` URIs are decoded properly; anything else (a bare path used as a
/// project root, for instance) falls back to stripping the scheme prefix.
pub fn uri_to_path(uri: &str) -> PathBuf {
    Url::parse(uri)
        .ok()
        .filter(|url| url.scheme() == "file")
        .and_then(|url| url.to_file_path().ok())
        .unwrap_or_else(|| PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri)))
}
