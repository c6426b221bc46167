use std::io;
use std::path::{Path, PathBuf};

use crate::schema::Schema;

/// Handle to a collection root and the base path its identifiers resolve against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collection {
    /// Collection directory (for example `/var/www/media/ddr/ddr-densho-10`).
    pub path: PathBuf,
    /// Directory holding collection directories (for example `/var/www/media/ddr`).
    pub base_path: PathBuf,
}

impl Collection {
    /// Create a handle with an explicit base path.
    pub fn new(path: impl Into<PathBuf>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            base_path: base_path.into(),
        }
    }

    /// Create a handle whose base path is the collection's parent directory.
    ///
    /// The path is canonicalized first, so `.` or a symlinked collection
    /// directory resolves against its real parent. The directory must exist.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().canonicalize()?;
        let base_path = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(Self { path, base_path })
    }

    /// Collection id, taken from the directory name.
    pub fn id(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}

/// Options for one signature-assignment run.
#[derive(Clone, Debug)]
pub struct SignatureConfig {
    /// Model declarations used for parsing, sorting, and matching.
    pub schema: Schema,
    /// Whether symlinks are followed while discovering sidecars.
    pub follow_links: bool,
    /// Whether paths with a `tmp` component are discovered.
    pub include_tmp: bool,
    /// Compute changes without writing any sidecar.
    pub dry_run: bool,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            schema: Schema::ddr(),
            follow_links: false,
            include_tmp: false,
            dry_run: false,
        }
    }
}

impl SignatureConfig {
    /// Use a custom schema.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Override symlink traversal during discovery.
    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Override whether `tmp` paths are discovered.
    pub fn with_include_tmp(mut self, include_tmp: bool) -> Self {
        self.include_tmp = include_tmp;
        self
    }

    /// Enable or disable dry runs.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
