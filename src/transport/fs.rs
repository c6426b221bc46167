use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::constants::discovery::{BACKUP_MARKER, GIT_DIR, TMP_MARKER};
use crate::constants::identifier::SIDECAR_EXTENSION;
use crate::errors::SignatureError;
use crate::schema::Schema;

/// Recursive walk that lists metadata sidecars under a collection root.
///
/// Every call walks the tree afresh; nothing is cached between calls.
pub struct MetaFileWalk {
    root: PathBuf,
    follow_links: bool,
    include_tmp: bool,
}

impl MetaFileWalk {
    /// Create a walk rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            follow_links: false,
            include_tmp: false,
        }
    }

    /// Configure symlink traversal.
    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Include paths with a `tmp` component (skipped by default).
    pub fn with_include_tmp(mut self, include_tmp: bool) -> Self {
        self.include_tmp = include_tmp;
        self
    }

    /// List sidecars with file-level sidecars first, then directory sidecars
    /// from the lowest level up to the collection.
    ///
    /// Within each group paths keep walk order (sorted by file name).
    pub fn find_files_first(&self, schema: &Schema) -> Result<Vec<PathBuf>, SignatureError> {
        let directory_names = schema.directory_sidecar_names();
        let mut ranked: Vec<(usize, PathBuf)> = self
            .find()?
            .into_iter()
            .map(|path| {
                let rank = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| directory_names.iter().position(|dir| *dir == name))
                    .map(|pos| pos + 1)
                    .unwrap_or(0);
                (rank, path)
            })
            .collect();
        ranked.sort_by_key(|(rank, _)| *rank);
        Ok(ranked.into_iter().map(|(_, path)| path).collect())
    }

    /// List sidecars in walk order.
    pub fn find(&self) -> Result<Vec<PathBuf>, SignatureError> {
        let walker = WalkDir::new(&self.root)
            .follow_links(self.follow_links)
            .sort_by_file_name();
        let mut paths = Vec::new();
        for entry in walker
            .into_iter()
            .filter_entry(|entry| entry.file_name() != GIT_DIR)
        {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_sidecar_file(entry.path()) {
                continue;
            }
            if self.is_excluded(entry.path()) {
                debug!(path = %entry.path().display(), "skipping excluded sidecar");
                continue;
            }
            paths.push(entry.into_path());
        }
        debug!(root = %self.root.display(), count = paths.len(), "found metadata files");
        Ok(paths)
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        relative.components().any(|component| {
            let Component::Normal(part) = component else {
                return false;
            };
            let part = part.to_string_lossy();
            part.ends_with(BACKUP_MARKER) || (!self.include_tmp && part.contains(TMP_MARKER))
        })
    }
}

/// All sidecars under `root`, file-level sidecars first.
pub fn find_meta_files(
    root: impl Into<PathBuf>,
    schema: &Schema,
) -> Result<Vec<PathBuf>, SignatureError> {
    MetaFileWalk::new(root).find_files_first(schema)
}

/// True if the path has a `.json` extension (case-insensitive).
pub fn is_sidecar_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(SIDECAR_EXTENSION))
        .unwrap_or(false)
}
