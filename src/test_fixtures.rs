//! On-disk collection trees for unit tests.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};

use crate::identifier::{Identifier, PathKind};
use crate::schema::Schema;

pub(crate) const COLLECTION_ID: &str = "ddr-densho-10";

/// A collection tree laid out under a temporary base path.
pub(crate) struct FixtureTree {
    temp: TempDir,
    schema: Schema,
}

impl FixtureTree {
    pub(crate) fn new() -> Self {
        Self {
            temp: tempdir().unwrap(),
            schema: Schema::ddr(),
        }
    }

    pub(crate) fn base(&self) -> &Path {
        self.temp.path()
    }

    pub(crate) fn collection_dir(&self) -> PathBuf {
        self.base().join(COLLECTION_ID)
    }

    /// Write a sidecar holding `id` and, when given, `sort`.
    pub(crate) fn add(&self, id: &str, sort: Option<i64>) -> PathBuf {
        let mut entries = vec![json!({"id": id})];
        if let Some(sort) = sort {
            entries.push(json!({"sort": sort}));
        }
        self.add_document(id, Value::Array(entries))
    }

    /// Write an arbitrary document at `id`'s sidecar path.
    pub(crate) fn add_document(&self, id: &str, document: Value) -> PathBuf {
        let path = self.sidecar_path(id);
        self.write_raw(&path, &serde_json::to_string_pretty(&document).unwrap());
        path
    }

    pub(crate) fn write_raw(&self, path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }

    pub(crate) fn sidecar_path(&self, id: &str) -> PathBuf {
        Identifier::parse(id, self.base(), &self.schema)
            .unwrap()
            .path(PathKind::Sidecar, &self.schema)
            .unwrap()
    }

    pub(crate) fn read_signature_id(&self, id: &str) -> Option<String> {
        let text = fs::read_to_string(self.sidecar_path(id)).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        value.as_array().unwrap().iter().find_map(|entry| {
            entry
                .get("signature_id")
                .map(|sid| sid.as_str().unwrap_or_default().to_string())
        })
    }
}
