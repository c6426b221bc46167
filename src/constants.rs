use crate::metadata::FieldKey;

/// Constants used by identifier parsing and on-disk layout.
pub mod identifier {
    /// Separator between identifier tokens (for example `ddr-densho-10`).
    pub const ID_SEPARATOR: &str = "-";
    /// Number of hex digits in a file identifier's content hash.
    pub const CONTENT_HASH_LEN: usize = 10;
    /// Directory that holds an object's children.
    pub const CHILDREN_DIR: &str = "files";
    /// Extension used by every metadata sidecar.
    pub const SIDECAR_EXTENSION: &str = "json";
}

/// Constants used by the built-in DDR hierarchy schema.
pub mod schema {
    /// Top-level archival collection.
    pub const MODEL_COLLECTION: &str = "collection";
    /// Described object within a collection.
    pub const MODEL_ENTITY: &str = "entity";
    /// Sub-object of an entity (for example one interview segment).
    pub const MODEL_SEGMENT: &str = "segment";
    /// Binary file attached to an entity or segment.
    pub const MODEL_FILE: &str = "file";

    /// Sidecar filename for collection directories.
    pub const COLLECTION_SIDECAR: &str = "collection.json";
    /// Sidecar filename for entity and segment directories.
    pub const ENTITY_SIDECAR: &str = "entity.json";

    /// File roles and their sort rank (lower sorts first).
    pub const ROLES: [(&str, i64); 3] = [("mezzanine", 0), ("master", 1), ("transcript", 2)];
}

/// Constants used when decoding and rewriting sidecar documents.
pub mod sidecar {
    use super::FieldKey;

    /// Sort field read from every sidecar.
    pub const FIELD_SORT: FieldKey = FieldKey::new("sort");
    /// Resolved signature field read from and written to parent sidecars.
    pub const FIELD_SIGNATURE_ID: FieldKey = FieldKey::new("signature_id");
    /// Sort value used when a sidecar has none.
    pub const DEFAULT_SORT: i64 = 1;
    /// Indentation used when rewriting sidecars.
    pub const WRITE_INDENT: &[u8] = b"    ";
}

/// Constants used by sidecar discovery.
pub mod discovery {
    /// Directory never descended into.
    pub const GIT_DIR: &str = ".git";
    /// Path fragment marking editor backup files.
    pub const BACKUP_MARKER: &str = "~";
    /// Path fragment marking scratch data, skipped unless explicitly included.
    pub const TMP_MARKER: &str = "tmp";
}
