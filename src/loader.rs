//! Metadata loader: builds one `Record` per sidecar and groups them into a
//! sorted `Hierarchy`.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{ParseError, SignatureError};
use crate::hierarchy::Hierarchy;
use crate::identifier::{Identifier, PathKind};
use crate::record::Record;
use crate::schema::Schema;
use crate::sidecar::SidecarDocument;

/// Load every sidecar in `paths` and return the sorted hierarchy.
///
/// Any unreadable or malformed sidecar aborts the whole load; matching assumes
/// a complete tree.
pub fn load(
    paths: &[PathBuf],
    base_path: &Path,
    schema: &Schema,
) -> Result<Hierarchy, SignatureError> {
    debug!(paths = paths.len(), base_path = %base_path.display(), "loading identifiers");
    let records = paths
        .iter()
        .map(|path| load_record(path, base_path, schema))
        .collect::<Result<Vec<_>, _>>()?;
    let hierarchy = Hierarchy::from_records(records, schema)?;
    debug!(records = hierarchy.len(), "sorted identifiers");
    Ok(hierarchy)
}

/// Build the record described by one sidecar path.
pub fn load_record(
    path: &Path,
    base_path: &Path,
    schema: &Schema,
) -> Result<Record, SignatureError> {
    let raw_id = raw_id_for_path(path, schema)?;
    let identifier = Identifier::parse(&raw_id, base_path, schema)?;
    let sidecar_path = identifier.path(PathKind::Sidecar, schema)?;
    let fields = SidecarDocument::read(&sidecar_path)?.fields()?;
    Ok(Record::new(
        identifier,
        schema,
        fields.sort,
        fields.signature_id,
        sidecar_path,
    )?)
}

/// Raw identifier for a sidecar path.
///
/// Directory-level sidecars (`collection.json`, `entity.json`) are named after
/// their enclosing directory; file-level sidecars after their own stem.
pub fn raw_id_for_path(path: &Path, schema: &Schema) -> Result<String, ParseError> {
    let file_name = path.file_name().and_then(|name| name.to_str());
    let raw = match file_name {
        Some(name) if schema.is_directory_sidecar(name) => path
            .parent()
            .and_then(|dir| dir.file_name())
            .and_then(|name| name.to_str()),
        Some(_) => path.file_stem().and_then(|stem| stem.to_str()),
        None => None,
    };
    raw.map(str::to_string).ok_or_else(|| ParseError::Path {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::FixtureTree;
    use crate::transport::fs::find_meta_files;

    #[test]
    fn raw_ids_come_from_directory_or_stem() {
        let schema = Schema::ddr();
        assert_eq!(
            raw_id_for_path(
                Path::new("/b/ddr-densho-10/files/ddr-densho-10-1/entity.json"),
                &schema
            )
            .unwrap(),
            "ddr-densho-10-1"
        );
        assert_eq!(
            raw_id_for_path(
                Path::new("/b/ddr-densho-10/files/ddr-densho-10-1/files/ddr-densho-10-1-master-a1b2c3d4e5.json"),
                &schema
            )
            .unwrap(),
            "ddr-densho-10-1-master-a1b2c3d4e5"
        );
        assert!(raw_id_for_path(Path::new("/"), &schema).is_err());
    }

    #[test]
    fn load_groups_by_model_and_reads_fields() {
        let tree = FixtureTree::new();
        tree.add("ddr-densho-10", None);
        tree.add("ddr-densho-10-1", Some(4));
        tree.add("ddr-densho-10-1-master-bbbbbbbbbb", Some(1));
        tree.add("ddr-densho-10-1-master-aaaaaaaaaa", Some(2));
        let schema = Schema::ddr();
        let paths = find_meta_files(tree.collection_dir(), &schema).unwrap();

        let hierarchy = load(&paths, tree.base(), &schema).unwrap();

        assert_eq!(hierarchy.len(), 4);
        let entity = hierarchy.find("ddr-densho-10-1").unwrap();
        assert_eq!(entity.sort(), 4);
        assert_eq!(hierarchy.find("ddr-densho-10").unwrap().sort(), 1);
        let files: Vec<&str> = hierarchy.model_records("file").map(Record::id).collect();
        assert_eq!(
            files,
            vec![
                "ddr-densho-10-1-master-bbbbbbbbbb",
                "ddr-densho-10-1-master-aaaaaaaaaa"
            ]
        );
    }

    #[test]
    fn load_order_does_not_depend_on_path_order() {
        let tree = FixtureTree::new();
        tree.add("ddr-densho-10", None);
        tree.add("ddr-densho-10-2", Some(1));
        tree.add("ddr-densho-10-1", Some(1));
        tree.add("ddr-densho-10-3", Some(0));
        let schema = Schema::ddr();
        let mut paths = find_meta_files(tree.collection_dir(), &schema).unwrap();

        let forward = load(&paths, tree.base(), &schema).unwrap();
        paths.reverse();
        let backward = load(&paths, tree.base(), &schema).unwrap();

        let ids = |h: &Hierarchy| h.top_down().map(|r| r.id().to_string()).collect::<Vec<_>>();
        assert_eq!(ids(&forward), ids(&backward));
        assert_eq!(
            ids(&forward),
            vec![
                "ddr-densho-10",
                "ddr-densho-10-3",
                "ddr-densho-10-1",
                "ddr-densho-10-2"
            ]
        );
    }

    #[test]
    fn unparsable_id_aborts_load() {
        let tree = FixtureTree::new();
        tree.add("ddr-densho-10", None);
        let bogus = tree
            .collection_dir()
            .join("files")
            .join("not-a-valid-id")
            .join("entity.json");
        tree.write_raw(&bogus, "[]");
        let schema = Schema::ddr();
        let paths = find_meta_files(tree.collection_dir(), &schema).unwrap();

        let err = load(&paths, tree.base(), &schema).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn malformed_sidecar_aborts_load() {
        let tree = FixtureTree::new();
        let path = tree.add("ddr-densho-10", None);
        tree.write_raw(&path, "{not json");
        let schema = Schema::ddr();

        let err = load(&[path], tree.base(), &schema).unwrap_err();
        assert!(matches!(
            err,
            SignatureError::Parse(ParseError::Sidecar { .. })
        ));
    }
}
