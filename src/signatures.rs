//! Signature assignment pipeline: load → match → resolve → write.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::config::{Collection, SignatureConfig};
use crate::errors::SignatureError;
use crate::hierarchy::Hierarchy;
use crate::loader::load;
use crate::matcher::match_signatures;
use crate::record::{Record, RecordSummary};
use crate::resolver::resolve_all;
use crate::schema::Schema;
use crate::transport::fs::MetaFileWalk;
use crate::types::RecordId;
use crate::writer::write_signatures;

/// Resolved signatures for one collection tree.
#[derive(Clone, Debug)]
pub struct SignatureSet {
    hierarchy: Hierarchy,
    unresolved: Vec<RecordId>,
}

impl SignatureSet {
    /// Loaded records with their resolved signatures.
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Parent records whose chain reached no file.
    pub fn unresolved(&self) -> &[RecordId] {
        &self.unresolved
    }

    /// Resolved signature id of `id`, if that record was loaded.
    pub fn signature_id(&self, id: &str) -> Option<&str> {
        self.hierarchy.find(id).and_then(Record::signature_id)
    }

    /// Every record, collection level first.
    pub fn top_down(&self) -> impl Iterator<Item = &Record> + '_ {
        self.hierarchy.top_down()
    }

    /// Summaries of every record, top-down.
    pub fn summaries(&self) -> Vec<RecordSummary> {
        self.top_down().map(Record::summary).collect()
    }
}

/// Outcome of an assignment run.
#[derive(Clone, Debug)]
pub struct Assignment {
    /// Resolved signatures for every loaded record.
    pub signatures: SignatureSet,
    /// Ids whose sidecar changed (or would change, on a dry run).
    pub updated: Vec<RecordId>,
}

/// Choose signatures for the objects in `paths` without writing anything.
pub fn signatures(
    paths: &[PathBuf],
    base_path: &Path,
    schema: &Schema,
) -> Result<SignatureSet, SignatureError> {
    let mut hierarchy = load(paths, base_path, schema)?;
    let linked = match_signatures(&mut hierarchy, schema);
    debug!(linked, "replacing signature links with ids");
    let unresolved = resolve_all(&mut hierarchy, schema)?;
    Ok(SignatureSet {
        hierarchy,
        unresolved,
    })
}

/// Read a collection's sidecars, assign signatures, and write the changes.
///
/// Returns the ids of objects whose `signature_id` changed. Changed sidecars
/// are left uncommitted.
pub fn assign_signatures(collection: &Collection) -> Result<Vec<RecordId>, SignatureError> {
    Ok(assign_signatures_with(collection, &SignatureConfig::default())?.updated)
}

/// `assign_signatures` with explicit options.
pub fn assign_signatures_with(
    collection: &Collection,
    config: &SignatureConfig,
) -> Result<Assignment, SignatureError> {
    let start = Instant::now();
    info!(
        collection = %collection.path.display(),
        base_path = %collection.base_path.display(),
        "collecting identifiers"
    );
    let paths = MetaFileWalk::new(&collection.path)
        .with_follow_links(config.follow_links)
        .with_include_tmp(config.include_tmp)
        .find_files_first(&config.schema)?;
    let signatures = signatures(&paths, &collection.base_path, &config.schema)?;

    debug!("writing changes");
    let updated = write_signatures(signatures.hierarchy(), &config.schema, config.dry_run)?;
    info!(
        updated = updated.len(),
        unresolved = signatures.unresolved().len(),
        elapsed = ?start.elapsed(),
        "signature assignment done"
    );
    if !config.dry_run && !updated.is_empty() {
        info!("metadata files are not committed");
    }
    Ok(Assignment {
        signatures,
        updated,
    })
}
