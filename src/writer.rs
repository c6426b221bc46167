//! Writer: persists resolved signature ids back into parent sidecars.

use tracing::{debug, info};

use crate::errors::SignatureError;
use crate::hierarchy::Hierarchy;
use crate::schema::Schema;
use crate::sidecar::SidecarDocument;
use crate::types::RecordId;

/// A sidecar whose stored `signature_id` differs from the resolved one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureChange {
    /// Parent record whose sidecar changes.
    pub id: RecordId,
    /// Stored value before the write.
    pub previous: String,
    /// Value to write.
    pub signature_id: String,
}

/// Compare every parent record's sidecar with its resolved signature.
///
/// Sidecars are re-read from disk, so changes made since loading are taken
/// into account. Nothing is written.
pub fn plan_changes(
    hierarchy: &Hierarchy,
    schema: &Schema,
) -> Result<Vec<(SignatureChange, SidecarDocument)>, SignatureError> {
    let mut pending = Vec::new();
    for record in hierarchy.top_down() {
        if !schema.is_parent(record.model()) {
            continue;
        }
        let Some(resolved) = record.signature_id() else {
            continue;
        };
        let document = SidecarDocument::read(record.sidecar_path())?;
        let previous = document.signature_id()?;
        if previous == resolved {
            continue;
        }
        pending.push((
            SignatureChange {
                id: record.id().to_string(),
                previous,
                signature_id: resolved.to_string(),
            },
            document,
        ));
    }
    Ok(pending)
}

/// Write resolved signatures and return the ids whose sidecar changed.
///
/// All sidecars are compared before the first write, so a malformed sidecar
/// aborts the run with nothing written. With `dry_run` the changed ids are
/// returned but no sidecar is touched.
pub fn write_signatures(
    hierarchy: &Hierarchy,
    schema: &Schema,
    dry_run: bool,
) -> Result<Vec<RecordId>, SignatureError> {
    let pending = plan_changes(hierarchy, schema)?;
    let total = pending.len();
    let mut updated = Vec::with_capacity(total);
    for (n, (change, mut document)) in pending.into_iter().enumerate() {
        debug!(
            progress = format_args!("{}/{}", n + 1, total),
            id = %change.id,
            previous = %change.previous,
            signature_id = %change.signature_id,
            dry_run,
            "signature changed"
        );
        if !dry_run {
            document.set_signature_id(&change.signature_id);
            document.write()?;
        }
        updated.push(change.id);
    }
    info!(updated = updated.len(), dry_run, "signature ids written");
    Ok(updated)
}
