//! Chain resolver: follows immediate signatures down to a terminal file.

use std::collections::HashSet;

use tracing::warn;

use crate::errors::SignatureError;
use crate::hierarchy::Hierarchy;
use crate::schema::Schema;
use crate::types::{RecordId, RecordIndex};

/// Follow immediate signatures from `start` to the end of the chain.
///
/// Returns the terminal record's id when it is file-level, and an empty id when
/// the chain stops at a parent with no matching descendant. A chain that visits
/// a record twice is reported as `SignatureError::Cycle`.
///
/// # Panics
///
/// Panics if `start` is not an index of `hierarchy`.
pub fn resolve(
    hierarchy: &Hierarchy,
    start: RecordIndex,
    schema: &Schema,
) -> Result<RecordId, SignatureError> {
    let mut visited: HashSet<RecordIndex> = HashSet::new();
    let mut current = start;
    while visited.insert(current) {
        match hierarchy[current].signature() {
            Some(next) => current = next,
            None => {
                let terminal = &hierarchy[current];
                return Ok(if schema.is_leaf(terminal.model()) {
                    terminal.id().to_string()
                } else {
                    RecordId::new()
                });
            }
        }
    }
    Err(SignatureError::Cycle {
        start: hierarchy[start].id().to_string(),
        repeated: hierarchy[current].id().to_string(),
    })
}

/// Resolve every record and store its signature id.
///
/// Resolution completes for the whole hierarchy before anything is stored, so
/// a cycle leaves every record unresolved. Returns the ids of parent records
/// that resolved to no file, top-down.
pub fn resolve_all(
    hierarchy: &mut Hierarchy,
    schema: &Schema,
) -> Result<Vec<RecordId>, SignatureError> {
    let resolved = hierarchy
        .top_down_indices()
        .map(|idx| resolve(hierarchy, idx, schema).map(|signature_id| (idx, signature_id)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut unresolved = Vec::new();
    for (idx, signature_id) in resolved {
        let record = &hierarchy[idx];
        if signature_id.is_empty() && schema.is_parent(record.model()) {
            warn!(id = %record.id(), model = record.model(), "no signature file found");
            unresolved.push(record.id().to_string());
        }
        hierarchy.set_signature_id(idx, signature_id);
    }
    Ok(unresolved)
}
