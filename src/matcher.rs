//! Signature matcher: links each parent record to its first contained child.

use tracing::debug;

use crate::hierarchy::Hierarchy;
use crate::schema::Schema;

/// Choose an immediate signature for every parent record, bottom-up.
///
/// For each `(parent, child)` model pair, each parent takes the first child
/// (lowest sort key) whose id sits structurally within the parent's id. A
/// later pair for the same parent model replaces an earlier match, so an
/// entity with segments is represented through a segment rather than a
/// direct file. Returns the number of links made.
pub fn match_signatures(hierarchy: &mut Hierarchy, schema: &Schema) -> usize {
    let mut linked = 0;
    for (parent_model, child_model) in schema.parent_child_pairs() {
        let parents = hierarchy.indices(parent_model).to_vec();
        let children = hierarchy.indices(child_model).to_vec();
        debug!(
            parent_model,
            child_model,
            parents = parents.len(),
            children = children.len(),
            "choosing signatures"
        );
        for parent in parents {
            let parent_id = hierarchy[parent].id();
            let found = children
                .iter()
                .copied()
                .find(|child| hierarchy[*child].identifier().is_within(parent_id));
            if let Some(child) = found {
                hierarchy.link(parent, child);
                linked += 1;
            }
        }
    }
    linked
}
