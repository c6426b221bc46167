use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::ParseError;
use crate::identifier::{Identifier, PartValue};
use crate::schema::{ModelSpec, PartKind, Schema, SortPosition};
use crate::types::{ModelName, RecordIndex};

/// Ordering key for records of one model: structural parts with `sort`
/// spliced in at the model's declared position.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey(Vec<PartValue>);

impl SortKey {
    /// Build a sort key by walking `identifier`'s parts in order.
    ///
    /// Role parts are replaced by their schema rank, so `mezzanine` files sort
    /// ahead of `master` files.
    pub fn build(identifier: &Identifier, spec: &ModelSpec, schema: &Schema, sort: i64) -> Self {
        let mut values = Vec::with_capacity(identifier.parts().len() + 1);
        for part in identifier.parts() {
            if spec.sort_position == SortPosition::Before(part.name) {
                values.push(PartValue::Number(sort));
            }
            let value = match (&part.value, part.kind) {
                (PartValue::Text(role), PartKind::Role) => schema
                    .role_rank(role)
                    .map(PartValue::Number)
                    .unwrap_or_else(|| part.value.clone()),
                _ => part.value.clone(),
            };
            values.push(value);
        }
        if spec.sort_position == SortPosition::End {
            values.push(PartValue::Number(sort));
        }
        Self(values)
    }

    /// Key components in comparison order.
    pub fn values(&self) -> &[PartValue] {
        &self.0
    }
}

/// In-memory view of one object used for signature selection.
#[derive(Clone, Debug)]
pub struct Record {
    identifier: Identifier,
    sort: i64,
    sort_key: SortKey,
    sidecar_path: PathBuf,
    stored_signature_id: String,
    pub(crate) signature: Option<RecordIndex>,
    pub(crate) signature_id: Option<String>,
}

impl Record {
    /// Assemble a record whose sort key follows the schema's splice position.
    pub fn new(
        identifier: Identifier,
        schema: &Schema,
        sort: i64,
        stored_signature_id: String,
        sidecar_path: PathBuf,
    ) -> Result<Self, ParseError> {
        let spec = schema
            .model(identifier.model())
            .ok_or_else(|| ParseError::Identifier {
                id: identifier.id().to_string(),
                reason: format!("model '{}' is not declared", identifier.model()),
            })?;
        let sort_key = SortKey::build(&identifier, spec, schema, sort);
        Ok(Self {
            identifier,
            sort,
            sort_key,
            sidecar_path,
            stored_signature_id,
            signature: None,
            signature_id: None,
        })
    }

    /// Object identifier.
    pub fn id(&self) -> &str {
        self.identifier.id()
    }

    /// Model level of this record.
    pub fn model(&self) -> ModelName {
        self.identifier.model()
    }

    /// Parsed identifier.
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// `sort` read from the sidecar (default `1`).
    pub fn sort(&self) -> i64 {
        self.sort
    }

    /// Ordering key within the model level.
    pub fn sort_key(&self) -> &SortKey {
        &self.sort_key
    }

    /// Sidecar this record was read from.
    pub fn sidecar_path(&self) -> &Path {
        &self.sidecar_path
    }

    /// `signature_id` as stored in the sidecar when the run started.
    pub fn stored_signature_id(&self) -> &str {
        &self.stored_signature_id
    }

    /// Arena index of the immediate signature, once matched.
    pub fn signature(&self) -> Option<RecordIndex> {
        self.signature
    }

    /// Resolved signature id, once the chain has been followed.
    pub fn signature_id(&self) -> Option<&str> {
        self.signature_id.as_deref()
    }

    /// Serializable summary of this record.
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            id: self.id().to_string(),
            model: self.model(),
            sort: self.sort,
            signature_id: self.signature_id.clone().unwrap_or_default(),
        }
    }

    /// Total order within a model level: sort key first, id on ties.
    pub fn cmp_order(&self, other: &Self) -> Ordering {
        self.sort_key
            .cmp(&other.sort_key)
            .then_with(|| self.id().cmp(other.id()))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} {} sort={} sid={}>",
            self.model(),
            self.id(),
            self.sort,
            self.signature_id.as_deref().unwrap_or("-")
        )
    }
}

/// Flat view of a record's resolved state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    /// Object identifier.
    pub id: String,
    /// Model level.
    pub model: ModelName,
    /// Sidecar `sort` value.
    pub sort: i64,
    /// Resolved signature; empty when none was found.
    pub signature_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, sort: i64) -> Record {
        let schema = Schema::ddr();
        let identifier = Identifier::parse(id, "/base", &schema).unwrap();
        Record::new(identifier, &schema, sort, String::new(), PathBuf::new()).unwrap()
    }

    fn n(value: i64) -> PartValue {
        PartValue::Number(value)
    }

    fn t(value: &str) -> PartValue {
        PartValue::Text(value.to_string())
    }

    #[test]
    fn file_sort_is_spliced_before_hash_and_role_is_ranked() {
        let file = record("ddr-densho-10-1-master-a1b2c3d4e5", 7);
        assert_eq!(
            file.sort_key().values(),
            &[
                t("ddr"),
                t("densho"),
                n(10),
                n(1),
                n(1),
                n(7),
                t("a1b2c3d4e5")
            ]
        );
    }

    #[test]
    fn entity_sort_is_spliced_before_entity_number() {
        let entity = record("ddr-densho-10-4", 2);
        assert_eq!(
            entity.sort_key().values(),
            &[t("ddr"), t("densho"), n(10), n(2), n(4)]
        );
    }

    #[test]
    fn other_levels_append_sort() {
        let collection = record("ddr-densho-10", 3);
        assert_eq!(
            collection.sort_key().values(),
            &[t("ddr"), t("densho"), n(10), n(3)]
        );
        let segment = record("ddr-densho-10-4-2", 5);
        assert_eq!(segment.sort_key().values().last(), Some(&n(5)));
    }

    #[test]
    fn files_order_by_role_then_sort_then_hash() {
        let master_low = record("ddr-densho-10-1-master-ffffffffff", 1);
        let master_high = record("ddr-densho-10-1-master-0000000000", 2);
        let mezzanine = record("ddr-densho-10-1-mezzanine-ffffffffff", 9);
        assert_eq!(mezzanine.cmp_order(&master_low), Ordering::Less);
        assert_eq!(master_low.cmp_order(&master_high), Ordering::Less);
    }

    #[test]
    fn entity_sort_outranks_entity_number() {
        let first = record("ddr-densho-10-9", 1);
        let second = record("ddr-densho-10-2", 5);
        assert_eq!(first.cmp_order(&second), Ordering::Less);
    }

    #[test]
    fn display_shows_model_sort_and_signature() {
        let mut entity = record("ddr-densho-10-1", 1);
        assert_eq!(entity.to_string(), "<entity ddr-densho-10-1 sort=1 sid=->");
        entity.signature_id = Some("ddr-densho-10-1-master-a1b2c3d4e5".into());
        assert_eq!(
            entity.to_string(),
            "<entity ddr-densho-10-1 sort=1 sid=ddr-densho-10-1-master-a1b2c3d4e5>"
        );
    }
}
