use std::collections::HashMap;
use std::ops::Index;

use indexmap::IndexMap;

use crate::errors::ParseError;
use crate::record::Record;
use crate::schema::Schema;
use crate::types::{ModelName, RecordId, RecordIndex};

/// Arena of records grouped by model.
///
/// Groups follow the schema's top-down declaration order and each group is
/// sorted ascending by sort key. Immediate signatures are arena indices, so a
/// record never owns another record.
#[derive(Clone, Debug, Default)]
pub struct Hierarchy {
    records: Vec<Record>,
    by_model: IndexMap<ModelName, Vec<RecordIndex>>,
    by_id: HashMap<RecordId, RecordIndex>,
}

impl Hierarchy {
    /// Group `records` by model and sort each group.
    pub fn from_records(records: Vec<Record>, schema: &Schema) -> Result<Self, ParseError> {
        let mut by_id = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if by_id.insert(record.id().to_string(), idx).is_some() {
                return Err(ParseError::DuplicateId(record.id().to_string()));
            }
        }

        let mut by_model: IndexMap<ModelName, Vec<RecordIndex>> = schema
            .models()
            .iter()
            .map(|model| (model.name, Vec::new()))
            .collect();
        for (idx, record) in records.iter().enumerate() {
            by_model.entry(record.model()).or_default().push(idx);
        }
        by_model.retain(|_, indices| !indices.is_empty());
        for indices in by_model.values_mut() {
            indices.sort_by(|a, b| records[*a].cmp_order(&records[*b]));
        }

        Ok(Self {
            records,
            by_model,
            by_id,
        })
    }

    /// Number of loaded records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at an arena index.
    pub fn get(&self, idx: RecordIndex) -> Option<&Record> {
        self.records.get(idx)
    }

    /// Look up a record by identifier.
    pub fn find(&self, id: &str) -> Option<&Record> {
        self.index_of(id).map(|idx| &self.records[idx])
    }

    /// Arena index of a record by identifier.
    pub fn index_of(&self, id: &str) -> Option<RecordIndex> {
        self.by_id.get(id).copied()
    }

    /// Models present in this hierarchy, top-down.
    pub fn models(&self) -> impl Iterator<Item = ModelName> + '_ {
        self.by_model.keys().copied()
    }

    /// Arena indices of one model, in ascending sort-key order.
    pub fn indices(&self, model: &str) -> &[RecordIndex] {
        self.by_model
            .get(model)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Records of one model, in ascending sort-key order.
    pub fn model_records<'a>(&'a self, model: &str) -> impl Iterator<Item = &'a Record> + 'a {
        self.indices(model).iter().map(|idx| &self.records[*idx])
    }

    /// Every record, model by model from the top level down.
    pub fn top_down(&self) -> impl Iterator<Item = &Record> + '_ {
        self.by_model
            .values()
            .flat_map(|indices| indices.iter().map(|idx| &self.records[*idx]))
    }

    /// Arena indices of every record, in `top_down` order.
    pub fn top_down_indices(&self) -> impl Iterator<Item = RecordIndex> + '_ {
        self.by_model.values().flat_map(|indices| indices.iter().copied())
    }

    /// The record chosen as `idx`'s immediate signature.
    pub fn immediate_signature(&self, idx: RecordIndex) -> Option<&Record> {
        self.records
            .get(idx)
            .and_then(|record| record.signature)
            .and_then(|sig| self.records.get(sig))
    }

    pub(crate) fn link(&mut self, parent: RecordIndex, child: RecordIndex) {
        if let Some(record) = self.records.get_mut(parent) {
            record.signature = Some(child);
        }
    }

    pub(crate) fn set_signature_id(&mut self, idx: RecordIndex, signature_id: String) {
        if let Some(record) = self.records.get_mut(idx) {
            record.signature_id = Some(signature_id);
        }
    }
}

impl Index<RecordIndex> for Hierarchy {
    type Output = Record;

    fn index(&self, idx: RecordIndex) -> &Self::Output {
        &self.records[idx]
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::identifier::Identifier;

    fn record(id: &str, sort: i64) -> Record {
        let schema = Schema::ddr();
        let identifier = Identifier::parse(id, "/base", &schema).unwrap();
        Record::new(identifier, &schema, sort, String::new(), PathBuf::new()).unwrap()
    }

    #[test]
    fn groups_are_top_down_and_sorted() {
        let schema = Schema::ddr();
        let hierarchy = Hierarchy::from_records(
            vec![
                record("ddr-densho-10-1-master-bbbbbbbbbb", 2),
                record("ddr-densho-10-2", 1),
                record("ddr-densho-10", 1),
                record("ddr-densho-10-1-master-aaaaaaaaaa", 1),
                record("ddr-densho-10-1", 1),
            ],
            &schema,
        )
        .unwrap();

        let models: Vec<&str> = hierarchy.models().collect();
        assert_eq!(models, vec!["collection", "entity", "file"]);

        let entities: Vec<&str> = hierarchy.model_records("entity").map(Record::id).collect();
        assert_eq!(entities, vec!["ddr-densho-10-1", "ddr-densho-10-2"]);

        let files: Vec<&str> = hierarchy.model_records("file").map(Record::id).collect();
        assert_eq!(
            files,
            vec![
                "ddr-densho-10-1-master-aaaaaaaaaa",
                "ddr-densho-10-1-master-bbbbbbbbbb"
            ]
        );

        let all: Vec<&str> = hierarchy.top_down().map(Record::id).collect();
        assert_eq!(all.first(), Some(&"ddr-densho-10"));
        assert_eq!(all.len(), 5);
        assert!(hierarchy.indices("segment").is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Hierarchy::from_records(
            vec![record("ddr-densho-10", 1), record("ddr-densho-10", 2)],
            &Schema::ddr(),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::DuplicateId(id) if id == "ddr-densho-10"));
    }

    #[test]
    fn link_sets_immediate_signature() {
        let mut hierarchy = Hierarchy::from_records(
            vec![
                record("ddr-densho-10-1", 1),
                record("ddr-densho-10-1-master-aaaaaaaaaa", 1),
            ],
            &Schema::ddr(),
        )
        .unwrap();
        let parent = hierarchy.index_of("ddr-densho-10-1").unwrap();
        let child = hierarchy.index_of("ddr-densho-10-1-master-aaaaaaaaaa").unwrap();
        assert!(hierarchy.immediate_signature(parent).is_none());
        hierarchy.link(parent, child);
        assert_eq!(
            hierarchy.immediate_signature(parent).map(Record::id),
            Some("ddr-densho-10-1-master-aaaaaaaaaa")
        );
    }
}
