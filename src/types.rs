/// Unique object identifier (stable across runs).
/// Examples: `ddr-densho-10`, `ddr-densho-10-1`, `ddr-densho-10-1-master-a1b2c3d4e5`
pub type RecordId = String;
/// Name of a model level declared by the hierarchy schema.
/// Examples: `collection`, `entity`, `segment`, `file`
pub type ModelName = &'static str;
/// Name of one structural part of an identifier.
/// Examples: `repo`, `org`, `cid`, `eid`, `sid`, `role`, `sha1`
pub type PartName = &'static str;
/// Name of a file role.
/// Examples: `mezzanine`, `master`, `transcript`
pub type RoleName = &'static str;
/// Sidecar field name recognized by the loader and writer.
/// Examples: `sort`, `signature_id`
pub type FieldName = &'static str;
/// Position of a record inside a `Hierarchy` arena.
pub type RecordIndex = usize;
