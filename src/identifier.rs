//! Identifier model: parses raw DDR ids into a model level plus named parts
//! and locates each object's files on disk.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::identifier::{
    CHILDREN_DIR, CONTENT_HASH_LEN, ID_SEPARATOR, SIDECAR_EXTENSION,
};
use crate::errors::ParseError;
use crate::schema::{IdShape, PartKind, Schema, SidecarLayout};
use crate::types::{ModelName, PartName, RecordId};

/// Typed value of one identifier part.
///
/// Numbers compare numerically so `ddr-densho-10-2` sorts before `ddr-densho-10-10`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PartValue {
    /// Digits-only token.
    Number(i64),
    /// Any other token (codes, roles, hashes).
    Text(String),
}

impl fmt::Display for PartValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// One named structural component of an identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Part {
    /// Part name declared by the shape.
    pub name: PartName,
    /// Token kind the part was matched as.
    pub kind: PartKind,
    /// Parsed token.
    pub value: PartValue,
}

/// Which on-disk location of an object to compute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathKind {
    /// The object's own directory (for files, the directory holding the file).
    Directory,
    /// The object's `.json` metadata sidecar.
    Sidecar,
}

/// A parsed object identifier.
#[derive(Clone, Debug)]
pub struct Identifier {
    id: RecordId,
    model: ModelName,
    parts: Vec<Part>,
    parent: Option<(RecordId, ModelName)>,
    base_path: PathBuf,
}

impl Identifier {
    /// Parse `raw_id` against every shape declared by `schema`, top-down.
    pub fn parse(
        raw_id: &str,
        base_path: impl Into<PathBuf>,
        schema: &Schema,
    ) -> Result<Self, ParseError> {
        let id = raw_id.trim();
        if id.is_empty() {
            return Err(invalid(raw_id, "identifier is empty"));
        }
        let tokens: Vec<&str> = id.split(ID_SEPARATOR).collect();
        for model in schema.models() {
            for shape in model.shapes {
                let Some(parts) = match_shape(&tokens, shape, schema) else {
                    continue;
                };
                let parent = shape
                    .parent
                    .map(|(len, parent_model)| (tokens[..len].join(ID_SEPARATOR), parent_model));
                return Ok(Self {
                    id: id.to_string(),
                    model: model.name,
                    parts,
                    parent,
                    base_path: base_path.into(),
                });
            }
        }
        Err(invalid(
            raw_id,
            "does not match any declared identifier shape",
        ))
    }

    /// The trimmed raw identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Model level the identifier matched.
    pub fn model(&self) -> ModelName {
        self.model
    }

    /// Structural parts in identifier order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Value of the named part, if this identifier has it.
    pub fn part(&self, name: &str) -> Option<&PartValue> {
        self.parts
            .iter()
            .find(|part| part.name == name)
            .map(|part| &part.value)
    }

    /// Id of the owning object (for example the entity that holds a file).
    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_ref().map(|(id, _)| id.as_str())
    }

    /// Directory that collection directories live in.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// True if this identifier sits structurally below `ancestor_id`.
    ///
    /// Containment respects token boundaries: `ddr-densho-10-12` is not within
    /// `ddr-densho-10-1`.
    pub fn is_within(&self, ancestor_id: &str) -> bool {
        self.id
            .strip_prefix(ancestor_id)
            .is_some_and(|rest| rest.starts_with(ID_SEPARATOR))
    }

    /// Filesystem location of this object's directory or sidecar.
    pub fn path(&self, kind: PathKind, schema: &Schema) -> Result<PathBuf, ParseError> {
        let spec = schema
            .model(self.model)
            .ok_or_else(|| invalid(&self.id, "model is not declared by the schema"))?;
        let container = match &self.parent {
            Some((parent_id, parent_model)) => {
                let parent = Identifier::parse(parent_id, &self.base_path, schema)?;
                if parent.model != *parent_model {
                    return Err(invalid(
                        &self.id,
                        &format!("parent '{parent_id}' is not a {parent_model}"),
                    ));
                }
                parent.path(PathKind::Directory, schema)?.join(CHILDREN_DIR)
            }
            None => self.base_path.clone(),
        };
        Ok(match (spec.layout, kind) {
            (SidecarLayout::Directory(_), PathKind::Directory) => container.join(&self.id),
            (SidecarLayout::Directory(name), PathKind::Sidecar) => {
                container.join(&self.id).join(name)
            }
            (SidecarLayout::Named, PathKind::Directory) => container,
            (SidecarLayout::Named, PathKind::Sidecar) => {
                container.join(format!("{}.{SIDECAR_EXTENSION}", self.id))
            }
        })
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

fn match_shape(tokens: &[&str], shape: &IdShape, schema: &Schema) -> Option<Vec<Part>> {
    if tokens.len() != shape.parts.len() {
        return None;
    }
    tokens
        .iter()
        .zip(shape.parts)
        .map(|(token, spec)| {
            let value = match spec.kind {
                PartKind::Text => {
                    if token.is_empty() || !token.chars().all(|ch| ch.is_ascii_alphanumeric()) {
                        return None;
                    }
                    PartValue::Text((*token).to_string())
                }
                PartKind::Number => {
                    if token.is_empty() || !token.chars().all(|ch| ch.is_ascii_digit()) {
                        return None;
                    }
                    PartValue::Number(token.parse().ok()?)
                }
                PartKind::Role => {
                    schema.role_rank(token)?;
                    PartValue::Text((*token).to_string())
                }
                PartKind::Hash => {
                    if token.len() != CONTENT_HASH_LEN
                        || !token.chars().all(|ch| ch.is_ascii_hexdigit())
                    {
                        return None;
                    }
                    PartValue::Text(token.to_ascii_lowercase())
                }
            };
            Some(Part {
                name: spec.name,
                kind: spec.kind,
                value,
            })
        })
        .collect()
}

fn invalid(id: &str, reason: &str) -> ParseError {
    ParseError::Identifier {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}
