//! Hierarchy schema: which model levels exist, how their identifiers are
//! shaped, where their sidecars live, and which levels parent which.
//!
//! The identifier parser, the loader's sort keys, and the matcher's pass order
//! all read from the same `Schema`, so role ranks and parent/child pairs are
//! declared exactly once.

use std::collections::HashSet;

use crate::constants::schema::{
    COLLECTION_SIDECAR, ENTITY_SIDECAR, MODEL_COLLECTION, MODEL_ENTITY, MODEL_FILE, MODEL_SEGMENT,
    ROLES,
};
use crate::errors::SignatureError;
use crate::types::{ModelName, PartName, RoleName};

/// Kind of token accepted at one position of an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartKind {
    /// Non-empty ASCII alphanumerics (repository and organization codes).
    Text,
    /// ASCII digits, compared numerically.
    Number,
    /// A role declared by the schema, ordered by its rank.
    Role,
    /// Fixed-length hex content hash.
    Hash,
}

/// One named position of an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartSpec {
    /// Part name used by sort positions and lookups.
    pub name: PartName,
    /// Accepted token kind.
    pub kind: PartKind,
}

impl PartSpec {
    /// Declare a named part.
    pub const fn new(name: PartName, kind: PartKind) -> Self {
        Self { name, kind }
    }
}

/// One accepted identifier shape for a model.
#[derive(Clone, Copy, Debug)]
pub struct IdShape {
    /// Token layout, in identifier order.
    pub parts: &'static [PartSpec],
    /// Leading token count and model of the owning object, if any.
    pub parent: Option<(usize, ModelName)>,
}

/// Where a model's sidecar lives relative to its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SidecarLayout {
    /// The object owns a directory named after its id holding this sidecar.
    Directory(&'static str),
    /// The sidecar is `{id}.json` inside the parent's children directory.
    Named,
}

/// Where the sidecar `sort` value is spliced into a model's sort key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortPosition {
    /// Immediately before the named part.
    Before(PartName),
    /// After every structural part.
    End,
}

/// Declaration of one model level.
#[derive(Clone, Copy, Debug)]
pub struct ModelSpec {
    /// Model name (for example `entity`).
    pub name: ModelName,
    /// Accepted identifier shapes, tried in order.
    pub shapes: &'static [IdShape],
    /// Sidecar location.
    pub layout: SidecarLayout,
    /// Where `sort` enters the sort key.
    pub sort_position: SortPosition,
    /// Models this one can parent; empty for leaf models.
    pub children: &'static [ModelName],
}

const REPO: PartSpec = PartSpec::new("repo", PartKind::Text);
const ORG: PartSpec = PartSpec::new("org", PartKind::Text);
const CID: PartSpec = PartSpec::new("cid", PartKind::Number);
const EID: PartSpec = PartSpec::new("eid", PartKind::Number);
const SID: PartSpec = PartSpec::new("sid", PartKind::Number);
const ROLE: PartSpec = PartSpec::new("role", PartKind::Role);
const SHA1: PartSpec = PartSpec::new("sha1", PartKind::Hash);

const DDR_MODELS: [ModelSpec; 4] = [
    ModelSpec {
        name: MODEL_COLLECTION,
        shapes: &[IdShape {
            parts: &[REPO, ORG, CID],
            parent: None,
        }],
        layout: SidecarLayout::Directory(COLLECTION_SIDECAR),
        sort_position: SortPosition::End,
        children: &[MODEL_ENTITY],
    },
    ModelSpec {
        name: MODEL_ENTITY,
        shapes: &[IdShape {
            parts: &[REPO, ORG, CID, EID],
            parent: Some((3, MODEL_COLLECTION)),
        }],
        layout: SidecarLayout::Directory(ENTITY_SIDECAR),
        sort_position: SortPosition::Before("eid"),
        children: &[MODEL_SEGMENT, MODEL_FILE],
    },
    ModelSpec {
        name: MODEL_SEGMENT,
        shapes: &[IdShape {
            parts: &[REPO, ORG, CID, EID, SID],
            parent: Some((4, MODEL_ENTITY)),
        }],
        layout: SidecarLayout::Directory(ENTITY_SIDECAR),
        sort_position: SortPosition::End,
        children: &[MODEL_FILE],
    },
    ModelSpec {
        name: MODEL_FILE,
        shapes: &[
            IdShape {
                parts: &[REPO, ORG, CID, EID, ROLE, SHA1],
                parent: Some((4, MODEL_ENTITY)),
            },
            IdShape {
                parts: &[REPO, ORG, CID, EID, SID, ROLE, SHA1],
                parent: Some((5, MODEL_SEGMENT)),
            },
        ],
        layout: SidecarLayout::Named,
        sort_position: SortPosition::Before("sha1"),
        children: &[],
    },
];

/// Validated set of model declarations, top-down.
#[derive(Clone, Debug)]
pub struct Schema {
    models: Vec<ModelSpec>,
    roles: Vec<(RoleName, i64)>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::ddr()
    }
}

impl Schema {
    /// The DDR collection → entity → segment → file hierarchy.
    pub fn ddr() -> Self {
        Self {
            models: DDR_MODELS.to_vec(),
            roles: ROLES.to_vec(),
        }
    }

    /// Build a custom schema.
    ///
    /// Models must be declared top-down: every child is declared after each of
    /// its parents, which keeps the parent/child graph acyclic.
    pub fn new(
        models: Vec<ModelSpec>,
        roles: Vec<(RoleName, i64)>,
    ) -> Result<Self, SignatureError> {
        let mut seen: HashSet<ModelName> = HashSet::new();
        for model in &models {
            if !seen.insert(model.name) {
                return Err(SignatureError::Schema(format!(
                    "model '{}' is declared twice",
                    model.name
                )));
            }
            if model.shapes.is_empty() {
                return Err(SignatureError::Schema(format!(
                    "model '{}' declares no identifier shape",
                    model.name
                )));
            }
            for shape in model.shapes {
                if let Some((len, parent)) = shape.parent {
                    if len == 0 || len >= shape.parts.len() {
                        return Err(SignatureError::Schema(format!(
                            "model '{}' has a parent prefix of {len} tokens out of {}",
                            model.name,
                            shape.parts.len()
                        )));
                    }
                    if !seen.contains(parent) || parent == model.name {
                        return Err(SignatureError::Schema(format!(
                            "model '{}' names parent '{parent}' that is not declared above it",
                            model.name
                        )));
                    }
                }
                if let SortPosition::Before(part) = model.sort_position
                    && !shape.parts.iter().any(|spec| spec.name == part)
                {
                    return Err(SignatureError::Schema(format!(
                        "model '{}' splices sort before unknown part '{part}'",
                        model.name
                    )));
                }
            }
        }
        for model in &models {
            for child in model.children {
                let declared_below = models
                    .iter()
                    .skip_while(|candidate| candidate.name != model.name)
                    .skip(1)
                    .any(|candidate| candidate.name == *child);
                if !declared_below {
                    return Err(SignatureError::Schema(format!(
                        "model '{}' lists child '{child}' that is not declared below it",
                        model.name
                    )));
                }
            }
        }
        Ok(Self { models, roles })
    }

    /// Model declarations, top-down.
    pub fn models(&self) -> &[ModelSpec] {
        &self.models
    }

    /// Look up a model by name.
    pub fn model(&self, name: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|model| model.name == name)
    }

    /// True if the model can own children (and therefore carries a signature).
    pub fn is_parent(&self, name: &str) -> bool {
        self.model(name)
            .map(|model| !model.children.is_empty())
            .unwrap_or(false)
    }

    /// True for leaf (file-level) models.
    pub fn is_leaf(&self, name: &str) -> bool {
        self.model(name)
            .map(|model| model.children.is_empty())
            .unwrap_or(false)
    }

    /// Sort rank of a declared role.
    pub fn role_rank(&self, role: &str) -> Option<i64> {
        self.roles
            .iter()
            .find(|(name, _)| *name == role)
            .map(|(_, rank)| *rank)
    }

    /// Parent/child model pairs ordered bottom-up.
    ///
    /// Pairs are listed top-down in declaration order and then reversed, so a
    /// parent level is only matched after every level below it.
    pub fn parent_child_pairs(&self) -> Vec<(ModelName, ModelName)> {
        let mut pairs: Vec<(ModelName, ModelName)> = self
            .models
            .iter()
            .flat_map(|model| model.children.iter().map(|child| (model.name, *child)))
            .collect();
        pairs.reverse();
        pairs
    }

    /// Directory sidecar filenames, ordered from the lowest level that uses
    /// them up to the top (for example `entity.json` before `collection.json`).
    pub fn directory_sidecar_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for model in self.models.iter().rev() {
            if let SidecarLayout::Directory(name) = model.layout
                && !names.contains(&name)
            {
                names.push(name);
            }
        }
        names
    }

    /// True if `file_name` is a sidecar owned by a directory-level model.
    pub fn is_directory_sidecar(&self, file_name: &str) -> bool {
        self.models.iter().any(|model| {
            matches!(model.layout, SidecarLayout::Directory(name) if name == file_name)
        })
    }
}
