#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runner shared by the `ddr-signatures` binary.
pub mod cli;
/// Collection handles and run options.
pub mod config;
/// Centralized constants for identifiers, layout, sidecars, and discovery.
pub mod constants;
/// Sorted arena of loaded records.
pub mod hierarchy;
/// Identifier parsing and on-disk locations.
pub mod identifier;
/// Sidecar discovery results into a sorted hierarchy.
pub mod loader;
/// Immediate-signature selection.
pub mod matcher;
/// Whitelisted sidecar field keys.
pub mod metadata;
/// Record and sort-key types.
pub mod record;
/// Signature chain resolution.
pub mod resolver;
/// Model-level declarations.
pub mod schema;
/// Sidecar document reading and rewriting.
pub mod sidecar;
/// End-to-end signature assignment.
pub mod signatures;
/// Input transports (filesystem discovery).
pub mod transport;
/// Shared type aliases.
pub mod types;
/// Persisting resolved signatures.
pub mod writer;

mod errors;

#[cfg(test)]
mod test_fixtures;

pub use config::{Collection, SignatureConfig};
pub use errors::{ParseError, SignatureError};
pub use hierarchy::Hierarchy;
pub use identifier::Identifier;
pub use record::{Record, RecordSummary};
pub use schema::Schema;
pub use signatures::{
    Assignment, SignatureSet, assign_signatures, assign_signatures_with, signatures,
};
pub use types::{ModelName, RecordId};
