/// Filesystem discovery of metadata sidecars.
pub mod fs;
