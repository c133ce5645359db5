//! Data locations: the environment-settings collaborator, typed.
//!
//! The core never reads process environment variables or touches the
//! filesystem. The caller supplies one compiled-data directory per origin
//! (the setting the surrounding tooling knows as `{origin}_compiled_dir`),
//! and resolution fails loudly when a needed origin is unconfigured.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::{AnnographError, AnnographResult};
use crate::key::Origin;

/// Per-origin compiled-data directories.
#[derive(Debug, Clone, Default)]
pub struct DataLocations {
    dirs: BTreeMap<Origin, PathBuf>,
}

impl DataLocations {
    /// An empty configuration; every lookup fails until directories are
    /// set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style: set the compiled-data directory for one origin.
    pub fn with_dir(mut self, origin: Origin, dir: impl Into<PathBuf>) -> Self {
        self.set_dir(origin, dir);
        self
    }

    /// Set the compiled-data directory for one origin.
    pub fn set_dir(&mut self, origin: Origin, dir: impl Into<PathBuf>) {
        self.dirs.insert(origin, dir.into());
    }

    /// Convenience layout with all three origins under one root.
    pub fn under_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new()
            .with_dir(Origin::Main, root.join("main"))
            .with_dir(Origin::Annox, root.join("annox"))
            .with_dir(Origin::Derived, root.join("derived"))
    }

    /// The compiled-data directory for an origin.
    pub fn compiled_dir(&self, origin: Origin) -> AnnographResult<&Path> {
        self.dirs.get(&origin).map(PathBuf::as_path).ok_or_else(|| {
            AnnographError::environment(format!(
                "no compiled-data directory configured for origin {} ({}_compiled_dir)",
                origin.label(),
                origin.code(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn configured_origin_resolves() {
        let locs = DataLocations::new().with_dir(Origin::Main, "/work/compiled");
        assert_eq!(locs.compiled_dir(Origin::Main).unwrap(), Path::new("/work/compiled"));
    }

    #[test]
    fn unconfigured_origin_fails() {
        let locs = DataLocations::new();
        let err = locs.compiled_dir(Origin::Annox).unwrap_err();
        assert_matches!(err, AnnographError::Environment(_));
        assert!(err.to_string().contains("a_compiled_dir"));
    }

    #[test]
    fn under_root_covers_all_origins() {
        let locs = DataLocations::under_root("/work");
        for origin in [Origin::Main, Origin::Annox, Origin::Derived] {
            assert!(locs.compiled_dir(origin).is_ok());
        }
        assert_eq!(
            locs.compiled_dir(Origin::Derived).unwrap(),
            Path::new("/work/derived")
        );
    }
}
