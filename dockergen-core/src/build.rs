//! Build information embedded in every provenance header.

use std::fmt;

/// Version and commit of the running binary.
///
/// Both values are fixed at compile time; the struct exists so the renderer
/// receives them explicitly instead of reading process-wide globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
}

impl BuildInfo {
    pub fn new(version: impl Into<String>, commit: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            commit: commit.into(),
        }
    }

    /// Build information of this crate: `CARGO_PKG_VERSION` plus the commit
    /// passed in `DOCKERGEN_GIT_COMMIT` at compile time (empty when unset).
    pub fn current() -> Self {
        Self::new(
            env!("CARGO_PKG_VERSION"),
            option_env!("DOCKERGEN_GIT_COMMIT").unwrap_or_default(),
        )
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "version {}, build {}", self.version, self.commit)
    }
}
