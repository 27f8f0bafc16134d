//! Agent binary artifacts and the acceptance rule applied to them.
//!
//! Pure functions only: callers gather [`FileFacts`] from the filesystem.

use std::fmt;
use std::path::PathBuf;

use crate::domain::error::{ArtifactDefect, ProvisionError};

/// Smallest size, exclusive, a usable agent binary can have.
///
/// Anything at or below this is an HTML error page or an empty body that
/// the transport reported as a success.
pub const MIN_ARTIFACT_BYTES: u64 = 1024;

/// Strategy that produced an artifact, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Downloaded,
    Built,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Downloaded => "downloaded",
            Self::Built => "built from source",
        })
    }
}

/// What the filesystem reports about a candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFacts {
    pub size_bytes: u64,
    pub executable: bool,
}

/// An agent binary that passed [`assess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub executable: bool,
    pub provenance: Provenance,
}

/// Decide whether a candidate file is an acceptable agent binary.
///
/// `facts` is `None` when the file does not exist. The size floor is checked
/// before the executable bit, so an undersized file is always reported as
/// [`ArtifactDefect::TooSmall`].
///
/// # Errors
///
/// Returns the first [`ArtifactDefect`] found.
pub fn assess(facts: Option<FileFacts>) -> Result<FileFacts, ArtifactDefect> {
    let Some(facts) = facts else {
        return Err(ArtifactDefect::Missing);
    };
    if facts.size_bytes <= MIN_ARTIFACT_BYTES {
        return Err(ArtifactDefect::TooSmall {
            size_bytes: facts.size_bytes,
        });
    }
    if !facts.executable {
        return Err(ArtifactDefect::NotExecutable {
            size_bytes: facts.size_bytes,
        });
    }
    Ok(facts)
}

impl Artifact {
    /// Build an [`Artifact`] from a candidate file, applying [`assess`].
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::InvalidArtifact`] if the file is rejected.
    pub fn accept(
        path: PathBuf,
        facts: Option<FileFacts>,
        provenance: Provenance,
    ) -> Result<Self, ProvisionError> {
        let facts = assess(facts).map_err(ProvisionError::InvalidArtifact)?;
        Ok(Self {
            path,
            size_bytes: facts.size_bytes,
            executable: facts.executable,
            provenance,
        })
    }
}
