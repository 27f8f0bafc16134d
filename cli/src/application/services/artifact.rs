//! Artifact validation against the filesystem, and removal of rejected files.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::LocalFs;
use crate::domain::{Artifact, Provenance};

/// Validate the file at `path` as an agent binary.
///
/// # Errors
///
/// Returns [`crate::domain::ProvisionError::InvalidArtifact`] if the file is
/// missing, too small, or not executable, or an error if it cannot be inspected.
pub fn validate_artifact(
    fs: &impl LocalFs,
    path: &Path,
    provenance: Provenance,
) -> Result<Artifact> {
    let facts = fs
        .file_facts(path)
        .with_context(|| format!("inspecting {}", path.display()))?;
    let artifact = Artifact::accept(path.to_path_buf(), facts, provenance)?;
    tracing::debug!(
        path = %path.display(),
        size_bytes = artifact.size_bytes,
        %provenance,
        "artifact accepted"
    );
    Ok(artifact)
}

/// Remove whatever is at `path` so the next strategy starts clean.
///
/// A missing file is not an error.
///
/// # Errors
///
/// Returns an error if an existing file cannot be removed.
pub fn discard(fs: &impl LocalFs, path: &Path) -> Result<()> {
    if fs.exists(path) {
        tracing::debug!(path = %path.display(), "discarding stale artifact");
        fs.remove_file(path)
            .with_context(|| format!("removing stale artifact {}", path.display()))?;
    }
    Ok(())
}
