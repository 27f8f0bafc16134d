//! Download strategy: fetch a prebuilt agent binary from the backend.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{ArtifactFetcher, LocalFs};
use crate::application::services::artifact::validate_artifact;
use crate::domain::{Artifact, Provenance, ProvisionError};

/// Mode applied to a downloaded binary before validation.
const EXECUTABLE_MODE: u32 = 0o755;

/// Download the agent binary from `url` into `dest`, then validate it.
///
/// A single request is made. Whatever was written to `dest` is left in place
/// on failure; the caller discards it.
///
/// # Errors
///
/// - [`ProvisionError::TransportFailure`] if the backend is unreachable or
///   answers with anything but `200`.
/// - [`ProvisionError::InvalidArtifact`] if the body is not a usable binary.
pub async fn download_artifact(
    host: &(impl ArtifactFetcher + LocalFs),
    url: &str,
    dest: &Path,
) -> Result<Artifact> {
    tracing::info!(%url, dest = %dest.display(), "downloading agent binary");
    let report = host
        .fetch(url, dest)
        .await
        .map_err(|e| ProvisionError::TransportFailure(format!("{url}: {e:#}")))?;
    tracing::debug!(
        status = report.status,
        bytes = report.bytes_written,
        "download finished"
    );

    if report.status != 200 {
        return Err(ProvisionError::TransportFailure(format!(
            "{url} returned HTTP {}",
            report.status
        ))
        .into());
    }

    if host.exists(dest) {
        host.set_permissions(dest, EXECUTABLE_MODE)
            .with_context(|| format!("marking {} executable", dest.display()))?;
    }
    validate_artifact(host, dest, Provenance::Downloaded)
}
