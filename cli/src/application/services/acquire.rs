//! Acquisition orchestrator: download the agent binary, or build it from source.
//!
//! ```text
//! START → DOWNLOAD ─ valid ─────────────────────────────→ Acquired
//!            └─ failed → discard → SOURCE → BUILD ─ valid → Acquired
//!                                      └─ any failure ────→ Exhausted
//! ```
//!
//! Each strategy runs exactly once. Imports only from `crate::domain` and
//! `crate::application::ports`.

use anyhow::{Context, Result};

use crate::application::ports::{AcquisitionHost, ProgressReporter};
use crate::application::services::artifact::discard;
use crate::application::services::build::build_artifact;
use crate::application::services::download::download_artifact;
use crate::application::services::source::resolve_source;
use crate::domain::{Artifact, PlatformProfile, ProvisioningConfig, SourceSearch};

/// Outcome of an acquisition pass.
#[derive(Debug)]
pub enum Acquisition {
    /// A validated binary sits at the destination path.
    Acquired(Artifact),
    /// Both strategies failed; carries the build branch's failure.
    Exhausted(anyhow::Error),
}

impl Acquisition {
    /// Turn an exhausted pass into its terminal error.
    ///
    /// # Errors
    ///
    /// Returns the cause carried by [`Acquisition::Exhausted`].
    pub fn into_artifact(self) -> Result<Artifact> {
        match self {
            Self::Acquired(artifact) => Ok(artifact),
            Self::Exhausted(cause) => Err(cause),
        }
    }
}

/// Obtain a usable agent binary at `config.binary_path()`.
///
/// Any file already at the destination is removed first; a binary left by an
/// earlier run is never reused. A failed download is removed before the build
/// starts, and a temporary source checkout is removed before this returns.
///
/// # Errors
///
/// Returns an error only for host failures outside either strategy, such as
/// an install directory that cannot be created. Strategy failures are
/// reported as [`Acquisition::Exhausted`].
pub async fn acquire(
    host: &impl AcquisitionHost,
    config: &ProvisioningConfig,
    profile: &PlatformProfile,
    search: &SourceSearch,
    reporter: &impl ProgressReporter,
) -> Result<Acquisition> {
    let dest = config.binary_path();
    host.create_dir_all(&config.install_dir)
        .with_context(|| format!("creating install directory {}", config.install_dir.display()))?;
    discard(host, &dest)?;

    let url = config.download_url(profile);
    reporter.step(&format!("Downloading agent binary for {profile}..."));
    match download_artifact(host, &url, &dest).await {
        Ok(artifact) => {
            reporter.success(&format!("Downloaded agent binary ({} bytes)", artifact.size_bytes));
            return Ok(Acquisition::Acquired(artifact));
        }
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "download strategy failed");
            reporter.warn(&format!("{e:#}; falling back to a source build"));
        }
    }
    discard(host, &dest)?;

    reporter.step("Locating agent source...");
    let source = match resolve_source(host, search, &config.source_repo).await {
        Ok(source) => source,
        Err(e) => return Ok(Acquisition::Exhausted(e)),
    };

    reporter.step(&format!(
        "Building agent for {profile} from {} ({})...",
        source.location.root.display(),
        source.location.origin
    ));
    let built = build_artifact(host, &source.location, profile, &dest).await;
    drop(source);

    match built {
        Ok(artifact) => {
            reporter.success(&format!("Built agent binary ({} bytes)", artifact.size_bytes));
            Ok(Acquisition::Acquired(artifact))
        }
        Err(e) => {
            if let Err(cleanup) = discard(host, &dest) {
                tracing::warn!(error = %format!("{cleanup:#}"), "could not remove failed build output");
            }
            Ok(Acquisition::Exhausted(e))
        }
    }
}
