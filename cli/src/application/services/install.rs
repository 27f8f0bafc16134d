//! Application service: the complete provisioning pass.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::{AcquisitionHost, HostInspector, ProgressReporter, ServiceSupervisor};
use crate::application::services::acquire::acquire;
use crate::application::services::host::{profile_host, require_privilege};
use crate::application::services::service::provision_service;
use crate::domain::{Artifact, PlatformProfile, ProvisioningConfig, SourceSearch};

/// What a successful pass produced.
#[derive(Debug)]
pub struct InstallReport {
    pub profile: PlatformProfile,
    pub artifact: Artifact,
    /// Hex-encoded SHA-256 of the installed binary.
    pub sha256: String,
    pub unit_path: PathBuf,
}

/// Run one forward provisioning pass.
///
/// Stages run strictly in sequence and the first failure aborts the pass:
/// credential check, platform profile, privilege check, acquisition,
/// service registration.
///
/// # Errors
///
/// Returns the first stage failure, typically a [`crate::domain::ProvisionError`].
pub async fn install(
    host: &(impl AcquisitionHost + HostInspector),
    supervisor: &impl ServiceSupervisor,
    config: &ProvisioningConfig,
    search: &SourceSearch,
    reporter: &impl ProgressReporter,
) -> Result<InstallReport> {
    config.credentials.require()?;

    let profile = profile_host(host).await?;
    reporter.success(&format!("Platform {profile} supported"));
    require_privilege(host).await?;

    let artifact = acquire(host, config, &profile, search, reporter)
        .await?
        .into_artifact()?;
    let sha256 = host
        .sha256_file(&artifact.path)
        .with_context(|| format!("hashing {}", artifact.path.display()))?;
    tracing::info!(path = %artifact.path.display(), %sha256, provenance = %artifact.provenance, "agent binary ready");

    let unit_path = provision_service(supervisor, config, &artifact, reporter).await?;

    Ok(InstallReport {
        profile,
        artifact,
        sha256,
        unit_path,
    })
}
