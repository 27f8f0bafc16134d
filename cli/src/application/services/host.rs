//! Host checks run before anything is written: platform and privilege.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};

use crate::application::ports::HostInspector;
use crate::domain::{PlatformProfile, ProvisionError, platform};

/// Profile the host platform.
///
/// # Errors
///
/// Returns [`ProvisionError::UnsupportedOs`] or [`ProvisionError::UnsupportedPlatform`]
/// for hosts the agent does not ship for, or an error if `uname` cannot be run.
pub async fn profile_host(host: &impl HostInspector) -> Result<PlatformProfile> {
    let kernel = host.kernel_name().await.context("reading kernel name")?;
    let machine = host.machine().await.context("reading machine architecture")?;
    let profile = platform::profile(&kernel, &machine)?;
    tracing::debug!(%kernel, %machine, %profile, "host platform profiled");
    Ok(profile)
}

/// Fail unless the installer runs as root.
///
/// # Errors
///
/// Returns [`ProvisionError::PrivilegeRequired`] for unprivileged users.
pub async fn require_privilege(host: &impl HostInspector) -> Result<()> {
    if host.is_privileged().await.context("checking user id")? {
        Ok(())
    } else {
        Err(ProvisionError::PrivilegeRequired.into())
    }
}
