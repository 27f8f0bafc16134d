//! Service provisioner: register the agent with the supervisor and check it runs.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::{ProgressReporter, ServiceSupervisor};
use crate::domain::{Artifact, ProvisionError, ProvisioningConfig, ServiceDefinition};

/// Install, enable and start the agent service, then sample its state once.
///
/// Credentials are checked before anything is written. After the start
/// command, waits `config.settle` and asks the supervisor whether the service
/// is running; no corrective action is taken if it is not.
///
/// # Errors
///
/// - [`ProvisionError::MissingCredential`] before any unit is written.
/// - [`ProvisionError::ServiceNotRunning`] carrying supervisor diagnostics.
/// - Any supervisor command failure.
pub async fn provision_service(
    supervisor: &impl ServiceSupervisor,
    config: &ProvisioningConfig,
    artifact: &Artifact,
    reporter: &impl ProgressReporter,
) -> Result<PathBuf> {
    config.credentials.require()?;

    let definition = ServiceDefinition::for_agent(config, artifact);
    let name = definition.name.as_str();

    reporter.step(&format!("Registering service {name}..."));
    let unit_path = supervisor
        .install_unit(&definition)
        .await
        .context("writing service unit")?;
    supervisor.reload().await.context("reloading service manager")?;
    supervisor
        .enable(name)
        .await
        .with_context(|| format!("enabling {name}"))?;
    supervisor
        .restart(name)
        .await
        .with_context(|| format!("starting {name}"))?;

    tracing::debug!(settle_ms = config.settle.as_millis(), "waiting for service to settle");
    tokio::time::sleep(config.settle).await;

    if supervisor
        .is_active(name)
        .await
        .with_context(|| format!("querying {name} state"))?
    {
        reporter.success(&format!("Service {name} is running"));
        return Ok(unit_path);
    }

    let diagnostics = supervisor
        .diagnostics(name)
        .await
        .unwrap_or_else(|e| format!("(no diagnostics available: {e:#})"));
    Err(ProvisionError::ServiceNotRunning {
        name: name.to_string(),
        diagnostics,
    }
    .into())
}
