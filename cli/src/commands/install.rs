//! Install command: wires the production adapters into the provisioning pass.

use std::path::Path;

use anyhow::Result;

use crate::application::services::install::{InstallReport, install};
use crate::domain::{ProvisioningConfig, SourceSearch};
use crate::infra::{SystemHost, SystemdSupervisor, TokioCommandRunner};
use crate::output::{OutputContext, TerminalReporter};

/// Run the install command.
///
/// # Errors
///
/// Returns the first provisioning failure.
pub async fn run(ctx: &OutputContext, config: &ProvisioningConfig) -> Result<()> {
    let host = SystemHost::default_runner();
    let supervisor = SystemdSupervisor::new(TokioCommandRunner::default(), config.unit_dir.clone());
    let search = source_search(config);

    ctx.header("hostwatch agent installer");
    let report = {
        let reporter = TerminalReporter::new(ctx);
        install(&host, &supervisor, config, &search, &reporter).await?
    };
    print_summary(ctx, config, &report);
    Ok(())
}

/// Local source candidates derived from the running process.
fn source_search(config: &ProvisioningConfig) -> SourceSearch {
    SourceSearch {
        working_dir: std::env::current_dir().ok(),
        installer_dir: std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf)),
        home_dir: dirs::home_dir(),
        extra_roots: config.extra_source_roots.clone(),
    }
}

fn print_summary(ctx: &OutputContext, config: &ProvisioningConfig, report: &InstallReport) {
    ctx.success("hostwatch agent installed");
    ctx.kv("service   ", &config.service_name);
    ctx.kv("platform  ", &report.profile.to_string());
    ctx.kv("binary    ", &report.artifact.path.display().to_string());
    ctx.kv("source    ", &report.artifact.provenance.to_string());
    ctx.kv("size      ", &format!("{} bytes", report.artifact.size_bytes));
    ctx.kv("sha256    ", &report.sha256);
    ctx.kv("unit      ", &report.unit_path.display().to_string());
    ctx.kv("logs      ", &format!("journalctl -u {} -f", config.service_name));
}
