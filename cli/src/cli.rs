//! CLI argument parsing with clap derive

use std::future::Future;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::commands;
use crate::domain::config::DEFAULT_BACKEND_URL;
use crate::domain::{Credentials, ProvisioningConfig};
use crate::infra::YamlSettingsStore;
use crate::output::OutputContext;

/// Install the hostwatch agent and register it as a systemd service
#[derive(Parser)]
#[command(name = "hostwatch-install", version)]
pub struct Cli {
    /// Bootstrap token issued by the hostwatch backend
    #[arg(long, env = "HOSTWATCH_BOOTSTRAP_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Server ID assigned to this host
    #[arg(long, env = "HOSTWATCH_SERVER_ID")]
    pub server_id: Option<String>,

    /// Server secret paired with the server ID
    #[arg(long, env = "HOSTWATCH_SERVER_SECRET", hide_env_values = true)]
    pub server_secret: Option<String>,

    /// Backend URL the agent connects to
    #[arg(long, env = "HOSTWATCH_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    pub backend_url: String,

    /// Installer settings file [default: /etc/hostwatch/installer.yaml]
    #[arg(long, env = "HOSTWATCH_INSTALLER_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}

impl Cli {
    /// Build the provisioning context from flags, environment and settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file is malformed or the backend URL
    /// or service name is invalid.
    pub fn provisioning_config(&self) -> Result<ProvisioningConfig> {
        let settings = YamlSettingsStore::new(self.config.clone()).load()?;
        let credentials = Credentials {
            bootstrap_token: self.token.clone().unwrap_or_default(),
            server_id: self.server_id.clone().unwrap_or_default(),
            server_secret: self.server_secret.clone().unwrap_or_default(),
        };
        Ok(ProvisioningConfig::new(
            settings,
            credentials,
            &self.backend_url,
        )?)
    }

    /// Execute the provisioning pass.
    ///
    /// # Errors
    ///
    /// Returns an error if any provisioning stage fails.
    pub async fn run(self) -> Result<()> {
        let config = self.provisioning_config()?;
        let ctx = OutputContext::new(self.no_color, self.quiet);
        commands::install::run(&ctx, &config).await
    }
}

/// How a provisioning pass ended.
#[derive(Debug)]
pub enum RunOutcome {
    Finished(Result<()>),
    Interrupted,
}

/// Drive `pass` until it finishes or `interrupt` resolves.
///
/// An interrupted pass is dropped before this returns, so its temporary
/// checkout is deleted and any child process it spawned is killed.
pub async fn run_until_interrupted(
    pass: impl Future<Output = Result<()>>,
    interrupt: impl Future<Output = ()>,
) -> RunOutcome {
    tokio::select! {
        result = pass => RunOutcome::Finished(result),
        () = interrupt => RunOutcome::Interrupted,
    }
}
