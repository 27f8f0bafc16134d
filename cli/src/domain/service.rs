//! systemd service definition for the agent.

use std::fmt::Write as _;
use std::path::PathBuf;

use crate::domain::artifact::Artifact;
use crate::domain::config::{BACKEND_URL_ENV, ProvisioningConfig};
use crate::domain::error::CredentialField;

/// When the supervisor restarts the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    Always { delay_secs: u64 },
}

/// Everything the supervisor needs to run the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub name: String,
    pub exec_path: PathBuf,
    pub working_dir: PathBuf,
    /// Ordered so the rendered unit is stable across runs.
    pub environment: Vec<(String, String)>,
    pub restart_policy: RestartPolicy,
}

impl ServiceDefinition {
    /// Derive the agent's service from the provisioning context and its binary.
    #[must_use]
    pub fn for_agent(config: &ProvisioningConfig, artifact: &Artifact) -> Self {
        let creds = &config.credentials;
        Self {
            name: config.service_name.clone(),
            exec_path: artifact.path.clone(),
            working_dir: config.install_dir.clone(),
            environment: vec![
                (BACKEND_URL_ENV.to_string(), config.backend_url().to_string()),
                (
                    CredentialField::BootstrapToken.env_var().to_string(),
                    creds.bootstrap_token.clone(),
                ),
                (
                    CredentialField::ServerId.env_var().to_string(),
                    creds.server_id.clone(),
                ),
                (
                    CredentialField::ServerSecret.env_var().to_string(),
                    creds.server_secret.clone(),
                ),
            ],
            restart_policy: RestartPolicy::Always { delay_secs: 5 },
        }
    }

    /// File name of the unit, e.g. `hostwatch-agent.service`.
    #[must_use]
    pub fn unit_file_name(&self) -> String {
        format!("{}.service", self.name)
    }

    /// Render the unit file contents.
    #[must_use]
    pub fn render_unit(&self) -> String {
        let RestartPolicy::Always { delay_secs } = self.restart_policy;

        let mut unit = String::new();
        unit.push_str("[Unit]\n");
        let _ = writeln!(unit, "Description=hostwatch agent ({})", self.name);
        unit.push_str("Wants=network-online.target\n");
        unit.push_str("After=network-online.target\n\n");

        unit.push_str("[Service]\n");
        unit.push_str("Type=simple\n");
        let _ = writeln!(
            unit,
            "ExecStart=\"{}\"",
            escape_exec_word(&self.exec_path.display().to_string())
        );
        let _ = writeln!(
            unit,
            "WorkingDirectory={}",
            self.working_dir.display().to_string().replace('%', "%%")
        );
        unit.push_str("Restart=always\n");
        let _ = writeln!(unit, "RestartSec={delay_secs}");
        for (key, value) in &self.environment {
            let _ = writeln!(unit, "Environment=\"{key}={}\"", escape_env_value(value));
        }
        unit.push('\n');

        unit.push_str("[Install]\n");
        unit.push_str("WantedBy=multi-user.target\n");
        unit
    }
}

/// Escape a value for use inside a double-quoted `Environment=` assignment.
fn escape_env_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '%' => out.push_str("%%"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape the program path for a double-quoted `ExecStart=` word, where `$`
/// would otherwise start a variable reference.
fn escape_exec_word(word: &str) -> String {
    escape_env_value(word).replace('$', "$$")
}
