//! Infrastructure implementation of the `ServiceSupervisor` port.
//!
//! `SystemdSupervisor<R>` writes unit files into a unit directory and routes
//! all `systemctl` / `journalctl` calls through a `CommandRunner`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ServiceSupervisor};
use crate::domain::ServiceDefinition;
use crate::infra::command_runner::TokioCommandRunner;

/// Mode of written unit files. Units carry secrets, so they are not world-readable.
const UNIT_MODE: u32 = 0o640;

/// Journal lines included in failure diagnostics.
const JOURNAL_LINES: &str = "30";

/// Infrastructure adapter for systemd.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without touching the real service manager.
pub struct SystemdSupervisor<R: CommandRunner = TokioCommandRunner> {
    runner: R,
    unit_dir: PathBuf,
}

impl<R: CommandRunner> SystemdSupervisor<R> {
    /// Create a supervisor writing units into `unit_dir`.
    pub fn new(runner: R, unit_dir: PathBuf) -> Self {
        Self { runner, unit_dir }
    }

    /// The runner all commands go through.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    async fn systemctl(&self, args: &[&str]) -> Result<()> {
        let output = self
            .runner
            .run("systemctl", args)
            .await
            .with_context(|| format!("systemctl {}", args.join(" ")))?;
        if !output.status.success() {
            anyhow::bail!(
                "systemctl {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

impl<R: CommandRunner> ServiceSupervisor for SystemdSupervisor<R> {
    async fn install_unit(&self, definition: &ServiceDefinition) -> Result<PathBuf> {
        let path = self.unit_dir.join(definition.unit_file_name());
        let contents = definition.render_unit();
        let unit_dir = self.unit_dir.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&unit_dir)
                .with_context(|| format!("creating {}", unit_dir.display()))?;
            std::fs::write(&target, contents)
                .with_context(|| format!("writing unit {}", target.display()))?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(&target, std::fs::Permissions::from_mode(UNIT_MODE))
                    .with_context(|| format!("setting permissions on {}", target.display()))?;
            }
            Ok::<(), anyhow::Error>(())
        })
        .await
        .context("spawn_blocking for install_unit")??;
        tracing::info!(unit = %path.display(), "service unit written");
        Ok(path)
    }

    async fn reload(&self) -> Result<()> {
        self.systemctl(&["daemon-reload"]).await
    }

    async fn enable(&self, name: &str) -> Result<()> {
        self.systemctl(&["enable", name]).await
    }

    async fn restart(&self, name: &str) -> Result<()> {
        self.systemctl(&["restart", name]).await
    }

    async fn is_active(&self, name: &str) -> Result<bool> {
        // Exits non-zero for every state except active; only stdout matters.
        let output = self
            .runner
            .run("systemctl", &["is-active", name])
            .await
            .context("systemctl is-active")?;
        let state = String::from_utf8_lossy(&output.stdout).trim().to_string();
        tracing::debug!(%name, %state, "service state sampled");
        Ok(state == "active")
    }

    async fn diagnostics(&self, name: &str) -> Result<String> {
        let status = self
            .runner
            .run("systemctl", &["status", "--no-pager", "--full", name])
            .await
            .context("systemctl status")?;
        let journal = self
            .runner
            .run(
                "journalctl",
                &["-u", name, "-n", JOURNAL_LINES, "--no-pager"],
            )
            .await
            .context("journalctl")?;
        Ok(format!(
            "{}\n\n{}",
            String::from_utf8_lossy(&status.stdout).trim_end(),
            String::from_utf8_lossy(&journal.stdout).trim_end()
        ))
    }
}
