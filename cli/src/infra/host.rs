//! `SystemHost`: the production host adapter.
//!
//! One value implements every acquisition port; each concern lives in its
//! own module (`fs`, `http`, `git`). This module holds the struct, command
//! delegation, and the `HostInspector` implementation built on `uname` and `id`.

use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, CommandSpec, HostInspector};
use crate::infra::command_runner::TokioCommandRunner;

/// Production host adapter, generic over the process runner so tests can
/// inject canned command output.
pub struct SystemHost<R: CommandRunner = TokioCommandRunner> {
    pub(crate) runner: R,
}

impl<R: CommandRunner> SystemHost<R> {
    /// Create a host adapter around `runner`.
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    async fn stdout_of(&self, program: &str, args: &[&str]) -> Result<String> {
        let output = self
            .runner
            .run(program, args)
            .await
            .with_context(|| format!("running {program}"))?;
        if !output.status.success() {
            anyhow::bail!(
                "{program} {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl SystemHost<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner::default())
    }
}

impl<R: CommandRunner> CommandRunner for SystemHost<R> {
    async fn run_spec(&self, spec: &CommandSpec<'_>) -> Result<Output> {
        self.runner.run_spec(spec).await
    }
}

impl<R: CommandRunner> HostInspector for SystemHost<R> {
    async fn kernel_name(&self) -> Result<String> {
        self.stdout_of("uname", &["-s"]).await
    }

    async fn machine(&self) -> Result<String> {
        self.stdout_of("uname", &["-m"]).await
    }

    async fn is_privileged(&self) -> Result<bool> {
        let uid = self.stdout_of("id", &["-u"]).await?;
        Ok(uid == "0")
    }
}
