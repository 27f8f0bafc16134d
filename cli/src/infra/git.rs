//! Git infrastructure: implements `SourceFetcher` with a shallow `git clone`.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{Checkout, CommandRunner, CommandSpec, SourceFetcher};
use crate::infra::host::SystemHost;

/// Timeout for the shallow clone.
pub const CLONE_TIMEOUT: Duration = Duration::from_secs(300);

impl<R: CommandRunner> SourceFetcher for SystemHost<R> {
    async fn shallow_clone(&self, repo: &str) -> Result<Checkout> {
        let dir = tempfile::Builder::new()
            .prefix("hostwatch-src-")
            .tempdir()
            .context("creating temp dir for source checkout")?;
        let root = dir.path().join("agent");
        let root_arg = root.to_string_lossy().into_owned();

        let args = ["clone", "--depth", "1", "--quiet", repo, root_arg.as_str()];
        let spec = CommandSpec {
            program: "git",
            args: &args,
            cwd: None,
            envs: &[("GIT_TERMINAL_PROMPT", "0")],
            timeout: Some(CLONE_TIMEOUT),
        };
        let output = self
            .runner
            .run_spec(&spec)
            .await
            .context("git clone")?;
        if !output.status.success() {
            // `dir` drops on return and removes the partial checkout.
            anyhow::bail!(
                "git clone {repo} failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        tracing::debug!(root = %root.display(), "source checkout ready");
        Ok(Checkout {
            root,
            guard: Box::new(dir),
        })
    }
}
