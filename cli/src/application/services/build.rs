//! Build executor: compile the agent from a resolved source tree.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::{CommandRunner, CommandSpec, LocalFs};
use crate::application::services::artifact::validate_artifact;
use crate::domain::source::{BuildPlan, DEPENDENCY_MANIFEST, TOOLCHAIN, ToolInvocation};
use crate::domain::{Artifact, BuildStep, PlatformProfile, Provenance, ProvisionError, SourceLocation};

/// Timeout for `go mod download`.
pub const DEPENDENCY_TIMEOUT: Duration = Duration::from_secs(600);

/// Timeout for `go build`.
pub const COMPILE_TIMEOUT: Duration = Duration::from_secs(900);

/// Lines of toolchain stderr kept in a failure report.
const STDERR_TAIL_LINES: usize = 20;

/// Compile the agent for `target` from `source`, writing the binary to `dest`.
///
/// Steps run in order and each one is a hard gate: toolchain check,
/// dependency download (only when a `go.mod` is present), compilation, and
/// validation of the produced file.
///
/// # Errors
///
/// - [`ProvisionError::ToolchainMissing`] if `go` cannot be run.
/// - [`ProvisionError::BuildFailure`] naming the step that failed.
pub async fn build_artifact(
    host: &(impl CommandRunner + LocalFs),
    source: &SourceLocation,
    target: &PlatformProfile,
    dest: &Path,
) -> Result<Artifact> {
    ensure_toolchain(host).await?;

    let plan = BuildPlan::new(target, dest);
    if host.exists(&source.root.join(DEPENDENCY_MANIFEST)) {
        run_step(
            host,
            &source.root,
            &plan.dependencies,
            BuildStep::Dependencies,
            DEPENDENCY_TIMEOUT,
        )
        .await?;
    } else {
        tracing::debug!(root = %source.root.display(), "no {DEPENDENCY_MANIFEST}, skipping dependency download");
    }

    run_step(host, &source.root, &plan.compile, BuildStep::Compile, COMPILE_TIMEOUT).await?;

    validate_artifact(host, dest, Provenance::Built).map_err(|e| {
        anyhow::Error::from(ProvisionError::BuildFailure {
            step: BuildStep::Verify,
            detail: format!("{e:#}"),
        })
    })
}

/// Check that the toolchain can be run at all.
async fn ensure_toolchain(runner: &impl CommandRunner) -> Result<()> {
    match runner.run(TOOLCHAIN, &["version"]).await {
        Ok(output) if output.status.success() => {
            tracing::debug!(
                version = %String::from_utf8_lossy(&output.stdout).trim(),
                "toolchain found"
            );
            Ok(())
        }
        Ok(output) => {
            tracing::warn!(
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "toolchain present but not working"
            );
            Err(ProvisionError::ToolchainMissing.into())
        }
        Err(e) => {
            tracing::debug!(error = %format!("{e:#}"), "toolchain not runnable");
            Err(ProvisionError::ToolchainMissing.into())
        }
    }
}

async fn run_step(
    runner: &impl CommandRunner,
    root: &Path,
    invocation: &ToolInvocation,
    step: BuildStep,
    timeout: Duration,
) -> Result<()> {
    let args: Vec<&str> = invocation.args.iter().map(String::as_str).collect();
    let envs: Vec<(&str, &str)> = invocation
        .envs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    let spec = CommandSpec {
        program: TOOLCHAIN,
        args: &args,
        cwd: Some(root),
        envs: &envs,
        timeout: Some(timeout),
    };

    tracing::info!(%step, args = ?invocation.args, "running toolchain");
    let output = runner
        .run_spec(&spec)
        .await
        .map_err(|e| ProvisionError::BuildFailure {
            step,
            detail: format!("{e:#}"),
        })?;

    if output.status.success() {
        return Ok(());
    }
    Err(ProvisionError::BuildFailure {
        step,
        detail: stderr_tail(&output.stderr),
    }
    .into())
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
