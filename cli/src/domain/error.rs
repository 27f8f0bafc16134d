//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::fmt;

use thiserror::Error;

// ── Provisioning errors ───────────────────────────────────────────────────────

/// Terminal failures of a provisioning pass.
///
/// Every variant aborts the whole run; none of them is retried.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Unsupported operating system '{0}'. hostwatch agents run on Linux only.")]
    UnsupportedOs(String),

    #[error("Unsupported architecture '{0}'. Supported: x86_64 (amd64), aarch64/arm64 (arm64).")]
    UnsupportedPlatform(String),

    #[error("Root privileges are required. Re-run with: sudo hostwatch-install ...")]
    PrivilegeRequired,

    #[error("Missing {0}.")]
    MissingCredential(CredentialField),

    #[error("Agent download failed: {0}")]
    TransportFailure(String),

    #[error("Invalid agent binary: {0}")]
    InvalidArtifact(ArtifactDefect),

    #[error(
        "No agent source tree found (looked for {entry_point} in {searched} location(s) \
         and the remote repository)."
    )]
    SourceNotFound {
        entry_point: &'static str,
        searched: usize,
    },

    #[error("Go toolchain not found. Install Go (https://go.dev/dl/) or make the download endpoint reachable.")]
    ToolchainMissing,

    #[error("Agent build failed during {step}:\n{detail}")]
    BuildFailure { step: BuildStep, detail: String },

    #[error("Service '{name}' did not reach the running state.\n{diagnostics}")]
    ServiceNotRunning { name: String, diagnostics: String },
}

// ── Supporting types ──────────────────────────────────────────────────────────

/// One of the three credentials the agent needs to authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    BootstrapToken,
    ServerId,
    ServerSecret,
}

impl CredentialField {
    /// Command-line flag that supplies this credential.
    #[must_use]
    pub fn flag(self) -> &'static str {
        match self {
            Self::BootstrapToken => "--token",
            Self::ServerId => "--server-id",
            Self::ServerSecret => "--server-secret",
        }
    }

    /// Environment variable that supplies this credential.
    #[must_use]
    pub fn env_var(self) -> &'static str {
        match self {
            Self::BootstrapToken => "HOSTWATCH_BOOTSTRAP_TOKEN",
            Self::ServerId => "HOSTWATCH_SERVER_ID",
            Self::ServerSecret => "HOSTWATCH_SERVER_SECRET",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::BootstrapToken => "bootstrap token",
            Self::ServerId => "server ID",
            Self::ServerSecret => "server secret",
        }
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (pass {} or set {})",
            self.label(),
            self.flag(),
            self.env_var()
        )
    }
}

/// Why a candidate file was refused as an agent binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactDefect {
    Missing,
    TooSmall { size_bytes: u64 },
    NotExecutable { size_bytes: u64 },
}

impl fmt::Display for ArtifactDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "file does not exist"),
            Self::TooSmall { size_bytes } => write!(
                f,
                "only {size_bytes} bytes (likely an error page or an empty body)"
            ),
            Self::NotExecutable { size_bytes } => {
                write!(f, "{size_bytes} bytes but not executable")
            }
        }
    }
}

/// Build stage that can abort a source build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    Dependencies,
    Compile,
    Verify,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dependencies => "dependency download",
            Self::Compile => "compilation",
            Self::Verify => "binary verification",
        })
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to installer settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid backend URL '{0}': expected a ws://, wss://, http:// or https:// URL.")]
    InvalidBackendUrl(String),

    #[error("Invalid service name '{0}': must match ^[a-zA-Z0-9][a-zA-Z0-9_.-]*$")]
    InvalidServiceName(String),

    #[error("Invalid install directory '{0}': must be an absolute path without control characters.")]
    InvalidInstallDir(String),
}
