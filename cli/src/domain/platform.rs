//! Platform profiling: maps raw `uname` output to the agent's build targets.
//!
//! Pure functions only: no I/O, no async.

use std::fmt;

use crate::domain::error::ProvisionError;

/// Operating systems the agent ships for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
}

impl Os {
    /// Token used in download routes and as `GOOS`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
        }
    }
}

/// CPU architectures the agent ships for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Amd64,
    Arm64,
}

impl Arch {
    /// Token used in download routes and as `GOARCH`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
        }
    }
}

/// Normalized `(os, arch)` pair of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProfile {
    pub os: Os,
    pub arch: Arch,
}

impl fmt::Display for PlatformProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os.as_str(), self.arch.as_str())
    }
}

/// Derive a [`PlatformProfile`] from the kernel name and machine identifier.
///
/// Both inputs are trimmed; the kernel name is compared case-insensitively.
///
/// # Errors
///
/// - [`ProvisionError::UnsupportedOs`] when the kernel is not Linux.
/// - [`ProvisionError::UnsupportedPlatform`] for any unrecognized machine identifier.
pub fn profile(kernel: &str, machine: &str) -> Result<PlatformProfile, ProvisionError> {
    let kernel = kernel.trim();
    if !kernel.eq_ignore_ascii_case("linux") {
        return Err(ProvisionError::UnsupportedOs(kernel.to_string()));
    }
    let arch = match machine.trim() {
        "x86_64" => Arch::Amd64,
        "aarch64" | "arm64" => Arch::Arm64,
        other => return Err(ProvisionError::UnsupportedPlatform(other.to_string())),
    };
    Ok(PlatformProfile {
        os: Os::Linux,
        arch,
    })
}
