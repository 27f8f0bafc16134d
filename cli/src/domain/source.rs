//! Agent source trees: where to look for them and how to build them.
//!
//! Pure data only: probing the filesystem and running the toolchain happen
//! in the application layer through ports.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::platform::PlatformProfile;

/// File whose presence marks a directory as an agent source tree.
pub const ENTRY_POINT: &str = "cmd/agent/main.go";

/// Dependency manifest; when present, dependencies are fetched before compiling.
pub const DEPENDENCY_MANIFEST: &str = "go.mod";

/// Toolchain executable.
pub const TOOLCHAIN: &str = "go";

/// Package path compiled into the agent binary, relative to the source root.
pub const AGENT_PACKAGE: &str = "./cmd/agent";

/// System-wide locations an operator may have unpacked the agent source to.
pub const WELL_KNOWN_ROOTS: &[&str] = &[
    "/opt/hostwatch/src",
    "/usr/local/src/hostwatch-agent",
    "/usr/src/hostwatch-agent",
];

/// Directory name looked up under the invoking user's home directory.
pub const HOME_SOURCE_DIR: &str = "hostwatch-agent";

// ── Locations ────────────────────────────────────────────────────────────────

/// Where a source tree was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOrigin {
    WorkingDir,
    InstallerDir,
    WellKnown,
    RemoteCheckout,
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::WorkingDir => "working directory",
            Self::InstallerDir => "installer directory",
            Self::WellKnown => "well-known path",
            Self::RemoteCheckout => "remote checkout",
        })
    }
}

/// A directory confirmed to contain [`ENTRY_POINT`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub root: PathBuf,
    pub origin: SourceOrigin,
}

/// Local directories searched for a source tree, in priority order.
#[derive(Debug, Clone, Default)]
pub struct SourceSearch {
    pub working_dir: Option<PathBuf>,
    pub installer_dir: Option<PathBuf>,
    pub home_dir: Option<PathBuf>,
    pub extra_roots: Vec<PathBuf>,
}

impl SourceSearch {
    /// Candidate roots, highest priority first.
    ///
    /// Order: working directory, installer directory, the system-wide
    /// [`WELL_KNOWN_ROOTS`], `~/hostwatch-agent`, then configured extra roots.
    /// The iterator is lazy so callers can stop at the first match.
    pub fn candidates(&self) -> impl Iterator<Item = (PathBuf, SourceOrigin)> + '_ {
        let working = self
            .working_dir
            .iter()
            .map(|p| (p.clone(), SourceOrigin::WorkingDir));
        let installer = self
            .installer_dir
            .iter()
            .map(|p| (p.clone(), SourceOrigin::InstallerDir));
        let system = WELL_KNOWN_ROOTS
            .iter()
            .map(|p| (PathBuf::from(p), SourceOrigin::WellKnown));
        let home = self
            .home_dir
            .iter()
            .map(|h| (h.join(HOME_SOURCE_DIR), SourceOrigin::WellKnown));
        let extra = self
            .extra_roots
            .iter()
            .map(|p| (p.clone(), SourceOrigin::WellKnown));
        working.chain(installer).chain(system).chain(home).chain(extra)
    }

    /// Number of local candidates, for diagnostics.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.candidates().count()
    }
}

// ── Build plan ───────────────────────────────────────────────────────────────

/// One toolchain invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

/// Toolchain invocations that turn a source tree into a stripped agent binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub dependencies: ToolInvocation,
    pub compile: ToolInvocation,
}

impl BuildPlan {
    /// Plan a static, stripped cross-compile for `target` writing to `output`.
    #[must_use]
    pub fn new(target: &PlatformProfile, output: &Path) -> Self {
        let envs = vec![
            ("GOOS".to_string(), target.os.as_str().to_string()),
            ("GOARCH".to_string(), target.arch.as_str().to_string()),
            ("CGO_ENABLED".to_string(), "0".to_string()),
        ];
        Self {
            dependencies: ToolInvocation {
                args: vec!["mod".to_string(), "download".to_string()],
                envs: envs.clone(),
            },
            compile: ToolInvocation {
                args: vec![
                    "build".to_string(),
                    "-trimpath".to_string(),
                    "-ldflags".to_string(),
                    "-s -w".to_string(),
                    "-o".to_string(),
                    output.display().to_string(),
                    AGENT_PACKAGE.to_string(),
                ],
                envs,
            },
        }
    }
}
