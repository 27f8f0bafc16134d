//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{FileFacts, ServiceDefinition};

// ── Value Types ───────────────────────────────────────────────────────────────

/// A process invocation with an optional working directory and extra environment.
pub struct CommandSpec<'a> {
    /// Program to run, resolved through `PATH`.
    pub program: &'a str,
    /// Arguments passed verbatim.
    pub args: &'a [&'a str],
    /// Working directory; inherits the caller's when `None`.
    pub cwd: Option<&'a Path>,
    /// Variables added to the inherited environment.
    pub envs: &'a [(&'a str, &'a str)],
    /// Overrides the runner's default timeout.
    pub timeout: Option<Duration>,
}

impl<'a> CommandSpec<'a> {
    /// A bare invocation: no working directory, no extra environment.
    #[must_use]
    pub fn new(program: &'a str, args: &'a [&'a str]) -> Self {
        Self {
            program,
            args,
            cwd: None,
            envs: &[],
            timeout: None,
        }
    }
}

/// Result of a single HTTP download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchReport {
    /// HTTP status of the final response after redirects.
    pub status: u16,
    /// Body bytes written to the destination file.
    pub bytes_written: u64,
}

/// A temporary source checkout.
///
/// `guard` owns the directory on disk and deletes it when dropped.
#[derive(Debug)]
pub struct Checkout {
    /// Root of the checked-out tree.
    pub root: PathBuf,
    /// Keeps the temporary directory alive.
    pub guard: Box<dyn std::any::Any>,
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_spec` using the instance's
    /// configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_spec(&CommandSpec::new(program, args)).await
    }

    /// Run a fully specified invocation and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds its timeout.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_spec(&self, spec: &CommandSpec<'_>) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Host Ports ────────────────────────────────────────────────────────────────

/// Facts about the machine the installer runs on.
#[allow(async_fn_in_trait)]
pub trait HostInspector {
    /// Raw kernel name, as `uname -s` reports it.
    async fn kernel_name(&self) -> Result<String>;
    /// Raw machine identifier, as `uname -m` reports it.
    async fn machine(&self) -> Result<String>;
    /// Whether the installer runs with root privileges.
    async fn is_privileged(&self) -> Result<bool>;
}

/// Abstracts local filesystem access.
pub trait LocalFs {
    /// Whether anything exists at `path`, a dangling symlink included.
    fn exists(&self, path: &Path) -> bool;
    /// Size and executable bit of a regular file, or `None` if it is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be inspected.
    fn file_facts(&self, path: &Path) -> Result<Option<FileFacts>>;
    /// Create a directory and its parents.
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    /// Remove a file.
    fn remove_file(&self, path: &Path) -> Result<()>;
    /// Set Unix permission bits.
    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()>;
}

/// Abstracts file hashing operations.
pub trait FileHasher {
    /// Compute the SHA-256 hash of a file.
    fn sha256_file(&self, path: &Path) -> Result<String>;
}

// ── Acquisition Ports ─────────────────────────────────────────────────────────

/// Downloads a prebuilt agent binary.
#[allow(async_fn_in_trait)]
pub trait ArtifactFetcher {
    /// GET `url`, following redirects, and write the body to `dest`.
    ///
    /// Non-2xx responses are reported through [`FetchReport::status`], not as
    /// errors. Exactly one request is made.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is unreachable or the body cannot be written.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<FetchReport>;
}

/// Produces a temporary checkout of the agent's source repository.
#[allow(async_fn_in_trait)]
pub trait SourceFetcher {
    /// Shallow-clone `repo` into a fresh temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the clone fails; the temporary directory is removed.
    async fn shallow_clone(&self, repo: &str) -> Result<Checkout>;
}

/// Composite trait: everything the acquisition pass touches on the host.
pub trait AcquisitionHost:
    ArtifactFetcher + SourceFetcher + CommandRunner + LocalFs + FileHasher
{
}

/// Blanket implementation: any type implementing all sub-traits is an `AcquisitionHost`.
impl<T> AcquisitionHost for T where
    T: ArtifactFetcher + SourceFetcher + CommandRunner + LocalFs + FileHasher
{
}

// ── Service Supervision Port ──────────────────────────────────────────────────

/// Registers and controls long-running services on the host.
#[allow(async_fn_in_trait)]
pub trait ServiceSupervisor {
    /// Write (or overwrite) the unit for `definition`, returning its path.
    async fn install_unit(&self, definition: &ServiceDefinition) -> Result<PathBuf>;
    /// Make the supervisor re-read its unit files.
    async fn reload(&self) -> Result<()>;
    /// Enable the service for automatic start at boot.
    async fn enable(&self, name: &str) -> Result<()>;
    /// Start the service, restarting it if already running.
    async fn restart(&self, name: &str) -> Result<()>;
    /// Sample whether the service is currently running.
    async fn is_active(&self, name: &str) -> Result<bool>;
    /// Status and recent log output, for failure reports.
    async fn diagnostics(&self, name: &str) -> Result<String>;
}
