//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, filesystem
//! access, HTTP downloads, git checkouts, and systemd registration.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config;
pub mod fs;
pub mod git;
pub mod host;
pub mod http;
pub mod systemd;

pub use command_runner::TokioCommandRunner;
pub use config::YamlSettingsStore;
pub use host::SystemHost;
pub use systemd::SystemdSupervisor;
