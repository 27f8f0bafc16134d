//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod artifact;
pub mod config;
pub mod error;
pub mod platform;
pub mod service;
pub mod source;

pub use artifact::{Artifact, FileFacts, MIN_ARTIFACT_BYTES, Provenance};
pub use config::{Credentials, InstallerSettings, ProvisioningConfig};
pub use error::{ArtifactDefect, BuildStep, ConfigError, CredentialField, ProvisionError};
pub use platform::{Arch, Os, PlatformProfile};
pub use service::{RestartPolicy, ServiceDefinition};
pub use source::{SourceLocation, SourceOrigin, SourceSearch};
