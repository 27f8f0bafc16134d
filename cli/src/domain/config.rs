//! Domain types and validators for installer configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::{ConfigError, CredentialField, ProvisionError};
use crate::domain::platform::PlatformProfile;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_BACKEND_URL: &str = "wss://api.hostwatch.io/agent/connect";
pub const DEFAULT_INSTALL_DIR: &str = "/opt/hostwatch";
pub const DEFAULT_SERVICE_NAME: &str = "hostwatch-agent";
pub const DEFAULT_BINARY_NAME: &str = "hostwatch-agent";
pub const DEFAULT_SOURCE_REPO: &str = "https://github.com/hostwatch/hostwatch-agent.git";
pub const DEFAULT_UNIT_DIR: &str = "/etc/systemd/system";
pub const DEFAULT_SETTLE_SECS: u64 = 3;

/// Environment variable naming the backend URL, shared by the CLI and the unit.
pub const BACKEND_URL_ENV: &str = "HOSTWATCH_BACKEND_URL";

const CONNECT_SUFFIX: &str = "/agent/connect";

// ── Settings file schema ─────────────────────────────────────────────────────

/// Installer settings read from `/etc/hostwatch/installer.yaml`.
///
/// Every field is optional in the file; missing fields take their defaults
/// and unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerSettings {
    pub install_dir: PathBuf,
    pub service_name: String,
    pub binary_name: String,
    pub source_repo: String,
    pub unit_dir: PathBuf,
    pub settle_secs: u64,
    pub extra_source_roots: Vec<PathBuf>,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            install_dir: PathBuf::from(DEFAULT_INSTALL_DIR),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            binary_name: DEFAULT_BINARY_NAME.to_string(),
            source_repo: DEFAULT_SOURCE_REPO.to_string(),
            unit_dir: PathBuf::from(DEFAULT_UNIT_DIR),
            settle_secs: DEFAULT_SETTLE_SECS,
            extra_source_roots: Vec::new(),
        }
    }
}

// ── Credentials ──────────────────────────────────────────────────────────────

/// The three secrets the agent authenticates with.
///
/// Empty strings count as missing.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub bootstrap_token: String,
    pub server_id: String,
    pub server_secret: String,
}

impl Credentials {
    /// Check that every credential is present.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::MissingCredential`] naming the first absent field,
    /// in the order token, server ID, server secret.
    pub fn require(&self) -> Result<(), ProvisionError> {
        for (field, value) in [
            (CredentialField::BootstrapToken, &self.bootstrap_token),
            (CredentialField::ServerId, &self.server_id),
            (CredentialField::ServerSecret, &self.server_secret),
        ] {
            if value.trim().is_empty() {
                return Err(ProvisionError::MissingCredential(field));
            }
        }
        Ok(())
    }
}

// ── Provisioning context ─────────────────────────────────────────────────────

/// Immutable context threaded through every provisioning stage.
#[derive(Debug, Clone)]
pub struct ProvisioningConfig {
    backend_url: String,
    http_base: String,
    pub credentials: Credentials,
    pub install_dir: PathBuf,
    pub service_name: String,
    pub binary_name: String,
    pub source_repo: String,
    pub unit_dir: PathBuf,
    pub settle: Duration,
    pub extra_source_roots: Vec<PathBuf>,
}

impl ProvisioningConfig {
    /// Combine settings, credentials and the backend URL into one context.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the backend URL has no recognised scheme
    /// or the service name is not a valid unit name.
    pub fn new(
        settings: InstallerSettings,
        credentials: Credentials,
        backend_url: &str,
    ) -> Result<Self, ConfigError> {
        let http_base = http_base_url(backend_url)?;
        validate_service_name(&settings.service_name)?;
        validate_install_dir(&settings.install_dir)?;
        Ok(Self {
            backend_url: backend_url.trim().to_string(),
            http_base,
            credentials,
            install_dir: settings.install_dir,
            service_name: settings.service_name,
            binary_name: settings.binary_name,
            source_repo: settings.source_repo,
            unit_dir: settings.unit_dir,
            settle: Duration::from_secs(settings.settle_secs),
            extra_source_roots: settings.extra_source_roots,
        })
    }

    /// Backend URL as given, handed to the agent unchanged.
    #[must_use]
    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// HTTP base derived from [`Self::backend_url`].
    #[must_use]
    pub fn http_base(&self) -> &str {
        &self.http_base
    }

    /// Fixed path both acquisition strategies write the agent binary to.
    #[must_use]
    pub fn binary_path(&self) -> PathBuf {
        self.install_dir.join(&self.binary_name)
    }

    /// Download route for the given platform.
    #[must_use]
    pub fn download_url(&self, profile: &PlatformProfile) -> String {
        format!(
            "{}/api/agent/download/{}/{}",
            self.http_base,
            profile.os.as_str(),
            profile.arch.as_str()
        )
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Turn the agent's websocket URL into the HTTP base of the backend.
///
/// `ws://` becomes `http://`, `wss://` becomes `https://`, and a trailing
/// `/agent/connect` plus any trailing slashes are removed.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBackendUrl`] for any other scheme or an empty host.
pub fn http_base_url(backend_url: &str) -> Result<String, ConfigError> {
    let trimmed = backend_url.trim();
    let (scheme, rest) = trimmed
        .split_once("://")
        .ok_or_else(|| ConfigError::InvalidBackendUrl(trimmed.to_string()))?;
    let scheme = match scheme.to_ascii_lowercase().as_str() {
        "ws" | "http" => "http",
        "wss" | "https" => "https",
        _ => return Err(ConfigError::InvalidBackendUrl(trimmed.to_string())),
    };
    let mut rest = rest.trim_end_matches('/');
    if let Some(stripped) = rest.strip_suffix(CONNECT_SUFFIX) {
        rest = stripped.trim_end_matches('/');
    }
    if rest.is_empty() || rest.starts_with('/') {
        return Err(ConfigError::InvalidBackendUrl(trimmed.to_string()));
    }
    Ok(format!("{scheme}://{rest}"))
}

/// Validates a systemd unit name.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidServiceName`] if the name is empty or contains
/// characters outside `[a-zA-Z0-9_.-]`.
pub fn validate_service_name(name: &str) -> Result<(), ConfigError> {
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidServiceName(name.to_string()))
    }
}

/// Validates the install directory.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidInstallDir`] unless the path is absolute
/// and free of control characters, which a unit file cannot carry.
pub fn validate_install_dir(dir: &Path) -> Result<(), ConfigError> {
    let text = dir.to_string_lossy();
    if dir.is_absolute() && !text.chars().any(char::is_control) {
        Ok(())
    } else {
        Err(ConfigError::InvalidInstallDir(text.into_owned()))
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
