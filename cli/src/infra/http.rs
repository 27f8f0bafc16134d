//! HTTP infrastructure: implements `ArtifactFetcher` with `ureq` on a blocking thread.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{ArtifactFetcher, CommandRunner, FetchReport};
use crate::infra::host::SystemHost;

/// Upper bound on a downloaded body; agent binaries are far smaller.
const MAX_DOWNLOAD_BYTES: u64 = 512 * 1024 * 1024;

const MAX_REDIRECTS: u32 = 10;

impl<R: CommandRunner> ArtifactFetcher for SystemHost<R> {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<FetchReport> {
        let url = url.to_string();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || fetch_to_file(&url, &dest))
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking panicked: {e}"))?
    }
}

/// GET `url` and stream the body of the final response into `dest`.
///
/// Error statuses still have their body written, so the caller sees exactly
/// what the server sent. `dest` must not exist yet.
///
/// # Errors
///
/// Returns an error on connection failures, when `dest` cannot be created,
/// or when the body is larger than [`MAX_DOWNLOAD_BYTES`].
pub fn fetch_to_file(url: &str, dest: &Path) -> Result<FetchReport> {
    fetch_capped(url, dest, MAX_DOWNLOAD_BYTES)
}

fn fetch_capped(url: &str, dest: &Path, cap: u64) -> Result<FetchReport> {
    let agent = ureq::AgentBuilder::new()
        .redirects(MAX_REDIRECTS)
        .user_agent(concat!("hostwatch-installer/", env!("CARGO_PKG_VERSION")))
        .build();

    let response = match agent.get(url).call() {
        Ok(response) | Err(ureq::Error::Status(_, response)) => response,
        Err(ureq::Error::Transport(transport)) => {
            anyhow::bail!("cannot reach {url}: {transport}");
        }
    };
    let status = response.status();

    // create_new never follows a symlink planted at dest.
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dest)
        .with_context(|| format!("creating {}", dest.display()))?;
    // One byte past the cap tells an oversized body from one that fits exactly.
    let bytes_written = std::io::copy(&mut response.into_reader().take(cap + 1), &mut file)
        .with_context(|| format!("writing download to {}", dest.display()))?;
    if bytes_written > cap {
        anyhow::bail!("response body from {url} exceeds {cap} bytes");
    }

    Ok(FetchReport {
        status,
        bytes_written,
    })
}
