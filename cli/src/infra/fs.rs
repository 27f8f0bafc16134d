//! Filesystem infrastructure: implements `LocalFs` and `FileHasher`.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::application::ports::{CommandRunner, FileHasher, LocalFs};
use crate::domain::FileFacts;
use crate::infra::host::SystemHost;

impl<R: CommandRunner> LocalFs for SystemHost<R> {
    fn exists(&self, path: &Path) -> bool {
        entry_exists(path)
    }

    fn file_facts(&self, path: &Path) -> Result<Option<FileFacts>> {
        file_facts(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("creating directory {}", path.display()))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).with_context(|| format!("removing file {}", path.display()))
    }

    fn set_permissions(&self, path: &Path, _mode: u32) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(_mode))
                .with_context(|| format!("setting permissions on {}", path.display()))?;
        }
        Ok(())
    }
}

impl<R: CommandRunner> FileHasher for SystemHost<R> {
    fn sha256_file(&self, path: &Path) -> Result<String> {
        sha256_file(path)
    }
}

/// Whether a directory entry exists at `path`.
///
/// A final symlink is not followed, so a dangling link counts as present.
#[must_use]
pub fn entry_exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// Size and executable bit of the regular file at `path`.
///
/// Returns `Ok(None)` if nothing exists there. Directories and other
/// non-regular files are reported with size 0 so they never validate.
///
/// # Errors
///
/// Returns an error if the metadata cannot be read for a reason other than
/// the file being absent.
pub fn file_facts(path: &Path) -> Result<Option<FileFacts>> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("reading metadata of {}", path.display()));
        }
    };
    if !meta.is_file() {
        return Ok(Some(FileFacts {
            size_bytes: 0,
            executable: false,
        }));
    }

    #[cfg(unix)]
    let executable = {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o111 != 0
    };
    #[cfg(not(unix))]
    let executable = true;

    Ok(Some(FileFacts {
        size_bytes: meta.len(),
        executable,
    }))
}

/// Compute the SHA256 hex digest of a file.
///
/// Reads the file in 64 KB chunks to avoid loading large files into memory.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file =
        std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 65536];
    loop {
        let n = file.read(&mut buf).context("reading file")?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex_encode(&hasher.finalize()))
}

/// Encode bytes as lowercase hex string.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(HEX[(b >> 4) as usize]));
        out.push(char::from(HEX[(b & 0xf) as usize]));
    }
    out
}
