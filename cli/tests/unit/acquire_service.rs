//! Tests for the acquisition orchestrator: download first, source build as fallback.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use hostwatch_installer::application::services::acquire::{Acquisition, acquire};
use hostwatch_installer::domain::{
    Arch, BuildStep, Os, PlatformProfile, Provenance, ProvisionError,
};

use crate::helpers::{search_in, test_config, write_source_tree};
use crate::mocks::{CloneOutcome, Compile, Download, FakeHost, RecordingReporter};

const AMD64: PlatformProfile = PlatformProfile {
    os: Os::Linux,
    arch: Arch::Amd64,
};

fn provision_error(err: &anyhow::Error) -> &ProvisionError {
    err.downcast_ref::<ProvisionError>()
        .unwrap_or_else(|| panic!("expected a ProvisionError, got: {err:#}"))
}

#[tokio::test]
async fn valid_download_skips_the_build() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let host = FakeHost {
        download: Download::Serve { status: 200, bytes: 50_000 },
        ..FakeHost::default()
    };
    let reporter = RecordingReporter::default();

    let outcome = acquire(&host, &config, &AMD64, &search_in(Vec::new()), &reporter)
        .await
        .expect("acquire");

    let Acquisition::Acquired(artifact) = outcome else {
        panic!("expected Acquired");
    };
    assert_eq!(artifact.provenance, Provenance::Downloaded);
    assert_eq!(artifact.size_bytes, 50_000);
    assert!(artifact.executable);
    assert_eq!(artifact.path, config.binary_path());
    assert_eq!(
        host.calls(),
        vec!["fetch https://backend.test/api/agent/download/linux/amd64".to_string()]
    );
    assert!(!host.called("go"), "build must not run after a valid download");
}

#[tokio::test]
async fn stale_binary_is_never_reused() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::create_dir_all(&config.install_dir).unwrap();
    std::fs::write(config.binary_path(), vec![1u8; 10_000]).unwrap();
    crate::mocks::set_mode(&config.binary_path(), 0o755);
    let host = FakeHost::default();

    let outcome = acquire(&host, &config, &AMD64, &search_in(Vec::new()), &RecordingReporter::default())
        .await
        .expect("acquire");

    assert!(matches!(outcome, Acquisition::Exhausted(_)));
    assert!(!config.binary_path().exists());
}

#[cfg(unix)]
#[tokio::test]
async fn dangling_symlink_at_destination_is_removed() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    std::fs::create_dir_all(&config.install_dir).unwrap();
    let target = dir.path().join("planted");
    std::os::unix::fs::symlink(&target, config.binary_path()).unwrap();
    let host = FakeHost::default();

    let outcome = acquire(&host, &config, &AMD64, &search_in(Vec::new()), &RecordingReporter::default())
        .await
        .expect("acquire");

    assert!(matches!(outcome, Acquisition::Exhausted(_)));
    assert!(std::fs::symlink_metadata(config.binary_path()).is_err(), "link must be removed");
    assert!(!target.exists(), "nothing may be written through the link");
}

#[tokio::test]
async fn undersized_download_is_removed_before_building() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("src");
    write_source_tree(&source, true);
    let config = test_config(dir.path());
    // A 200 with an HTML error page, not a binary.
    let host = FakeHost {
        download: Download::Serve { status: 200, bytes: 512 },
        ..FakeHost::default()
    };
    let reporter = RecordingReporter::default();

    let outcome = acquire(&host, &config, &AMD64, &search_in(vec![source.clone()]), &reporter)
        .await
        .expect("acquire");

    let artifact = outcome.into_artifact().expect("built");
    assert_eq!(artifact.provenance, Provenance::Built);
    assert_eq!(*host.dest_existed_at_compile.lock().unwrap(), Some(false));
    assert_eq!(host.compile_cwd.lock().unwrap().as_deref(), Some(source.as_path()));
    let warnings = reporter.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("falling back"), "{warnings:?}");
}

#[tokio::test]
async fn not_found_falls_back_to_local_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("src");
    write_source_tree(&source, true);
    let config = test_config(dir.path());
    let host = FakeHost {
        download: Download::Serve { status: 404, bytes: 9 },
        ..FakeHost::default()
    };

    let artifact = acquire(&host, &config, &AMD64, &search_in(vec![source]), &RecordingReporter::default())
        .await
        .expect("acquire")
        .into_artifact()
        .expect("built");

    assert_eq!(artifact.provenance, Provenance::Built);
    assert_eq!(artifact.size_bytes, 64 * 1024);
    assert!(!host.called("clone"), "a local tree means no clone");
    let calls = host.calls();
    let go: Vec<&str> = calls.iter().filter(|c| c.starts_with("go ")).map(String::as_str).collect();
    assert_eq!(go[0], "go version");
    assert_eq!(go[1], "go mod download");
    assert!(go[2].starts_with("go build -trimpath"), "{go:?}");
}

#[tokio::test]
async fn compile_targets_the_profiled_platform() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("src");
    write_source_tree(&source, false);
    let config = test_config(dir.path());
    let host = FakeHost::default();
    let arm = PlatformProfile { os: Os::Linux, arch: Arch::Arm64 };

    acquire(&host, &config, &arm, &search_in(vec![source]), &RecordingReporter::default())
        .await
        .expect("acquire")
        .into_artifact()
        .expect("built");

    let env = host.compile_env.lock().unwrap().clone();
    assert!(env.contains(&("GOOS".to_string(), "linux".to_string())));
    assert!(env.contains(&("GOARCH".to_string(), "arm64".to_string())));
    assert!(env.contains(&("CGO_ENABLED".to_string(), "0".to_string())));
    assert!(!host.called("go mod"), "no go.mod, no dependency download");
}

#[tokio::test]
async fn remote_checkout_is_removed_after_success() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let host = FakeHost {
        clone: CloneOutcome::Tree { entry_point: true },
        ..FakeHost::default()
    };

    let artifact = acquire(&host, &config, &AMD64, &search_in(Vec::new()), &RecordingReporter::default())
        .await
        .expect("acquire")
        .into_artifact()
        .expect("built");

    assert!(artifact.path.exists());
    let checkouts = host.checkouts();
    assert_eq!(checkouts.len(), 1);
    assert!(!checkouts[0].exists(), "checkout must not outlive the pass");
}

#[tokio::test]
async fn remote_checkout_is_removed_after_build_failure() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let host = FakeHost {
        clone: CloneOutcome::Tree { entry_point: true },
        compile: Compile::Fails,
        ..FakeHost::default()
    };

    let outcome = acquire(&host, &config, &AMD64, &search_in(Vec::new()), &RecordingReporter::default())
        .await
        .expect("acquire");

    let Acquisition::Exhausted(err) = outcome else {
        panic!("expected Exhausted");
    };
    match provision_error(&err) {
        ProvisionError::BuildFailure { step, detail } => {
            assert_eq!(*step, BuildStep::Compile);
            assert!(detail.contains("syntax error"), "{detail}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!host.checkouts()[0].exists());
    assert!(!config.binary_path().exists(), "partial output must be discarded");
}

#[tokio::test]
async fn checkout_without_entry_point_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let host = FakeHost {
        clone: CloneOutcome::Tree { entry_point: false },
        ..FakeHost::default()
    };

    let outcome = acquire(&host, &config, &AMD64, &search_in(Vec::new()), &RecordingReporter::default())
        .await
        .expect("acquire");

    let Acquisition::Exhausted(err) = outcome else {
        panic!("expected Exhausted");
    };
    assert!(matches!(provision_error(&err), ProvisionError::SourceNotFound { .. }));
    assert!(!host.checkouts()[0].exists());
    assert!(!host.called("go"));
}

#[tokio::test]
async fn unreachable_backend_and_no_source_is_exhausted() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let host = FakeHost::default();

    let outcome = acquire(&host, &config, &AMD64, &search_in(Vec::new()), &RecordingReporter::default())
        .await
        .expect("acquire");

    let Acquisition::Exhausted(err) = outcome else {
        panic!("expected Exhausted");
    };
    match provision_error(&err) {
        ProvisionError::SourceNotFound { entry_point, .. } => {
            assert_eq!(*entry_point, "cmd/agent/main.go");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        host.calls(),
        vec![
            "fetch https://backend.test/api/agent/download/linux/amd64".to_string(),
            format!("clone {}", config.source_repo),
        ],
        "each strategy runs exactly once"
    );
}

#[tokio::test]
async fn missing_toolchain_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("src");
    write_source_tree(&source, true);
    let config = test_config(dir.path());
    let host = FakeHost {
        toolchain: false,
        ..FakeHost::default()
    };

    let err = acquire(&host, &config, &AMD64, &search_in(vec![source]), &RecordingReporter::default())
        .await
        .expect("acquire")
        .into_artifact()
        .expect_err("no toolchain");

    assert!(matches!(provision_error(&err), ProvisionError::ToolchainMissing));
    assert_eq!(host.calls().iter().filter(|c| c.starts_with("go")).count(), 1);
}

#[tokio::test]
async fn dependency_failure_names_the_step() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("src");
    write_source_tree(&source, true);
    let config = test_config(dir.path());
    let host = FakeHost {
        dependencies_ok: false,
        ..FakeHost::default()
    };

    let err = acquire(&host, &config, &AMD64, &search_in(vec![source]), &RecordingReporter::default())
        .await
        .expect("acquire")
        .into_artifact()
        .expect_err("dependency download fails");

    assert!(matches!(
        provision_error(&err),
        ProvisionError::BuildFailure { step: BuildStep::Dependencies, .. }
    ));
    assert!(!host.called("go build"), "compile must not run after a failed step");
}

#[tokio::test]
async fn non_executable_build_output_fails_verification() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("src");
    write_source_tree(&source, true);
    let config = test_config(dir.path());
    let host = FakeHost {
        compile: Compile::Produces { bytes: 64 * 1024, mode: 0o644 },
        ..FakeHost::default()
    };

    let err = acquire(&host, &config, &AMD64, &search_in(vec![source]), &RecordingReporter::default())
        .await
        .expect("acquire")
        .into_artifact()
        .expect_err("not executable");

    assert!(matches!(
        provision_error(&err),
        ProvisionError::BuildFailure { step: BuildStep::Verify, .. }
    ));
    assert!(!config.binary_path().exists());
}
