//! Property-based tests for platform, artifact, and unit rendering invariants.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use std::path::PathBuf;

use proptest::prelude::*;

use hostwatch_installer::domain::artifact::assess;
use hostwatch_installer::domain::config::http_base_url;
use hostwatch_installer::domain::platform::profile;
use hostwatch_installer::domain::{
    ArtifactDefect, FileFacts, MIN_ARTIFACT_BYTES, ProvisionError, RestartPolicy,
    ServiceDefinition,
};

// ============================================================================
// platform::profile() property tests
// ============================================================================

proptest! {
    /// Any machine identifier outside the supported set is rejected with its own name.
    #[test]
    fn prop_unknown_arch_rejected(machine in "[a-z0-9_]{1,12}") {
        prop_assume!(!matches!(machine.as_str(), "x86_64" | "aarch64" | "arm64"));
        match profile("Linux", &machine) {
            Err(ProvisionError::UnsupportedPlatform(m)) => prop_assert_eq!(m, machine),
            other => prop_assert!(false, "unexpected result: {other:?}"),
        }
    }

    /// Non-Linux kernels are rejected whatever the architecture.
    #[test]
    fn prop_non_linux_rejected(kernel in "[A-Za-z]{1,10}") {
        prop_assume!(!kernel.eq_ignore_ascii_case("linux"));
        let rejected = matches!(profile(&kernel, "x86_64"), Err(ProvisionError::UnsupportedOs(_)));
        prop_assert!(rejected);
    }
}

// ============================================================================
// artifact::assess() property tests
// ============================================================================

proptest! {
    /// Files at or below the floor are rejected regardless of the exec bit.
    #[test]
    fn prop_small_files_rejected(size in 0..=MIN_ARTIFACT_BYTES, executable in any::<bool>()) {
        let result = assess(Some(FileFacts { size_bytes: size, executable }));
        prop_assert_eq!(result, Err(ArtifactDefect::TooSmall { size_bytes: size }));
    }

    /// Above the floor, the exec bit alone decides.
    #[test]
    fn prop_large_files_need_exec_bit(size in (MIN_ARTIFACT_BYTES + 1)..u64::from(u32::MAX), executable in any::<bool>()) {
        let facts = FileFacts { size_bytes: size, executable };
        let result = assess(Some(facts));
        if executable {
            prop_assert_eq!(result, Ok(facts));
        } else {
            prop_assert_eq!(result, Err(ArtifactDefect::NotExecutable { size_bytes: size }));
        }
    }
}

// ============================================================================
// Backend URL and unit rendering property tests
// ============================================================================

proptest! {
    /// The websocket connect URL always maps onto an HTTP base without the route.
    #[test]
    fn prop_backend_url_becomes_http_base(host in "[a-z]{1,12}(\\.[a-z]{2,6})?", secure in any::<bool>()) {
        let (ws, http) = if secure { ("wss", "https") } else { ("ws", "http") };
        let base = http_base_url(&format!("{ws}://{host}/agent/connect")).expect("valid");
        prop_assert_eq!(base, format!("{http}://{host}"));
    }

    /// Every environment entry renders as exactly one `Environment=` line,
    /// whatever the value contains.
    #[test]
    fn prop_env_values_stay_on_one_line(values in proptest::collection::vec("(?s).{0,40}", 1..5)) {
        let definition = ServiceDefinition {
            name: "hostwatch-agent".to_string(),
            exec_path: PathBuf::from("/opt/hostwatch/hostwatch-agent"),
            working_dir: PathBuf::from("/opt/hostwatch"),
            environment: values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("VAR_{i}"), v.clone()))
                .collect(),
            restart_policy: RestartPolicy::Always { delay_secs: 5 },
        };
        let unit = definition.render_unit();
        let env_lines = unit.lines().filter(|l| l.starts_with("Environment=")).count();
        prop_assert_eq!(env_lines, values.len());
        prop_assert!(unit.contains("ExecStart=\"/opt/hostwatch/hostwatch-agent\""));
    }
}
