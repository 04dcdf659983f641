//! End-to-end tests that run the `logsift` binary against temporary rule files.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const SHIPPED_RULES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../rules/decoders.yml");

const AUTH_LOG: &str = "\
Aug 1 host sshd[42]: Failed password for root from 10.0.0.5 port 22 ssh2

Aug 1 host kernel: eth0: link up
Aug 1 host sudo:    alice : TTY=pts/0 ; PWD=/home/alice ; USER=root ; COMMAND=/bin/ls
";

/// Run `logsift` with a config path inside `dir` that does not exist, so defaults apply.
fn logsift(dir: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_logsift"))
        .arg("-c")
        .arg(dir.join("absent.toml"))
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn logsift");

    let mut pipe = child.stdin.take().expect("stdin is piped");
    if let Some(input) = stdin {
        pipe.write_all(input.as_bytes()).expect("write stdin");
    }
    drop(pipe);

    child.wait_with_output().expect("wait for logsift")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout should be JSON ({e}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write temp file");
    path
}

#[test]
fn test_decode_file_with_shipped_rules() {
    // Given: a log file and the shipped rule file
    let dir = TempDir::new().expect("tempdir");
    let input = write_file(&dir, "auth.log", AUTH_LOG);

    // When: decoding with JSON output
    let output = logsift(
        dir.path(),
        &[
            "--output",
            "json",
            "decode",
            input.to_str().expect("utf-8 path"),
            "--rules",
            SHIPPED_RULES,
        ],
        None,
    );

    // Then: one result per non-blank line, in input order
    assert!(output.status.success(), "decode should succeed: {output:?}");
    let json = stdout_json(&output);
    assert_eq!(json["total"].as_u64(), Some(3), "blank line is skipped");
    assert_eq!(json["matched"].as_u64(), Some(2));

    let results = json["results"].as_array().expect("results array");
    assert_eq!(results[0]["serviceName"].as_str(), Some("SSH"));
    assert_eq!(results[0]["decoderName"].as_str(), Some("FailedPassword"));
    assert_eq!(results[0]["fields"]["port"].as_str(), Some("22"));
    assert_eq!(results[1]["status"].as_str(), Some("No Match"));
    assert_eq!(results[1]["serviceName"].as_str(), Some("Unknown"));
    assert_eq!(results[2]["decoderName"].as_str(), Some("Command"));
}

#[test]
fn test_decode_reads_stdin_by_default() {
    let dir = TempDir::new().expect("tempdir");
    let output = logsift(
        dir.path(),
        &["--output", "json", "decode", "--rules", SHIPPED_RULES, "--matched-only"],
        Some(AUTH_LOG),
    );

    assert!(output.status.success(), "decode should succeed: {output:?}");
    let json = stdout_json(&output);
    assert_eq!(json["total"].as_u64(), Some(3));
    assert_eq!(
        json["results"].as_array().expect("results array").len(),
        2,
        "--matched-only drops unmatched lines"
    );
}

#[test]
fn test_decode_missing_rule_file_exits_with_store_code() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("missing.yml");
    let output = logsift(
        dir.path(),
        &["decode", "--rules", missing.to_str().expect("utf-8 path")],
        Some(AUTH_LOG),
    );

    assert_eq!(output.status.code(), Some(3), "store failure exit code");
    assert!(output.stdout.is_empty(), "no partial results on store failure");
}

#[test]
fn test_integrity_test_with_shipped_rules_is_clean() {
    let dir = TempDir::new().expect("tempdir");
    let output = logsift(
        dir.path(),
        &["--output", "json", "test", "--rules", SHIPPED_RULES],
        None,
    );

    assert!(output.status.success(), "shipped fixtures should pass: {output:?}");
    let json = stdout_json(&output);
    assert_eq!(json["passed"].as_u64(), Some(5));
    assert_eq!(json["failed"].as_u64(), Some(0));
    assert_eq!(
        json["untested"][0]["decoderName"].as_str(),
        Some("AuthFailure"),
        "decoder without fixtures is listed as untested"
    );
}

#[test]
fn test_integrity_test_failure_exits_non_zero() {
    // Given: a fixture whose expected field disagrees with the pattern
    let dir = TempDir::new().expect("tempdir");
    let rules = write_file(
        &dir,
        "rules.yml",
        r#"
services:
  - id: ssh
    name: SSH
    prefilter_keyword: sshd
    decoders:
      - id: ssh-failed
        name: FailedPassword
        pattern: 'Failed password for (?<user>\w+)'
        tests:
          - id: wrong-user
            log_sample: "sshd: Failed password for root"
            expected_output: { user: admin }
"#,
    );

    // When
    let output = logsift(
        dir.path(),
        &[
            "--output",
            "json",
            "test",
            "--rules",
            rules.to_str().expect("utf-8 path"),
        ],
        None,
    );

    // Then: the report is printed and the exit code flags the failure
    assert_eq!(output.status.code(), Some(4), "failing decoders exit code");
    let json = stdout_json(&output);
    assert_eq!(json["failed"].as_u64(), Some(1));
    assert_eq!(json["failures"][0]["decoderName"].as_str(), Some("FailedPassword"));
}

#[test]
fn test_single_decoder_test_unknown_id() {
    let dir = TempDir::new().expect("tempdir");
    let output = logsift(
        dir.path(),
        &["test", "--rules", SHIPPED_RULES, "--decoder", "does-not-exist"],
        None,
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does-not-exist"), "error should name the decoder: {stderr}");
}

#[test]
fn test_rules_validate_shipped_rules() {
    let dir = TempDir::new().expect("tempdir");
    let output = logsift(
        dir.path(),
        &["--output", "json", "rules", "validate", SHIPPED_RULES],
        None,
    );

    assert!(output.status.success(), "shipped rules are valid: {output:?}");
    let json = stdout_json(&output);
    assert_eq!(json["valid"].as_bool(), Some(true));
    assert_eq!(json["services"].as_u64(), Some(3));
    assert_eq!(json["decoders"].as_u64(), Some(5));
}

#[test]
fn test_rules_validate_rejects_bad_pattern() {
    let dir = TempDir::new().expect("tempdir");
    let rules = write_file(
        &dir,
        "rules.yml",
        r#"
services:
  - id: app
    name: App
    prefilter_keyword: app
    decoders:
      - { id: broken, name: Broken, pattern: "(?<unclosed" }
"#,
    );

    let output = logsift(
        dir.path(),
        &[
            "--output",
            "json",
            "rules",
            "validate",
            rules.to_str().expect("utf-8 path"),
        ],
        None,
    );

    assert_eq!(output.status.code(), Some(1));
    let json = stdout_json(&output);
    assert_eq!(json["valid"].as_bool(), Some(false));
    assert!(
        json["errors"][0]
            .as_str()
            .is_some_and(|e| e.contains("broken")),
        "error should name the decoder: {json}"
    );
}

#[test]
fn test_rules_list_orders_services_by_priority() {
    let dir = TempDir::new().expect("tempdir");
    let output = logsift(
        dir.path(),
        &["--output", "json", "rules", "list", SHIPPED_RULES],
        None,
    );

    assert!(output.status.success(), "{output:?}");
    let json = stdout_json(&output);
    let ids: Vec<_> = json["services"]
        .as_array()
        .expect("services array")
        .iter()
        .filter_map(|s| s["id"].as_str())
        .collect();
    assert_eq!(ids, ["ssh", "sudo", "nginx-access"]);
}

#[test]
fn test_config_validate_missing_file_exits_with_config_code() {
    let dir = TempDir::new().expect("tempdir");
    let output = logsift(dir.path(), &["config", "validate"], None);

    assert_eq!(output.status.code(), Some(2), "missing config exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("INVALID"), "report is still rendered: {stdout}");
}
