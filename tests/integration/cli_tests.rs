//! Integration tests for the CLI binary.
//!
//! Drives the `idr` binary against a temporary state file.
//!
//! This test is registered as a [[test]] in the identity-registry-cli crate
//! so that CARGO_BIN_EXE_idr is available.

use std::path::Path;
use std::process::{Command, Output};

const NOW: &str = "1735689600";

/// Get a Command pointing to the `idr` binary.
fn idr_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_idr"))
}

/// Run `idr --state STATE --now NOW ARGS...`.
fn idr(state: &Path, args: &[&str]) -> Output {
    idr_binary()
        .arg("--state")
        .arg(state)
        .args(["--now", NOW])
        .args(args)
        .output()
        .expect("failed to execute idr")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "idr should succeed, stderr: {}",
        stderr(output)
    );
}

fn init(state: &Path) {
    assert_ok(&idr(
        state,
        &["init", "--foundation", "0xfoundation", "--operator", "0xoperator"],
    ));
}

fn issue(state: &Path, account: &str) {
    assert_ok(&idr(
        state,
        &[
            "--as",
            "0xoperator",
            "issue",
            account,
            "--primary-id",
            "true",
            "--country",
            "sg",
            "--liveliness",
            "true",
            "--user-type",
            "1",
            "--expires",
            "+730d",
        ],
    ));
}

#[test]
fn cli_responds_to_help() {
    let output = idr_binary()
        .arg("--help")
        .output()
        .expect("failed to execute idr --help");

    assert!(
        output.status.success(),
        "idr --help should exit with success, stderr: {}",
        stderr(&output)
    );

    let out = stdout(&output);
    assert!(
        out.contains("idr") || out.contains("IdentityRegistry") || out.contains("Usage"),
        "idr --help output should contain usage information, got: {out}"
    );
}

#[test]
fn cli_responds_to_version() {
    let output = idr_binary()
        .arg("--version")
        .output()
        .expect("failed to execute idr --version");

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(
        out.contains("0.1") || out.contains("idr"),
        "idr --version should contain version info, got: {out}"
    );
}

#[test]
fn cli_exits_with_error_on_unknown_flag() {
    let output = idr_binary()
        .arg("--nonexistent-flag")
        .output()
        .expect("failed to execute idr");

    assert!(
        !output.status.success(),
        "idr with unknown flag should exit with error"
    );
}

#[test]
fn cli_init_creates_state_once() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("registry.json");

    init(&state);
    assert!(state.exists());

    let again = idr(
        &state,
        &["init", "--foundation", "0xfoundation", "--operator", "0xoperator"],
    );
    assert!(!again.status.success());
    assert!(stderr(&again).contains("already exists"));
}

#[test]
fn cli_issue_and_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("registry.json");
    init(&state);
    issue(&state, "0xinvestor");

    let get = idr(&state, &["attr", "get", "0xinvestor", "countryCode"]);
    assert_ok(&get);
    let out = stdout(&get);
    assert!(out.contains("\"sg\""), "got: {out}");
    assert!(out.contains("valid"), "got: {out}");

    let status = idr(&state, &["status", "0xinvestor"]);
    assert_ok(&status);
    let out = stdout(&status);
    assert!(out.contains("Credential: 1"), "got: {out}");
    assert!(out.contains("Suspended:  no"), "got: {out}");

    let reissue = idr(
        &state,
        &[
            "--as",
            "0xoperator",
            "issue",
            "0xinvestor",
            "--primary-id",
            "true",
            "--country",
            "my",
            "--liveliness",
            "true",
            "--user-type",
            "2",
            "--expires",
            "+1d",
        ],
    );
    assert!(!reissue.status.success());
    assert!(stderr(&reissue).contains("already holds a credential"));
}

#[test]
fn cli_mutation_requires_caller_and_role() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("registry.json");
    init(&state);
    issue(&state, "0xinvestor");

    let anonymous = idr(&state, &["suspend", "0xinvestor", "--reason", "aml"]);
    assert!(!anonymous.status.success());
    assert!(stderr(&anonymous).contains("--as"));

    let outsider = idr(
        &state,
        &["--as", "0xnobody", "suspend", "0xinvestor", "--reason", "aml"],
    );
    assert!(!outsider.status.success());
    assert!(stderr(&outsider).contains("missing role OPERATOR"));

    assert_ok(&idr(
        &state,
        &["--as", "0xoperator", "suspend", "0xinvestor", "--reason", "aml"],
    ));
    let status = stdout(&idr(&state, &["status", "0xinvestor"]));
    assert!(status.contains("Suspended:  yes (aml)"), "got: {status}");
}

#[test]
fn cli_schema_add_and_write() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("registry.json");
    init(&state);
    issue(&state, "0xinvestor");

    let add = idr(
        &state,
        &["--as", "0xoperator", "schema", "add", "accredited", "bool"],
    );
    assert_ok(&add);
    assert!(stdout(&add).contains("Added attribute 5"));

    assert_ok(&idr(
        &state,
        &[
            "--as",
            "0xoperator",
            "attr",
            "set",
            "0xinvestor",
            "accredited",
            "true",
            "--expires",
            "+365d",
        ],
    ));

    let stale = idr(
        &state,
        &[
            "--as",
            "0xoperator",
            "attr",
            "set",
            "0xinvestor",
            "accredited",
            "false",
            "--expires",
            NOW,
        ],
    );
    assert!(!stale.status.success());
    assert!(stderr(&stale).contains("Invalid expiry"));

    let list = stdout(&idr(&state, &["schema", "list"]));
    assert!(list.contains("[5] accredited (bool)"), "got: {list}");
}

#[test]
fn cli_schema_list_with_forced_count() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("registry.json");
    init(&state);

    let max = u64::MAX.to_string();
    assert_ok(&idr(
        &state,
        &["--as", "0xfoundation", "schema", "set-count", &max],
    ));

    let list = idr(&state, &["schema", "list"]);
    assert_ok(&list);
    let out = stdout(&list);
    assert!(out.contains("[4] competencyRating (uint)"), "got: {out}");
    assert!(
        out.contains(&format!("[5..={}] <undefined> (bool)", u64::MAX - 1)),
        "got: {out}"
    );

    let add = idr(
        &state,
        &["--as", "0xoperator", "schema", "add", "overflow", "bool"],
    );
    assert!(!add.status.success());
    assert!(stderr(&add).contains("Invalid attribute"), "got: {}", stderr(&add));
}

#[test]
fn cli_transfer_always_refused() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("registry.json");
    init(&state);
    issue(&state, "0xinvestor");

    let output = idr(
        &state,
        &["--as", "0xinvestor", "transfer", "0xinvestor", "0xother", "1"],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("not transferable"));
}

#[test]
fn cli_verbose_prints_events() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("registry.json");
    init(&state);

    let output = idr(
        &state,
        &[
            "--as",
            "0xfoundation",
            "--verbose",
            "role",
            "grant",
            "operator",
            "0xnewop",
        ],
    );
    assert_ok(&output);
    assert!(stdout(&output).contains("\"event\":\"role_granted\""));

    let list = stdout(&idr(&state, &["role", "list", "operator"]));
    assert!(list.contains("0xnewop"), "got: {list}");
}
