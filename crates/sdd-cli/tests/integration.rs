#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const AUTH_SPEC: &str = "---
title: Authentication
---
# Authentication

### REQ-001: Login
Users SHALL log in with a password.

### REQ-002: Lockout
Accounts MUST lock after five failed attempts.
";

fn sdd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sdd").unwrap();
    cmd.current_dir(dir.path())
        .env("SDD_ROOT", dir.path())
        .env_remove("NO_COLOR");
    cmd
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn auth_project(code: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), ".sdd/specs/auth/spec.md", AUTH_SPEC);
    write(dir.path(), "src/auth.ts", code);
    dir
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

// ---------------------------------------------------------------------------
// sdd sync
// ---------------------------------------------------------------------------

#[test]
fn sync_reports_missing_requirement_and_exits_one() {
    let dir = auth_project("// @spec REQ-001\nexport function login() {}\n");
    sdd(&dir)
        .arg("sync")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Sync rate: 50%"))
        .stdout(predicate::str::contains("Missing (1)"))
        .stdout(predicate::str::contains("REQ-002: Lockout"));
}

#[test]
fn sync_fully_implemented_succeeds() {
    let dir = auth_project("// @spec REQ-001, REQ-002\n");
    write(
        dir.path(),
        "tests/auth.test.ts",
        "it('REQ-001: logs in', () => {});\n",
    );
    sdd(&dir)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sync rate: 100%"))
        .stdout(predicate::str::contains("All requirements are implemented."));
}

#[test]
fn sync_json_lists_orphans_with_relative_paths() {
    let dir = auth_project("// @spec REQ-001, REQ-002\n");
    write(dir.path(), "src/file.ts", "// @spec REQ-099\n");

    let v = stdout_json(sdd(&dir).args(["sync", "--json"]));
    assert_eq!(v["syncRate"], 100);
    assert_eq!(v["orphans"].as_array().unwrap().len(), 1);
    assert_eq!(v["orphans"][0]["file"], "src/file.ts");
    assert_eq!(v["orphans"][0]["reqId"], "REQ-099");
    assert_eq!(v["orphans"][0]["type"], "code");
}

#[test]
fn sync_json_mode_exits_zero_with_missing() {
    let dir = auth_project("// @spec REQ-001\n");
    sdd(&dir)
        .args(["--json", "sync"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"missing\""));
}

#[test]
fn sync_without_specs_succeeds() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "src/file.ts", "// @spec REQ-099\n");
    sdd(&dir)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("No requirements found"));

    let v = stdout_json(sdd(&dir).args(["sync", "--json"]));
    assert_eq!(v["syncRate"], 100);
    assert_eq!(v["totalRequirements"], 0);
}

#[test]
fn sync_ci_below_threshold_exits_two_and_still_prints() {
    let dir = TempDir::new().unwrap();
    let spec: String = (1..=5)
        .map(|n| format!("### REQ-00{n}: Item {n}\nIt SHALL work.\n\n"))
        .collect();
    write(dir.path(), ".sdd/specs/items/spec.md", &spec);
    write(dir.path(), "src/items.ts", "// @spec REQ-001, REQ-002, REQ-003, REQ-004\n");

    let output = sdd(&dir)
        .args(["sync", "--json", "--ci", "--threshold", "90"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["syncRate"], 80);
    assert!(String::from_utf8_lossy(&output.stderr).contains("below the required threshold"));

    sdd(&dir)
        .args(["sync", "--json", "--ci", "--threshold", "80"])
        .assert()
        .success();
}

#[test]
fn sync_threshold_out_of_range_rejected() {
    let dir = auth_project("");
    sdd(&dir)
        .args(["sync", "--ci", "--threshold", "150"])
        .assert()
        .failure();
}

#[test]
fn sync_unknown_spec_fails() {
    let dir = auth_project("// @spec REQ-001\n");
    sdd(&dir)
        .args(["sync", "ghost"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("spec not found: ghost"));
}

#[test]
fn sync_markdown_report() {
    let dir = auth_project("// @spec REQ-001\n");
    sdd(&dir)
        .args(["sync", "--markdown"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("# Spec Sync Report"))
        .stdout(predicate::str::contains("## Missing Requirements"));
}

#[test]
fn sync_writes_report_to_file() {
    let dir = auth_project("// @spec REQ-001, REQ-002\n");
    sdd(&dir)
        .args(["sync", "--markdown", "--output", "report.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let report = std::fs::read_to_string(dir.path().join("report.md")).unwrap();
    assert!(report.contains("**Sync rate:** 100%"));
    assert!(!report.contains('\u{1b}'));
}

#[test]
fn sync_honors_config_and_flag_overrides() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), ".sdd/specs/auth/spec.md", AUTH_SPEC);
    write(dir.path(), ".sdd/config.yaml", "sync:\n  src_dir: lib\n");
    write(dir.path(), "lib/auth.rs", "// @spec REQ-001, REQ-002\n");
    sdd(&dir).arg("sync").assert().success();

    write(dir.path(), "app/auth.rs", "// @spec REQ-001\n");
    sdd(&dir)
        .args(["sync", "--src", "app"])
        .assert()
        .code(1);
}

#[test]
fn sync_invalid_config_aborts() {
    let dir = auth_project("// @spec REQ-001, REQ-002\n");
    write(dir.path(), ".sdd/config.yaml", "sync:\n  threshold: 120\n");
    sdd(&dir)
        .arg("sync")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("threshold"));
}

// ---------------------------------------------------------------------------
// sdd spec
// ---------------------------------------------------------------------------

#[test]
fn spec_list_shows_counts() {
    let dir = auth_project("");
    write(dir.path(), ".sdd/specs/billing/spec.md", "# Billing\n\n### REQ-010: Invoice\nInvoices SHOULD be emailed.\n");
    sdd(&dir)
        .args(["spec", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("Authentication"))
        .stdout(predicate::str::contains("billing"));

    let v = stdout_json(sdd(&dir).args(["--json", "spec", "list"]));
    let items = v.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], "auth");
    assert_eq!(items[0]["requirementCount"], 2);
    assert_eq!(items[1]["id"], "billing");
}

#[test]
fn spec_list_empty_project() {
    let dir = TempDir::new().unwrap();
    sdd(&dir)
        .args(["spec", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No specs found"));
}

#[test]
fn spec_show_lists_requirements() {
    let dir = auth_project("");
    sdd(&dir)
        .args(["spec", "show", "auth"])
        .assert()
        .success()
        .stdout(predicate::str::contains("auth: Authentication"))
        .stdout(predicate::str::contains("REQ-001"))
        .stdout(predicate::str::contains("MUST"));

    let v = stdout_json(sdd(&dir).args(["--json", "spec", "show", "auth"]));
    assert_eq!(v["id"], "auth");
    assert_eq!(v["requirements"][1]["id"], "REQ-002");
    assert_eq!(v["requirements"][1]["keyword"], "MUST");
}

#[test]
fn spec_show_missing_fails() {
    let dir = auth_project("");
    sdd(&dir)
        .args(["spec", "show", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("spec not found"));
}
