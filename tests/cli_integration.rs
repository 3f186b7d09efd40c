//! Integration tests for the envlock CLI, driven end-to-end through the
//! compiled binary via `assert_cmd`. Non-interactive flows use
//! `ENVLOCK_PASSWORD` to avoid piping passwords through stdin.

use assert_cmd::Command;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "Correct-Horse-Battery-9";

fn envlock(db_path: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("envlock").expect("binary should exist");
    cmd.args(["--db-path", db_path.to_str().unwrap()]);
    cmd
}

fn vault_db(tmp: &TempDir) -> std::path::PathBuf {
    tmp.path().join("vault.db")
}

#[test]
fn help_flag_shows_usage() {
    let mut cmd = Command::cargo_bin("envlock").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("encrypted"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("import"));
}

#[test]
fn version_flag_shows_version() {
    let mut cmd = Command::cargo_bin("envlock").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("envlock"));
}

#[test]
fn no_args_shows_usage_error() {
    let mut cmd = Command::cargo_bin("envlock").unwrap();
    cmd.assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn get_before_init_fails() {
    let tmp = TempDir::new().unwrap();
    envlock(&vault_db(&tmp))
        .args(["get", "MY_KEY"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn init_add_get_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let db = vault_db(&tmp);

    envlock(&db)
        .arg("init")
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success();

    envlock(&db)
        .args(["add", "DATABASE_URL", "postgres://localhost/app", "--env", "dev"])
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success();

    envlock(&db)
        .args(["get", "DATABASE_URL", "--env", "dev"])
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success()
        .stdout(predicate::str::contains("postgres://localhost/app"));
}

#[test]
fn init_twice_fails() {
    let tmp = TempDir::new().unwrap();
    let db = vault_db(&tmp);

    envlock(&db)
        .arg("init")
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success();

    envlock(&db)
        .arg("init")
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn adding_duplicate_secret_fails() {
    let tmp = TempDir::new().unwrap();
    let db = vault_db(&tmp);

    envlock(&db)
        .arg("init")
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success();

    envlock(&db)
        .args(["add", "API_KEY", "abc123"])
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success();

    envlock(&db)
        .args(["add", "API_KEY", "xyz789"])
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn list_on_empty_vault_reports_no_secrets() {
    let tmp = TempDir::new().unwrap();
    let db = vault_db(&tmp);

    envlock(&db)
        .arg("init")
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success();

    envlock(&db)
        .arg("list")
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success();
}

#[test]
fn delete_missing_secret_fails() {
    let tmp = TempDir::new().unwrap();
    let db = vault_db(&tmp);

    envlock(&db)
        .arg("init")
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success();

    envlock(&db)
        .args(["delete", "NOPE", "--force"])
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn run_with_no_command_fails() {
    let tmp = TempDir::new().unwrap();
    let db = vault_db(&tmp);

    envlock(&db)
        .arg("init")
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success();

    envlock(&db)
        .args(["run", "--env", "dev"])
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .failure();
}

#[test]
fn run_injects_secrets_into_child_environment() {
    let tmp = TempDir::new().unwrap();
    let db = vault_db(&tmp);

    envlock(&db)
        .arg("init")
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success();

    envlock(&db)
        .args(["add", "GREETING", "hello-from-vault"])
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success();

    envlock(&db)
        .args(["run", "--env", "dev", "--", "printenv", "GREETING"])
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success()
        .stdout(predicate::str::contains("hello-from-vault"));
}

#[test]
fn health_reports_state_without_unlocking() {
    let tmp = TempDir::new().unwrap();
    let db = vault_db(&tmp);

    envlock(&db)
        .arg("init")
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success();

    envlock(&db).arg("health").assert().success();
}

#[test]
fn export_import_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let db = vault_db(&tmp);
    let bundle = tmp.path().join("secrets.bundle");

    envlock(&db)
        .arg("init")
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success();

    envlock(&db)
        .args(["add", "TOKEN", "super-secret-token"])
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success();

    envlock(&db)
        .args(["export", bundle.to_str().unwrap()])
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .env("ENVLOCK_EXPORT_PASSWORD", "export-bundle-password")
        .assert()
        .success();

    let other_db = tmp.path().join("restored.db");
    envlock(&other_db)
        .arg("init")
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success();

    envlock(&other_db)
        .args(["import", bundle.to_str().unwrap()])
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .env("ENVLOCK_EXPORT_PASSWORD", "export-bundle-password")
        .assert()
        .success();

    envlock(&other_db)
        .args(["get", "TOKEN"])
        .env("ENVLOCK_PASSWORD", PASSWORD)
        .assert()
        .success()
        .stdout(predicate::str::contains("super-secret-token"));
}
