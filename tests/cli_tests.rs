use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn sqlcli() -> Command {
    Command::cargo_bin("sqlcli").unwrap()
}

#[test]
fn test_starts_disconnected_and_exits() {
    sqlcli()
        .arg("--no-config")
        .write_stdin("/prompt\n/exit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Current Prompt: disconnected"))
        .stdout(predicate::str::ends_with("Bye!\n"));
}

#[test]
fn test_startup_connection_with_database_flag() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("app.db");
    sqlcli()
        .args(["--no-config", "--db"])
        .arg(&db)
        .write_stdin("CREATE TABLE t (x INTEGER);\nINSERT INTO t VALUES (7);\nSELECT x FROM t;\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Inserted 1 record."))
        .stdout(predicate::str::contains("| x |"))
        .stdout(predicate::str::contains("| 7 |"));
}

#[test]
fn test_startup_connection_with_uri() {
    let dir = TempDir::new().unwrap();
    let uri = format!("sqlite://eve@localhost/{}", dir.path().join("u.db").display());
    sqlcli()
        .arg("--no-config")
        .arg(uri)
        .write_stdin("/prompt\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Current Prompt: eve@localhost"));
}

#[test]
fn test_exit_code_of_last_error() {
    sqlcli()
        .arg("--no-config")
        .write_stdin("SELECT 1;\n")
        .assert()
        .code(12)
        .stderr(predicate::str::contains("DBDISCON"));
}

#[test]
fn test_unsupported_scheme_at_startup_continues_disconnected() {
    sqlcli()
        .args(["--no-config", "mysql://root:pw@localhost/shop"])
        .write_stdin("/prompt\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("BADURI"))
        .stdout(predicate::str::contains("Current Prompt: disconnected"));
}

#[test]
fn test_uri_conflicts_with_host_flag() {
    sqlcli()
        .args(["--no-config", "sqlite:///a.db", "--host", "h"])
        .assert()
        .failure();
}

#[test]
fn test_config_file_sets_prompt_and_raw_mode() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(
        config,
        "[session]\nprompt = \"cfg:$driver\"\n\n[raw]\nactive = true\nmode = \"schema\"\n"
    )
    .unwrap();

    sqlcli()
        .arg("--config")
        .arg(config.path())
        .write_stdin("/prompt\n/set raw\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Current Prompt: cfg:"))
        .stdout(predicate::str::contains("Raw active: on"))
        .stdout(predicate::str::contains("Raw mode: schema"));
}

#[test]
fn test_missing_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    sqlcli()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .write_stdin("")
        .assert()
        .success()
        .stderr(predicate::str::contains("CONFIG"))
        .stdout("Bye!\n");
}
