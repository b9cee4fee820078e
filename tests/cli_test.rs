//! Integration tests for the pipdesk binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A command whose config and saved selection live under `home`.
fn pipdesk(home: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("pipdesk"));
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    pipdesk(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Python interpreter discovery"))
        .stdout(predicate::str::contains("downgrade"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    pipdesk(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_requires_a_subcommand() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    pipdesk(&home).assert().failure();
    Ok(())
}

#[test]
fn schema_describes_requests() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    pipdesk(&home)
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("install_package"))
        .stdout(predicate::str::contains("cancel_operation"));
    Ok(())
}

#[test]
fn completions_for_bash() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    pipdesk(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pipdesk"));
    Ok(())
}

#[test]
fn ls_as_json() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let dir = TempDir::new()?;
    fs::create_dir(dir.path().join("projects"))?;
    fs::write(dir.path().join("notes.txt"), "")?;

    let output = pipdesk(&home)
        .arg("--json")
        .arg("ls")
        .arg(dir.path())
        .output()?;
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let names: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["projects"]);
    Ok(())
}

#[test]
fn ls_missing_directory_fails() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    pipdesk(&home)
        .args(["--json", "ls"])
        .arg(home.path().join("nowhere"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("path_unreadable"));
    Ok(())
}

#[test]
fn current_without_selection() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    pipdesk(&home)
        .arg("current")
        .assert()
        .success()
        .stdout(predicate::str::contains("No interpreter selected"));
    Ok(())
}

#[test]
fn packages_need_an_interpreter() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    pipdesk(&home)
        .arg("packages")
        .assert()
        .failure()
        .stderr(predicate::str::contains("pipdesk select"));
    Ok(())
}

#[test]
fn bad_config_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let config = home.path().join("broken.yml");
    fs::write(&config, "index_timeout_secs: soon\n")?;

    pipdesk(&home)
        .arg("--config")
        .arg(&config)
        .arg("home")
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.yml"));
    Ok(())
}

#[test]
fn serve_answers_each_line() -> Result<(), Box<dyn std::error::Error>> {
    let home = TempDir::new()?;
    let output = pipdesk(&home)
        .arg("serve")
        .write_stdin("{\"id\": 1, \"command\": \"get_selected_python\"}\nnot json\n")
        .output()?;
    assert!(output.status.success());

    let frames: Vec<serde_json::Value> = String::from_utf8(output.stdout)?
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(frames.len(), 2);

    let answer = frames.iter().find(|f| f["id"] == 1).unwrap();
    assert_eq!(
        answer["response"],
        serde_json::json!({"type": "selected", "data": null})
    );

    let rejected = frames.iter().find(|f| f["id"].is_null()).unwrap();
    assert_eq!(rejected["error"]["kind"], "invalid_request");
    Ok(())
}

#[cfg(unix)]
#[test]
fn selection_survives_restart() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::fs::PermissionsExt;

    let home = TempDir::new()?;
    let python = home.path().join("python3");
    fs::write(&python, "#!/bin/sh\necho 'Python 3.11.4'\n")?;
    fs::set_permissions(&python, fs::Permissions::from_mode(0o755))?;

    pipdesk(&home)
        .arg("select")
        .arg(&python)
        .assert()
        .success()
        .stdout(predicate::str::contains("Python 3.11.4"));

    pipdesk(&home)
        .arg("current")
        .assert()
        .success()
        .stdout(predicate::str::contains("Python 3.11.4"));

    pipdesk(&home).args(["select", "--clear"]).assert().success();

    pipdesk(&home)
        .arg("current")
        .assert()
        .success()
        .stdout(predicate::str::contains("No interpreter selected"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn persistence_can_be_disabled() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::fs::PermissionsExt;

    let home = TempDir::new()?;
    let python = home.path().join("python3");
    fs::write(&python, "#!/bin/sh\necho 'Python 3.11.4'\n")?;
    fs::set_permissions(&python, fs::Permissions::from_mode(0o755))?;
    let config = home.path().join("pipdesk.yml");
    fs::write(&config, "persist_selection: false\n")?;

    pipdesk(&home)
        .arg("--config")
        .arg(&config)
        .arg("select")
        .arg(&python)
        .assert()
        .success();

    pipdesk(&home)
        .arg("--config")
        .arg(&config)
        .arg("current")
        .assert()
        .success()
        .stdout(predicate::str::contains("No interpreter selected"));
    Ok(())
}
