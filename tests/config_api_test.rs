//! Integration tests for config module public API.

use pipdesk::config::{load_config, load_from_paths, ConfigPaths, PipdeskConfig};
use std::fs;
use tempfile::TempDir;

#[test]
fn no_files_give_defaults() {
    assert_eq!(
        load_from_paths(&ConfigPaths::default()).unwrap(),
        PipdeskConfig::default()
    );
}

#[test]
fn missing_explicit_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let err = load_config(Some(&temp.path().join("absent.yml"))).unwrap_err();
    assert_eq!(err.kind(), "io");
}

#[test]
fn explicit_file_overrides_user_file() {
    let temp = TempDir::new().unwrap();
    let user = temp.path().join("user.yml");
    let explicit = temp.path().join("explicit.yml");
    fs::write(&user, "log_tail_lines: 10\nindex_timeout_secs: 3\n").unwrap();
    fs::write(&explicit, "log_tail_lines: 25\n").unwrap();

    let config = load_from_paths(&ConfigPaths {
        user: Some(user),
        explicit: Some(explicit),
    })
    .unwrap();

    assert_eq!(config.log_tail_lines, 25);
    assert_eq!(config.index_timeout_secs, 3);
}

#[test]
fn parse_error_names_the_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yml");
    fs::write(&path, "log_tail_lines: [not, a, number]\n").unwrap();

    let err = load_from_paths(&ConfigPaths {
        user: None,
        explicit: Some(path),
    })
    .unwrap_err();
    assert_eq!(err.kind(), "config_parse_error");
    assert!(err.to_string().contains("config.yml"));
}
