//! CLI integration tests.
//!
//! These tests verify the CLI argument parsing and configuration loading.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

use play_ledger::cli::parse_args_from;
use play_ledger::config::{Config, ConfigError};

fn args(args: &[&str]) -> Vec<OsString> {
    std::iter::once("play-ledger")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

// ============================================================================
// CLI Argument Tests
// ============================================================================

#[test]
fn test_cli_defaults() {
    let result = parse_args_from(args(&[])).unwrap();

    assert!(result.host.is_none());
    assert!(result.port.is_none());
    assert!(result.config.is_none());
    assert!(result.store_url.is_none());
    assert!(result.store_key.is_none());
}

#[test]
fn test_cli_full_options() {
    let result = parse_args_from(args(&[
        "-H",
        "0.0.0.0",
        "-p",
        "8080",
        "-u",
        "https://xyz.supabase.co",
        "-k",
        "anon-key",
        "-d",
        "/var/lib/play-ledger",
        "-l",
        "debug",
    ]))
    .unwrap();

    assert_eq!(result.host.unwrap().to_string(), "0.0.0.0");
    assert_eq!(result.port, Some(8080));
    assert_eq!(result.store_url.as_deref(), Some("https://xyz.supabase.co"));
    assert_eq!(result.store_key.as_deref(), Some("anon-key"));
    assert_eq!(result.data_dir, Some(PathBuf::from("/var/lib/play-ledger")));
    assert_eq!(result.log_level.as_deref(), Some("debug"));
}

#[test]
fn test_cli_invalid_host() {
    assert!(parse_args_from(args(&["-H", "not-an-ip"])).is_err());
}

#[test]
fn test_cli_unknown_flag() {
    assert!(parse_args_from(args(&["--no-such-flag"])).is_err());
}

// ============================================================================
// Configuration Loading Tests
// ============================================================================

#[test]
fn test_config_file_then_args() {
    let json = r#"{
        "server": { "port": 9000 },
        "store": { "url": "https://file.example", "api_key": "file-key" }
    }"#;
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let parsed = parse_args_from(args(&["-c", &path, "-k", "cli-key"])).unwrap();
    let mut config = Config::from_file(parsed.config.as_ref().unwrap()).unwrap();
    config.apply_args(&parsed);

    assert_eq!(config.server.port, 9000);
    assert_eq!(config.store.url.as_deref(), Some("https://file.example"));
    assert_eq!(config.store.api_key.as_deref(), Some("cli-key"));
    assert!(config.rest_config().is_ok());
}

#[test]
fn test_config_missing_file() {
    let result = Config::from_file(std::path::Path::new("/nonexistent/play-ledger.json"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_config_malformed_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"{ not json").unwrap();

    let result = Config::from_file(file.path());
    assert!(matches!(result, Err(ConfigError::Json(_))));
}

#[test]
fn test_missing_store_config_is_fatal() {
    let config = Config::default();
    let err = config.rest_config().unwrap_err();
    assert!(err.to_string().contains("PLAY_LEDGER_STORE_URL"));
}
