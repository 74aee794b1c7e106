//! End-to-end tests for the `shade` commands.
//!
//! These override the process-wide OS detector, so they run serially.

use clap::Parser;
use serde_json::Value;
use serial_test::serial;
use shade::{set_theme_detector, ColorMode};
use shade_cli::{run, Cli};
use std::fs;
use std::path::Path;

fn run_json(store: &Path, args: &[&str]) -> Value {
    let mut argv = vec!["shade", "--json", "--store", store.to_str().unwrap()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).expect("arguments should parse");

    let mut out = Vec::new();
    run(&cli, &mut out).expect("command should succeed");
    serde_json::from_slice(&out).expect("output should be JSON")
}

#[test]
#[serial]
fn show_uses_system_without_saved_choice() {
    set_theme_detector(|| ColorMode::Dark);
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("prefs.json");

    let report = run_json(&store, &["show"]);
    assert_eq!(report["theme"], "dark");
    assert_eq!(report["source"], "system");
    assert_eq!(report["saved"], Value::Null);
    assert!(!store.exists(), "show must not write the store");

    set_theme_detector(|| ColorMode::Light);
}

#[test]
#[serial]
fn toggle_saves_inverse() {
    set_theme_detector(|| ColorMode::Light);
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("prefs.json");

    let report = run_json(&store, &["toggle"]);
    assert_eq!(report["theme"], "dark");
    assert_eq!(report["saved"], "dark");

    let report = run_json(&store, &["toggle"]);
    assert_eq!(report["theme"], "light");
    assert_eq!(report["saved"], "light");
}

#[test]
#[serial]
fn saved_choice_beats_system() {
    set_theme_detector(|| ColorMode::Dark);
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("prefs.json");

    run_json(&store, &["set", "light"]);
    let report = run_json(&store, &["show"]);
    assert_eq!(report["theme"], "light");
    assert_eq!(report["source"], "saved");
    assert_eq!(report["system"], "dark");

    set_theme_detector(|| ColorMode::Light);
}

#[test]
#[serial]
fn reset_returns_to_system() {
    set_theme_detector(|| ColorMode::Dark);
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("prefs.json");

    run_json(&store, &["set", "light"]);
    let report = run_json(&store, &["reset"]);
    assert_eq!(report["theme"], "dark");
    assert_eq!(report["source"], "system");
    assert_eq!(report["saved"], Value::Null);

    set_theme_detector(|| ColorMode::Light);
}

#[test]
#[serial]
fn reset_keeps_other_settings() {
    set_theme_detector(|| ColorMode::Light);
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("prefs.json");
    fs::write(&store, r#"{"theme": "dark", "n": 1}"#).unwrap();

    let report = run_json(&store, &["reset"]);
    assert_eq!(report["theme"], "light");
    assert_eq!(report["saved"], Value::Null);

    let entries: Value = serde_json::from_str(&fs::read_to_string(&store).unwrap()).unwrap();
    assert_eq!(entries, serde_json::json!({"n": 1}));
}

#[test]
#[serial]
fn reset_of_unreadable_store_is_reported() {
    set_theme_detector(|| ColorMode::Light);
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("prefs.json");
    fs::write(&store, "not json").unwrap();
    let cli = Cli::try_parse_from(["shade", "--store", store.to_str().unwrap(), "reset"]).unwrap();

    let err = run(&cli, &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("could not read the saved theme"));
    assert_eq!(fs::read_to_string(&store).unwrap(), "not json");
}

#[test]
#[serial]
fn custom_storage_key_from_config() {
    set_theme_detector(|| ColorMode::Light);
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("prefs.json");
    let config = dir.path().join("shade.json");
    fs::write(&config, r#"{ "storage_key": "site-theme" }"#).unwrap();

    run_json(&store, &["--config", config.to_str().unwrap(), "set", "dark"]);
    let text = fs::read_to_string(&store).unwrap();
    assert!(text.contains("\"site-theme\": \"dark\""));
}

#[test]
fn unknown_theme_is_rejected_by_parser() {
    let err = Cli::try_parse_from(["shade", "set", "sepia"]).unwrap_err();
    assert!(err.to_string().contains("sepia"));
}

#[test]
#[serial]
fn unwritable_store_is_reported() {
    set_theme_detector(|| ColorMode::Light);
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("missing").join("prefs.json");
    let cli = Cli::try_parse_from(["shade", "--store", store.to_str().unwrap(), "toggle"]).unwrap();

    let err = run(&cli, &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("could not update the saved theme"));
}

#[test]
#[serial]
fn text_report_lists_all_sources() {
    set_theme_detector(|| ColorMode::Light);
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("prefs.json");
    let cli = Cli::try_parse_from(["shade", "--store", store.to_str().unwrap(), "show"]).unwrap();

    let mut out = Vec::new();
    run(&cli, &mut out).unwrap();
    let text = console::strip_ansi_codes(&String::from_utf8(out).unwrap()).into_owned();
    assert!(text.contains("theme   light (system)"));
    assert!(text.contains("saved   none"));
    assert!(text.contains("system  light"));
}
