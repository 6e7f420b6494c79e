/// CLI binary integration tests using assert_cmd
///
/// These tests invoke the actual binary against a temporary data directory
mod common;

use std::process::Command;

use assert_cmd::prelude::*;
use common::{HistoryDirBuilder, RecordBuilder};
use predicates::prelude::*;

fn qr_keeper(data_dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_qr-keeper"));
    cmd.env("QR_KEEPER_HOME", data_dir)
        .env_remove("QR_KEEPER_QUOTA_BYTES")
        .env_remove("QR_KEEPER_TRIM_RATIO");
    cmd
}

fn saved_id(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap().trim().to_string()
}

#[test]
fn test_cli_no_command_shows_help_message() {
    let dir = HistoryDirBuilder::new();
    qr_keeper(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Use --help for usage information"));
}

#[test]
fn test_cli_help_flag() {
    let dir = HistoryDirBuilder::new();
    qr_keeper(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Save, list and export generated QR codes"));
}

#[test]
fn test_cli_list_empty() {
    let dir = HistoryDirBuilder::new();
    qr_keeper(dir.path()).arg("list").assert().success().stdout(predicate::str::contains("No saved items yet."));
}

#[test]
fn test_cli_save_svg_then_list() {
    let dir = HistoryDirBuilder::new().with_svg_surface("qr.svg");

    let output = qr_keeper(dir.path())
        .args(["save", "--text", "hello", "--size", "200", "--file-name", "My File!", "--surface"])
        .arg(dir.file("qr.svg"))
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Saved to history."));
    let id = saved_id(&output);
    assert_eq!(id.len(), 36);

    qr_keeper(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(&id))
        .stdout(predicate::str::contains("My_File"))
        .stdout(predicate::str::contains("svg"))
        .stdout(predicate::str::contains("200px"));
}

#[test]
fn test_cli_save_png_then_export() {
    let dir = HistoryDirBuilder::new().with_png_surface("qr.png", 128);

    let output = qr_keeper(dir.path())
        .args(["save", "--text", "https://example.com", "--file-name", "site", "--surface"])
        .arg(dir.file("qr.png"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let id = saved_id(&output);

    let out_dir = dir.file("exports");
    qr_keeper(dir.path())
        .args(["export", &id, "--out"])
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("site.png"));

    let exported = image::open(out_dir.join("site.png")).unwrap().to_rgba8();
    assert_eq!(exported, common::checker(128));
}

#[test]
fn test_cli_save_format_mismatch_fails() {
    let dir = HistoryDirBuilder::new().with_svg_surface("qr.svg");

    qr_keeper(dir.path())
        .args(["save", "--text", "hello", "--format", "canvas", "--surface"])
        .arg(dir.file("qr.svg"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("canvas export needs a canvas surface"));

    qr_keeper(dir.path()).arg("list").assert().success().stdout(predicate::str::contains("No saved items yet."));
}

#[test]
fn test_cli_save_empty_text_is_noop() {
    let dir = HistoryDirBuilder::new().with_svg_surface("qr.svg");

    qr_keeper(dir.path())
        .args(["save", "--surface"])
        .arg(dir.file("qr.svg"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to save"));
}

#[test]
fn test_cli_rejects_out_of_range_size() {
    let dir = HistoryDirBuilder::new().with_svg_surface("qr.svg");

    qr_keeper(dir.path())
        .args(["save", "--text", "x", "--size", "1000", "--surface"])
        .arg(dir.file("qr.svg"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 120 and 512"));
}

#[test]
fn test_cli_remove() {
    let dir = HistoryDirBuilder::new().with_records(&[RecordBuilder::new("keep"), RecordBuilder::new("drop")]);

    qr_keeper(dir.path()).args(["remove", "drop"]).assert().success().stdout(predicate::str::contains("Removed drop"));
    qr_keeper(dir.path()).args(["remove", "drop"]).assert().failure();

    qr_keeper(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("keep"))
        .stdout(predicate::str::contains("drop").not());
}

#[test]
fn test_cli_quota_trims_history() {
    let records: Vec<_> = (0..6).map(|i| RecordBuilder::new(&format!("r{}", i)).padded_to(1000)).collect();
    let dir = HistoryDirBuilder::new().with_records(&records).with_svg_surface("qr.svg");

    qr_keeper(dir.path())
        .args(["--quota-bytes", "6000", "save", "--text", "new", "--surface"])
        .arg(dir.file("qr.svg"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Storage full: trimmed older history items."));
}

#[test]
fn test_cli_card_payload() {
    let dir = HistoryDirBuilder::new();

    qr_keeper(dir.path())
        .args(["card", "--card-name", "Ada", "--card-email", "ada@example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MECARD:N:Ada;EMAIL:ada@example.com;"));

    qr_keeper(dir.path()).arg("card").assert().failure();
}

#[test]
fn test_cli_malformed_history_starts_empty() {
    let dir = HistoryDirBuilder::new().with_history("{not valid json");
    qr_keeper(dir.path()).arg("list").assert().success().stdout(predicate::str::contains("No saved items yet."));
}
