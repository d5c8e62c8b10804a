//! CLI end-to-end tests
//!
//! Tests for the prerollforge command-line interface. Generation runs use
//! `--dry-run`, so ffmpeg is not required.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

/// Get a command for the prerollforge binary
#[allow(deprecated)]
fn prerollforge_cmd() -> Command {
    Command::cargo_bin("prerollforge").unwrap()
}

/// Temp dir holding an empty config and a placeholder font, so runs do not
/// depend on files of the host.
fn sandbox() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempdir().unwrap();
    let config = dir.path().join("prerollforge.toml");
    fs::write(&config, "").unwrap();
    let font = dir.path().join("Test.ttf");
    fs::write(&font, b"not really a font").unwrap();
    (dir, config, font)
}

fn dry_run(config: &Path, font: &Path) -> Command {
    let mut cmd = prerollforge_cmd();
    cmd.arg("--config")
        .arg(config)
        .arg("generate")
        .arg("--dry-run")
        .arg("--font")
        .arg(font);
    cmd
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = prerollforge_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = prerollforge_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("prerollforge"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = prerollforge_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "prerollforge {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = prerollforge_cmd();
    cmd.arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg"));
}

#[test]
fn test_cli_generate_requires_title() {
    let mut cmd = prerollforge_cmd();
    cmd.arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--title"));
}

#[test]
fn test_cli_dry_run_lists_operations() {
    let (_dir, config, font) = sandbox();
    dry_run(&config, &font)
        .args(["--title", "Test", "--frame-rate", "24", "--resolution", "1920x1080"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[DRY RUN] 6 encoder operations"))
        .stdout(predicate::str::contains("anullsrc=r=48000:cl=stereo"))
        .stdout(predicate::str::contains("sine=frequency=1000"))
        .stdout(predicate::str::contains("concat=n=3:v=1:a=0[vout]"))
        .stdout(predicate::str::contains("-c:v prores_ks -profile:v 3"))
        .stdout(predicate::str::contains("-timecode 00:59:50:00"))
        .stdout(predicate::str::contains("Would write: Test_"));
}

#[test]
fn test_cli_dry_run_without_audio() {
    let (_dir, config, font) = sandbox();
    dry_run(&config, &font)
        .args(["--title", "Test", "--no-audio", "--profile", "4444"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[DRY RUN] 2 encoder operations"))
        .stdout(predicate::str::contains("anullsrc").not())
        .stdout(predicate::str::contains("yuv444p10le"));
}

#[test]
fn test_cli_dry_run_json() {
    let (_dir, config, font) = sandbox();
    let output = dry_run(&config, &font)
        .args(["--title", "Episode #1: Pilot!", "--json", "--frame-rate", "23.976"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["media_type"], "video/quicktime");
    let name = json["suggested_file_name"].as_str().unwrap();
    assert!(name.starts_with("Episode1Pilot_"), "{name}");
    assert!(name.ends_with(".mov"));

    let commands = json["commands"].as_array().unwrap();
    assert_eq!(commands.len(), 6);
    let compose = commands[4].as_array().unwrap();
    assert!(compose
        .iter()
        .any(|a| a.as_str().unwrap().contains("r=24000/1001")));
}

#[test]
fn test_cli_escapes_quotes_in_title() {
    let (_dir, config, font) = sandbox();
    dry_run(&config, &font)
        .args(["--title", "O'Brien", "--version-text", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r"text='O\'\''Brien'"))
        .stdout(predicate::str::contains("text='Version 2'"));
}

#[test]
fn test_cli_rejects_bad_frame_rate() {
    let (_dir, config, font) = sandbox();
    dry_run(&config, &font)
        .args(["--title", "Test", "--frame-rate", "fast"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("frame rate"));
}

#[test]
fn test_cli_rejects_too_low_frame_rate() {
    let (_dir, config, font) = sandbox();
    dry_run(&config, &font)
        .args(["--title", "Test", "--frame-rate", "0.25"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid timing"));
}

#[test]
fn test_cli_rejects_frame_rate_too_high_for_a_pop_frame() {
    let (_dir, config, font) = sandbox();
    dry_run(&config, &font)
        .args(["--title", "Test", "--frame-rate", "3000000", "--resolution", "16x16"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("frame rate"));
}

#[test]
fn test_cli_rejects_bad_resolution() {
    let (_dir, config, font) = sandbox();
    dry_run(&config, &font)
        .args(["--title", "Test", "--resolution", "1920by1080"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("resolution"));
}

#[test]
fn test_cli_rejects_missing_font() {
    let (dir, config, _font) = sandbox();
    dry_run(&config, &dir.path().join("missing.ttf"))
        .args(["--title", "Test"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Font file does not exist"));
}

#[test]
fn test_cli_defaults_come_from_config() {
    let (_dir, config, font) = sandbox();
    fs::write(
        &config,
        "[defaults]\nframe_rate = \"25\"\nresolution = \"1280x720\"\ntimecode = \"09:59:50:00\"\n",
    )
    .unwrap();
    dry_run(&config, &font)
        .args(["--title", "Test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("s=1280x720:r=25"))
        .stdout(predicate::str::contains("-timecode 09:59:50:00"));
}

#[test]
fn test_cli_validate_config() {
    let (_dir, config, _font) = sandbox();
    fs::write(&config, "[render]\nprofile = \"lt\"\ninclude_audio = false\n").unwrap();

    let mut cmd = prerollforge_cmd();
    cmd.arg("validate")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("Profile: LT"))
        .stdout(predicate::str::contains("Audio: false"));
}

#[test]
fn test_cli_validate_invalid_config() {
    let (_dir, config, _font) = sandbox();
    fs::write(&config, "[render\nprofile = ").unwrap();

    let mut cmd = prerollforge_cmd();
    cmd.arg("validate")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_cli_validate_reports_warnings() {
    let (_dir, config, _font) = sandbox();
    fs::write(&config, "[tools]\ntimeout_secs = 0\n").unwrap();

    let mut cmd = prerollforge_cmd();
    cmd.arg("validate")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Warnings"))
        .stdout(predicate::str::contains("timeout_secs"));
}
