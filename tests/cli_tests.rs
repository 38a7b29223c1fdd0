mod common;

use anyhow::Result;
use assert_cmd::Command;
use common::{Scenario, read_listing};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_missing_config_fails_before_watching() -> Result<()> {
    let scenario = Scenario::new();

    Command::cargo_bin("path-watcher")?
        .env_remove("PATH_WATCHER_CONFIG")
        .args(["--config", scenario.config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    assert!(!scenario.output.exists());
    assert!(!scenario.log.exists());
    Ok(())
}

#[test]
fn test_malformed_config_fails() -> Result<()> {
    let scenario = Scenario::new();
    fs::create_dir_all(scenario.config.parent().unwrap())?;
    fs::write(&scenario.config, "[watch\npaths = ")?;

    Command::cargo_bin("path-watcher")?
        .args(["--config", scenario.config.to_str().unwrap(), "snapshot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error parsing configuration file"));
    Ok(())
}

#[test]
fn test_missing_root_fails() -> Result<()> {
    let scenario = Scenario::new();
    let missing = scenario.temp.path().join("missing");
    scenario.write_config(&[&missing], false);

    Command::cargo_bin("path-watcher")?
        .args(["--config", scenario.config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    assert!(!scenario.output.exists());
    Ok(())
}

#[test]
fn test_snapshot_writes_listing() -> Result<()> {
    let scenario = Scenario::new();
    scenario.write_config(&[&scenario.watched], false);

    Command::cargo_bin("path-watcher")?
        .args(["--config", scenario.config.to_str().unwrap(), "snapshot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 entries"));

    assert_eq!(
        read_listing(&scenario.output).unwrap(),
        vec!["a.txt".to_string(), "sub/".to_string()]
    );
    assert!(!scenario.output.with_file_name("listing.txt.lock").exists());
    Ok(())
}

#[test]
fn test_snapshot_recursive_to_stdout() -> Result<()> {
    let scenario = Scenario::new();
    fs::write(scenario.watched.join("sub/c.txt"), "c")?;
    scenario.write_config(&[&scenario.watched], true);

    Command::cargo_bin("path-watcher")?
        .env("PATH_WATCHER_CONFIG", &scenario.config)
        .args(["snapshot", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::eq("a.txt\nsub/\nsub/c.txt\n"));

    assert!(!scenario.output.exists());
    Ok(())
}

#[test]
fn test_snapshot_prefixes_multiple_roots() -> Result<()> {
    let scenario = Scenario::new();
    let other = scenario.temp.path().join("other");
    fs::create_dir_all(&other)?;
    fs::write(other.join("c.txt"), "c")?;
    scenario.write_config(&[&scenario.watched, &other], false);

    let watched = scenario.watched.to_string_lossy().to_string();
    let other_root = other.to_string_lossy().to_string();
    let expected = format!("{watched}/a.txt\n{watched}/sub/\n{other_root}/c.txt\n");

    Command::cargo_bin("path-watcher")?
        .args(["--config", scenario.config.to_str().unwrap(), "snapshot", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::eq(expected));
    Ok(())
}

#[test]
fn test_legacy_keys_are_reported() -> Result<()> {
    let scenario = Scenario::new();
    fs::create_dir_all(scenario.config.parent().unwrap())?;
    fs::write(
        &scenario.config,
        format!("path = {:?}\n", scenario.watched.to_string_lossy()),
    )?;

    Command::cargo_bin("path-watcher")?
        .args(["--config", scenario.config.to_str().unwrap(), "snapshot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration warnings"))
        .stderr(predicate::str::contains("No watch root"));
    Ok(())
}

#[test]
fn test_completion() -> Result<()> {
    Command::cargo_bin("path-watcher")?
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("path-watcher"));
    Ok(())
}
