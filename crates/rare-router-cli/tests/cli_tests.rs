//! Integration tests for the `rare-router` binary.
//!
//! Every test runs against the offline fixture directory and a temporary data
//! directory, so nothing here touches the network or the user's cache.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Temporary data directory seeded with the origin table and curated prices.
struct TestEnv {
    temp_dir: TempDir,
}

impl TestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        for file in ["rareSystemsCache.json", "curatedPrices.json"] {
            fs::copy(fixtures_dir().join(file), temp_dir.path().join(file))
                .expect("copy fixture");
        }
        Self { temp_dir }
    }

    fn snapshot_path(&self) -> PathBuf {
        self.temp_dir.path().join("systemCache.json")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("rare-router").expect("binary exists");
        cmd.env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("RARE_ROUTER_DATA_DIR")
            .env_remove("RARE_ROUTER_CONFIG")
            .arg("--data-dir")
            .arg(self.temp_dir.path())
            .arg("--config")
            .arg(self.temp_dir.path().join("config.json"))
            .arg("--offline")
            .arg(fixtures_dir().join("systems.json"))
            .arg("--catalog")
            .arg(fixtures_dir().join("rares.json"));
        cmd
    }

    fn json(&self, args: &[&str]) -> Value {
        let output = self
            .command()
            .args(args)
            .args(["--format", "json"])
            .output()
            .expect("run rare-router");
        assert!(
            output.status.success(),
            "command failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is JSON")
    }
}

fn record<'a>(records: &'a Value, rare: &str) -> &'a Value {
    records
        .as_array()
        .expect("array of records")
        .iter()
        .find(|r| r["rare"] == rare)
        .unwrap_or_else(|| panic!("no record for {rare}"))
}

#[test]
fn test_scan_json_keeps_catalog_order() {
    let env = TestEnv::new();
    let records = env.json(&["scan", "Sol", "--system-type", "acquisition"]);

    let names: Vec<&str> = records
        .as_array()
        .expect("array")
        .iter()
        .map(|r| r["rare"].as_str().expect("rare name"))
        .collect();
    assert_eq!(
        names,
        vec![
            "Lavian Brandy",
            "Leestian Evil Juice",
            "Onionhead",
            "Eranin Pearl Whisky",
            "Jaroua Rice"
        ]
    );

    let brandy = record(&records, "Lavian Brandy");
    assert_eq!(brandy["legal"], true);
    assert_eq!(brandy["ppEligible"], true);
    assert_eq!(brandy["cpDivisors"]["effective"], 5333);
    assert!(brandy["distanceFromCurrentLy"].as_f64().expect("distance") > 100.0);

    let juice = record(&records, "Leestian Evil Juice");
    assert_eq!(juice["cost"], 7200, "curated price applies");

    let onionhead = record(&records, "Onionhead");
    assert_eq!(onionhead["legal"], false);
    assert_eq!(onionhead["cpDivisors"], Value::Null);

    let whisky = record(&records, "Eranin Pearl Whisky");
    assert_eq!(whisky["systemNotFound"], false);

    let rice = record(&records, "Jaroua Rice");
    assert_eq!(rice["systemNotFound"], true);
    assert_eq!(rice["legalReason"], "origin system not found");
    assert_eq!(rice["distanceFromCurrentLy"], 0.0);
}

#[test]
fn test_scan_text_shows_reasons() {
    let env = TestEnv::new();
    env.command()
        .args(["scan", "Sol", "--finance-ethos"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Rare goods from Sol (system type: none, finance ethos: yes)",
        ))
        .stdout(predicate::str::contains(
            "Illegal in Federation Democracy systems",
        ))
        .stdout(predicate::str::contains("origin system not found"))
        .stdout(predicate::str::contains("5 goods:"));
}

#[test]
fn test_unknown_current_system_suggests_alternatives() {
    let env = TestEnv::new();
    env.command()
        .args(["scan", "Soll"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "could not resolve current system 'Soll'",
        ))
        .stderr(predicate::str::contains("Did you mean 'Sol'?"));
}

#[test]
fn test_analyze_json_reports_profit_range() {
    let env = TestEnv::new();
    let records = env.json(&["analyze", "Sol", "Lave", "--system-type", "exploit"]);

    let brandy = record(&records, "Lavian Brandy");
    assert_eq!(brandy["distanceOriginToTargetLy"], 0.0);
    assert_eq!(brandy["inProfitRange"], false);
    assert_eq!(brandy["ppEligible"], true);

    let onionhead = record(&records, "Onionhead");
    assert_eq!(onionhead["legal"], true, "Lave is not a Federation democracy");
    assert_eq!(onionhead["ppEligible"], true);
    assert_eq!(onionhead["inProfitRange"], true);

    let juice = record(&records, "Leestian Evil Juice");
    assert_eq!(juice["ppEligible"], false);
}

#[test]
fn test_lookup_persists_snapshot_on_exit() {
    let env = TestEnv::new();
    env.command()
        .args(["lookup", "lave"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Lave [75.75, 48.75, 70.75] Independent / Dictatorship",
        ));
    assert!(env.snapshot_path().exists(), "snapshot flushed on exit");

    let status = env.json(&["status"]);
    assert_eq!(status["exactEntries"], 1);
    assert_eq!(status["originEntries"], 1);
    assert_eq!(status["directoryLookups"], 0);
}

#[test]
fn test_lookup_unknown_system_fails_with_hint() {
    let env = TestEnv::new();
    env.command()
        .args(["lookup", "Lavee"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("system 'Lavee' not found"))
        .stderr(predicate::str::contains("Did you mean 'Lave'?"));
}

#[test]
fn test_search_ranks_prefix_matches() {
    let env = TestEnv::new();
    let hits = env.json(&["search", "Le"]);
    let hits = hits.as_array().expect("array");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["name"], "Leesti");
    assert_eq!(hits[0]["score"], 0.9);
}

#[test]
fn test_rares_query_filters_catalog() {
    let env = TestEnv::new();
    env.command()
        .args(["rares", "--query", "lav"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lavian Brandy Lave / Lave Station [pad L]"))
        .stdout(predicate::str::contains("1 rare goods"));

    env.command()
        .args(["rares", "--query", "zzzz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no rare goods match 'zzzz'"));
}

#[test]
fn test_invalid_system_type_is_rejected() {
    let env = TestEnv::new();
    env.command()
        .args(["scan", "Sol", "--system-type", "fortified"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown system type 'fortified'"));
}
