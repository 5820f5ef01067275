#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn siteid(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("siteid").unwrap();
    cmd.current_dir(dir.path())
        .env("SITEID_ROOT", dir.path())
        .env_remove("SITEID_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn write_snapshot(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn pin_year(dir: &TempDir, year: i32) {
    let cfg = dir.path().join(".siteid");
    std::fs::create_dir_all(&cfg).unwrap();
    std::fs::write(cfg.join("config.yaml"), format!("reference_year: {year}\n")).unwrap();
}

const MIXED: &str = r#"[
  {"id": "a", "facility_id": "SITE-SE-02", "order_id": "ORD-2025-99", "crew": "north"},
  {"id": "b", "facility_id": "SITE-SE-01", "order_id": "ORD-2025-01", "created_date": "2025-01-01T00:00:00Z"},
  {"id": "c", "facility_id": "SITE-SE-01", "order_id": "ORD-2025-01", "created_date": "2025-02-01T00:00:00Z"},
  {"id": "d", "facility_id": "SITE-3", "order_id": "ORD-2025-03"},
  {"id": "e", "facility_id": "SITE-SE-05", "order_id": "5"}
]"#;

fn read_json(path: &PathBuf) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// siteid report
// ---------------------------------------------------------------------------

#[test]
fn report_json_counts_every_category() {
    let dir = TempDir::new().unwrap();
    pin_year(&dir, 2026);
    let snap = write_snapshot(&dir, "orders.json", MIXED);

    let out = siteid(&dir)
        .args(["report", "--json"])
        .arg(&snap)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();

    assert_eq!(report["totalOrders"], 5);
    assert_eq!(report["invalid"], 5);
    assert_eq!(report["healthScore"], 0);
    assert_eq!(report["issues"]["suffixMismatches"], 1);
    assert_eq!(report["issues"]["duplicateFacilities"], 1);
    assert_eq!(report["issues"]["invalidFacilityFormats"], 1);
    assert_eq!(report["issues"]["invalidOrderFormats"], 1);
    assert_eq!(report["issues"]["missingIds"], 0);
    assert_eq!(
        report["details"]["duplicateGroups"][0]["survivorId"],
        "b"
    );
}

#[test]
fn report_text_for_clean_snapshot() {
    let dir = TempDir::new().unwrap();
    let snap = write_snapshot(
        &dir,
        "orders.yaml",
        "- id: a\n  facility_id: SITE-SE-01\n  order_id: ORD-2024-01\n",
    );
    siteid(&dir)
        .arg("report")
        .arg(&snap)
        .assert()
        .success()
        .stdout(predicate::str::contains("health: 100%"))
        .stdout(predicate::str::contains("No identifier issues found."));
}

#[test]
fn report_rejects_unknown_extension() {
    let dir = TempDir::new().unwrap();
    let snap = write_snapshot(&dir, "orders.csv", "id,facility_id\n");
    siteid(&dir)
        .arg("report")
        .arg(&snap)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported snapshot format"));
}

// ---------------------------------------------------------------------------
// siteid fix
// ---------------------------------------------------------------------------

#[test]
fn fix_dry_run_leaves_snapshot_untouched() {
    let dir = TempDir::new().unwrap();
    pin_year(&dir, 2026);
    let snap = write_snapshot(&dir, "orders.json", MIXED);

    siteid(&dir)
        .args(["fix", "--dry-run"])
        .arg(&snap)
        .assert()
        .success()
        .stdout(predicate::str::contains("Planned: 2 update(s), 1 deletion(s)"))
        .stdout(predicate::str::contains("ORD-2025-99 -> ORD-2025-02"))
        .stdout(predicate::str::contains("Needs manual correction"));

    assert_eq!(std::fs::read_to_string(&snap).unwrap(), MIXED);
}

#[test]
fn fix_applies_and_is_idempotent() {
    let dir = TempDir::new().unwrap();
    pin_year(&dir, 2026);
    let snap = write_snapshot(&dir, "orders.json", MIXED);

    let out = siteid(&dir)
        .args(["fix", "--json"])
        .arg(&snap)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let result: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(result["summary"]["updated"], 2);
    assert_eq!(result["summary"]["deleted"], 1);
    assert_eq!(result["errors"].as_array().unwrap().len(), 1);
    assert_eq!(result["errors"][0]["operation"], "unresolved");
    assert_eq!(result["report"]["issues"]["suffixMismatches"], 0);
    assert_eq!(result["report"]["issues"]["duplicateFacilities"], 0);

    let records = read_json(&snap);
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 4);
    let a = records.iter().find(|r| r["id"] == "a").unwrap();
    assert_eq!(a["order_id"], "ORD-2025-02");
    assert_eq!(a["crew"], "north");
    let e = records.iter().find(|r| r["id"] == "e").unwrap();
    assert_eq!(e["order_id"], "ORD-2026-05");
    assert!(records.iter().all(|r| r["id"] != "c"));

    siteid(&dir)
        .args(["fix", "--dry-run"])
        .arg(&snap)
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to fix automatically."));
}

// ---------------------------------------------------------------------------
// siteid derive / validate
// ---------------------------------------------------------------------------

#[test]
fn derive_prints_order_id() {
    let dir = TempDir::new().unwrap();
    siteid(&dir)
        .args(["derive", "SITE-SE-07", "--year", "2025"])
        .assert()
        .success()
        .stdout("ORD-2025-07\n");
}

#[test]
fn derive_uses_reference_year() {
    let dir = TempDir::new().unwrap();
    pin_year(&dir, 2031);
    siteid(&dir)
        .args(["derive", "SITE-NO0042"])
        .assert()
        .success()
        .stdout("ORD-2031-0042\n");
}

#[test]
fn derive_rejects_malformed_facility() {
    let dir = TempDir::new().unwrap();
    siteid(&dir)
        .args(["derive", "SITE-07"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid facility id 'SITE-07'"));
}

#[test]
fn derive_rejects_year_outside_four_digits() {
    let dir = TempDir::new().unwrap();
    siteid(&dir)
        .args(["derive", "SITE-SE-01", "--year", "12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("year 12345 cannot be written"));
}

#[test]
fn fix_refuses_unwritable_reference_year() {
    let dir = TempDir::new().unwrap();
    pin_year(&dir, 12345);
    let snap = write_snapshot(&dir, "orders.json", MIXED);
    siteid(&dir)
        .arg("fix")
        .arg(&snap)
        .assert()
        .failure()
        .stderr(predicate::str::contains("reference_year 12345 is not a four-digit year"));
    assert_eq!(std::fs::read_to_string(&snap).unwrap(), MIXED);
}

#[test]
fn validate_classifies_ids() {
    let dir = TempDir::new().unwrap();
    siteid(&dir)
        .args(["validate", "SITE-SE-07"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid facility id (region SE, sequence 07)"));
    siteid(&dir)
        .args(["validate", "ORD-2025-07"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid order id (year 2025, sequence 07)"));
    siteid(&dir)
        .args(["validate", "ORD-2025-99999999999999999999999"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sequence 99999999999999999999999"));
    siteid(&dir).args(["validate", "nope"]).assert().failure();
}

// ---------------------------------------------------------------------------
// siteid config
// ---------------------------------------------------------------------------

#[test]
fn config_validate_defaults_are_clean() {
    let dir = TempDir::new().unwrap();
    siteid(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn config_validate_reports_errors() {
    let dir = TempDir::new().unwrap();
    let cfg = write_snapshot(&dir, "bad.yaml", "fix:\n  effect_timeout_ms: 0\n");
    siteid(&dir)
        .args(["config", "validate", "--config"])
        .arg(&cfg)
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"));
}
