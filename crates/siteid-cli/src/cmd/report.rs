use crate::output::{or_dash, print_json, print_table};
use anyhow::Context;
use siteid_core::config::EngineConfig;
use siteid_core::issue::IssueCategory;
use siteid_core::report::{generate_integrity_report_in_year, IntegrityReport};
use siteid_core::store::SnapshotStore;
use std::path::Path;

pub fn run(config: &EngineConfig, snapshot: &Path, json: bool) -> anyhow::Result<()> {
    let store = SnapshotStore::open(snapshot)
        .with_context(|| format!("failed to load snapshot {}", snapshot.display()))?;
    let report = generate_integrity_report_in_year(&store.list(), config.year());

    if json {
        return print_json(&report);
    }
    print_report(&report);
    Ok(())
}

pub fn print_report(report: &IntegrityReport) {
    println!(
        "Orders: {}  valid: {}  invalid: {}  health: {}%",
        report.total_orders, report.valid, report.invalid, report.health_score
    );

    if report.is_clean() {
        println!("No identifier issues found.");
        return;
    }

    println!();
    let rows: Vec<Vec<String>> = IssueCategory::all()
        .iter()
        .map(|c| {
            vec![
                c.to_string(),
                report.issues.get(*c).to_string(),
                if c.auto_fixable() { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    print_table(&["CATEGORY", "COUNT", "AUTO-FIX"], rows);

    if !report.details.mismatched_orders.is_empty() {
        println!();
        let rows: Vec<Vec<String>> = report
            .details
            .mismatched_orders
            .iter()
            .map(|issue| {
                vec![
                    issue.record_ids().join(","),
                    issue.category().to_string(),
                    or_dash(issue.facility_id()),
                    or_dash(issue.correct_order_id()),
                ]
            })
            .collect();
        print_table(&["RECORD", "CATEGORY", "FACILITY", "CORRECT ORDER ID"], rows);
    }

    if !report.details.duplicate_groups.is_empty() {
        println!();
        let rows: Vec<Vec<String>> = report
            .details
            .duplicate_groups
            .iter()
            .map(|g| {
                let removed: Vec<&str> = g.removals().map(|r| r.id.as_str()).collect();
                vec![
                    g.facility_id.clone(),
                    g.count.to_string(),
                    g.survivor_id.clone(),
                    removed.join(","),
                ]
            })
            .collect();
        print_table(&["FACILITY", "COUNT", "KEEP", "REMOVE"], rows);
    }
}
