use crate::cmd::report::print_report;
use crate::output::{or_dash, print_json, print_table};
use anyhow::Context;
use siteid_core::config::{EngineConfig, WarnLevel};
use siteid_core::fix::{apply_all_fixes, plan_fixes, FixOutcome, FixPlan};
use siteid_core::report::generate_integrity_report_in_year;
use siteid_core::store::SnapshotStore;
use std::path::Path;

pub fn run(config: &EngineConfig, snapshot: &Path, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let store = SnapshotStore::open(snapshot)
        .with_context(|| format!("failed to load snapshot {}", snapshot.display()))?;
    for w in config.validate() {
        match w.level {
            WarnLevel::Warning => tracing::warn!("{}", w.message),
            WarnLevel::Error => anyhow::bail!("invalid config: {}", w.message),
        }
    }
    let options = config.fix_options()?;
    let orders = store.list();

    if dry_run {
        let plan = plan_fixes(&orders, options.current_year);
        if json {
            return print_json(&plan);
        }
        print_plan(&plan);
        return Ok(());
    }

    let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
    let store = &store;
    let outcome = rt.block_on(apply_all_fixes(
        &orders,
        move |id, patch| store.update(id, patch),
        move |id| store.delete(id),
        &options,
    ));

    store.save().context("failed to save snapshot")?;
    let report = generate_integrity_report_in_year(&store.list(), options.current_year);

    if json {
        return print_json(&serde_json::json!({
            "summary": outcome.summary,
            "errors": outcome.errors,
            "report": report,
        }));
    }

    print_outcome(&outcome);
    println!();
    print_report(&report);
    Ok(())
}

fn print_plan(plan: &FixPlan) {
    if plan.is_empty() {
        println!("Nothing to fix automatically.");
    } else {
        println!(
            "Planned: {} update(s), {} deletion(s)",
            plan.updates.len(),
            plan.deletions.len()
        );
        println!();
        let mut rows: Vec<Vec<String>> = plan
            .updates
            .iter()
            .map(|u| {
                vec![
                    "update".to_string(),
                    u.record_id.clone(),
                    or_dash(u.facility_id.as_deref()),
                    format!(
                        "{} -> {}",
                        or_dash(u.current_order_id.as_deref()),
                        or_dash(u.patch.order_id.as_deref())
                    ),
                ]
            })
            .collect();
        rows.extend(plan.deletions.iter().map(|d| {
            vec![
                "delete".to_string(),
                d.record_id.clone(),
                d.facility_id.clone(),
                format!("duplicate of {}", d.survivor_id),
            ]
        }));
        print_table(&["OP", "RECORD", "FACILITY", "CHANGE"], rows);
    }

    if !plan.unresolved.is_empty() {
        println!();
        println!("Needs manual correction:");
        for issue in &plan.unresolved {
            println!("  {issue}");
        }
    }
}

fn print_outcome(outcome: &FixOutcome) {
    println!(
        "Updated: {}  deleted: {}  errors: {}",
        outcome.summary.updated,
        outcome.summary.deleted,
        outcome.errors.len()
    );
    if outcome.errors.is_empty() {
        return;
    }
    println!();
    let rows: Vec<Vec<String>> = outcome
        .errors
        .iter()
        .map(|e| {
            vec![
                e.record_id.clone(),
                e.operation.to_string(),
                or_dash(e.facility_id.as_deref()),
                e.message.clone(),
            ]
        })
        .collect();
    print_table(&["RECORD", "OPERATION", "FACILITY", "MESSAGE"], rows);
}
