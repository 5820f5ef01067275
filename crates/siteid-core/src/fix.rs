//! Auto-fix orchestration.
//!
//! Fixing is split in two: [`plan_fixes`] is a pure function that turns a
//! snapshot into the smallest set of OrderID rewrites and duplicate
//! deletions, and [`apply_all_fixes`] pushes that plan through the store's
//! update/delete effects. The effects are plain closures returning futures,
//! so callers can hand in a real store client or an in-memory fake.
//!
//! Every record receives at most one operation per batch. Non-survivors of
//! a duplicate group are deleted and never updated, even when they also
//! carry a mismatch.

use crate::duplicate::detect_duplicate_facilities;
use crate::grammar::current_year;
use crate::issue::{Issue, IssueCategory};
use crate::mismatch::detect_mismatches_in_year;
use crate::record::{OrderPatch, OrderRecord};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Semaphore;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixOptions {
    /// Upper bound on effect calls in flight at once.
    pub max_concurrency: usize,
    /// Per-call limit; an expired call is a failure for that record only.
    pub effect_timeout: Duration,
    /// Year used when regenerating an OrderID that does not parse.
    pub current_year: i32,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            effect_timeout: Duration::from_secs(10),
            current_year: current_year(),
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedUpdate {
    pub record_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_order_id: Option<String>,
    pub patch: OrderPatch,
    pub category: IssueCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedDeletion {
    pub record_id: String,
    pub facility_id: String,
    pub survivor_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixPlan {
    pub updates: Vec<PlannedUpdate>,
    pub deletions: Vec<PlannedDeletion>,
    /// Findings that need a human: missing ids and malformed FacilityIDs.
    pub unresolved: Vec<Issue>,
}

impl FixPlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.deletions.is_empty()
    }

    pub fn operation_count(&self) -> usize {
        self.updates.len() + self.deletions.len()
    }
}

/// Compute the corrective operations for a snapshot without touching the
/// store. Running it on the state a successful batch leaves behind yields
/// an empty plan.
pub fn plan_fixes(orders: &[OrderRecord], current_year: i32) -> FixPlan {
    let groups = detect_duplicate_facilities(orders);
    let mut doomed: HashSet<&str> = HashSet::new();
    let mut deletions = Vec::new();
    for group in &groups {
        for record in group.removals() {
            if doomed.insert(record.id.as_str()) {
                deletions.push(PlannedDeletion {
                    record_id: record.id.clone(),
                    facility_id: group.facility_id.clone(),
                    survivor_id: group.survivor_id.clone(),
                });
            }
        }
    }

    let by_id: HashMap<&str, &OrderRecord> = orders.iter().map(|r| (r.id.as_str(), r)).collect();
    let mut updates = Vec::new();
    let mut unresolved = Vec::new();
    for issue in detect_mismatches_in_year(orders, current_year) {
        let Some(record_id) = issue.record_ids().first().map(|id| id.to_string()) else {
            continue;
        };
        if doomed.contains(record_id.as_str()) {
            continue;
        }
        let Some(correct) = issue.correct_order_id().map(str::to_string) else {
            unresolved.push(issue);
            continue;
        };
        let current = by_id
            .get(record_id.as_str())
            .and_then(|r| r.order_id().map(str::to_string));
        updates.push(PlannedUpdate {
            facility_id: issue.facility_id().map(str::to_string),
            current_order_id: current,
            patch: OrderPatch::order_id(correct),
            category: issue.category(),
            record_id,
        });
    }

    FixPlan {
        updates,
        deletions,
        unresolved,
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixOperation {
    Update,
    Delete,
    /// Not attempted: the finding has no automatic correction.
    Unresolved,
}

impl fmt::Display for FixOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FixOperation::Update => "update",
            FixOperation::Delete => "delete",
            FixOperation::Unresolved => "unresolved",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixError {
    pub record_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<String>,
    pub operation: FixOperation,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixSummary {
    pub updated: usize,
    pub deleted: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixOutcome {
    pub summary: FixSummary,
    pub errors: Vec<FixError>,
}

impl FixOutcome {
    /// Store calls that were attempted and failed, excluding unresolved
    /// findings that were never attempted.
    pub fn failures(&self) -> impl Iterator<Item = &FixError> {
        self.errors
            .iter()
            .filter(|e| e.operation != FixOperation::Unresolved)
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

async fn run_effect<T, E, F>(limit: Duration, effect: F) -> Result<T, String>
where
    F: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    match tokio::time::timeout(limit, effect).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("timed out after {}ms", limit.as_millis())),
    }
}

/// Plan and apply every automatic fix for `orders`.
///
/// `update(id, patch)` and `delete(id)` are the store's effects. Calls for
/// different records run concurrently, bounded by
/// [`FixOptions::max_concurrency`]. A failed or timed-out call is recorded
/// in `errors` and the rest of the batch carries on; findings with no
/// automatic correction are listed in `errors` as unresolved. The summary
/// only counts calls the store confirmed.
pub async fn apply_all_fixes<U, UF, D, DF, E>(
    orders: &[OrderRecord],
    update: U,
    delete: D,
    options: &FixOptions,
) -> FixOutcome
where
    U: Fn(String, OrderPatch) -> UF,
    UF: Future<Output = Result<OrderRecord, E>>,
    D: Fn(String) -> DF,
    DF: Future<Output = Result<(), E>>,
    E: fmt::Display,
{
    let plan = plan_fixes(orders, options.current_year);
    execute_plan(&plan, update, delete, options).await
}

/// Apply an already computed plan. Used directly when a caller showed the
/// plan to a user before confirming it.
pub async fn execute_plan<U, UF, D, DF, E>(
    plan: &FixPlan,
    update: U,
    delete: D,
    options: &FixOptions,
) -> FixOutcome
where
    U: Fn(String, OrderPatch) -> UF,
    UF: Future<Output = Result<OrderRecord, E>>,
    D: Fn(String) -> DF,
    DF: Future<Output = Result<(), E>>,
    E: fmt::Display,
{
    tracing::info!(
        updates = plan.updates.len(),
        deletions = plan.deletions.len(),
        unresolved = plan.unresolved.len(),
        "applying fixes"
    );

    let semaphore = Semaphore::new(options.max_concurrency.max(1));
    let limit = options.effect_timeout;
    let (sem, update, delete) = (&semaphore, &update, &delete);

    let update_calls = plan.updates.iter().map(|planned| async move {
        let _permit = sem.acquire().await;
        let result = run_effect(
            limit,
            update(planned.record_id.clone(), planned.patch.clone()),
        )
        .await
        .and_then(|record| match &planned.patch.order_id {
            Some(wanted) if record.order_id() != Some(wanted.as_str()) => Err(format!(
                "store returned order id '{}' instead of '{wanted}'",
                record.order_id().unwrap_or_default()
            )),
            _ => Ok(()),
        });
        (planned, result)
    });

    let delete_calls = plan.deletions.iter().map(|planned| async move {
        let _permit = sem.acquire().await;
        let result = run_effect(limit, delete(planned.record_id.clone())).await;
        (planned, result)
    });

    let (update_results, delete_results) = futures::future::join(
        futures::future::join_all(update_calls),
        futures::future::join_all(delete_calls),
    )
    .await;

    let mut outcome = FixOutcome::default();

    for (planned, result) in update_results {
        match result {
            Ok(()) => outcome.summary.updated += 1,
            Err(message) => {
                tracing::warn!(record = %planned.record_id, %message, "order id update failed");
                outcome.errors.push(FixError {
                    record_id: planned.record_id.clone(),
                    facility_id: planned.facility_id.clone(),
                    operation: FixOperation::Update,
                    message,
                });
            }
        }
    }

    for (planned, result) in delete_results {
        match result {
            Ok(()) => outcome.summary.deleted += 1,
            Err(message) => {
                tracing::warn!(record = %planned.record_id, %message, "duplicate delete failed");
                outcome.errors.push(FixError {
                    record_id: planned.record_id.clone(),
                    facility_id: Some(planned.facility_id.clone()),
                    operation: FixOperation::Delete,
                    message,
                });
            }
        }
    }

    for issue in &plan.unresolved {
        for record_id in issue.record_ids() {
            outcome.errors.push(FixError {
                record_id: record_id.to_string(),
                facility_id: issue.facility_id().map(str::to_string),
                operation: FixOperation::Unresolved,
                message: issue.description().to_string(),
            });
        }
    }

    tracing::info!(
        updated = outcome.summary.updated,
        deleted = outcome.summary.deleted,
        errors = outcome.errors.len(),
        "fix batch finished"
    );
    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
