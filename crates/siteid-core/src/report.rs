use crate::duplicate::{detect_duplicate_facilities, DuplicateGroup};
use crate::grammar::current_year;
use crate::issue::{Issue, IssueCategory};
use crate::mismatch::detect_mismatches_in_year;
use crate::record::OrderRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ---------------------------------------------------------------------------
// IssueCounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCounts {
    pub suffix_mismatches: usize,
    /// Number of duplicate groups, not of records inside them.
    pub duplicate_facilities: usize,
    pub invalid_facility_formats: usize,
    pub invalid_order_formats: usize,
    pub missing_ids: usize,
}

impl IssueCounts {
    pub fn get(&self, category: IssueCategory) -> usize {
        match category {
            IssueCategory::SuffixMismatches => self.suffix_mismatches,
            IssueCategory::DuplicateFacilities => self.duplicate_facilities,
            IssueCategory::InvalidFacilityFormats => self.invalid_facility_formats,
            IssueCategory::InvalidOrderFormats => self.invalid_order_formats,
            IssueCategory::MissingIds => self.missing_ids,
        }
    }

    fn bump(&mut self, category: IssueCategory) {
        let slot = match category {
            IssueCategory::SuffixMismatches => &mut self.suffix_mismatches,
            IssueCategory::DuplicateFacilities => &mut self.duplicate_facilities,
            IssueCategory::InvalidFacilityFormats => &mut self.invalid_facility_formats,
            IssueCategory::InvalidOrderFormats => &mut self.invalid_order_formats,
            IssueCategory::MissingIds => &mut self.missing_ids,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        IssueCategory::all().iter().map(|c| self.get(*c)).sum()
    }
}

// ---------------------------------------------------------------------------
// IntegrityReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetails {
    /// Every per-record finding (missing, malformed, mismatched).
    pub mismatched_orders: Vec<Issue>,
    pub duplicate_groups: Vec<DuplicateGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub total_orders: usize,
    pub valid: usize,
    pub invalid: usize,
    /// Percentage of records with no finding, 0-100.
    pub health_score: u32,
    pub issues: IssueCounts,
    pub details: ReportDetails,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.total() == 0
    }

    /// True when nothing the fixer could act on remains.
    pub fn nothing_to_fix(&self) -> bool {
        IssueCategory::all()
            .iter()
            .filter(|c| c.auto_fixable())
            .all(|c| self.issues.get(*c) == 0)
    }
}

pub fn health_score(valid: usize, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    ((valid as f64 / total as f64) * 100.0).round() as u32
}

pub fn generate_integrity_report(orders: &[OrderRecord]) -> IntegrityReport {
    generate_integrity_report_in_year(orders, current_year())
}

/// Build the report against a fixed "current year" (used only for the
/// corrections offered on malformed OrderIDs).
pub fn generate_integrity_report_in_year(
    orders: &[OrderRecord],
    current_year: i32,
) -> IntegrityReport {
    let record_issues = detect_mismatches_in_year(orders, current_year);
    let groups = detect_duplicate_facilities(orders);

    let mut counts = IssueCounts::default();
    let mut flagged: HashSet<&str> = HashSet::new();

    for issue in &record_issues {
        counts.bump(issue.category());
        flagged.extend(issue.record_ids());
    }
    for group in &groups {
        counts.bump(IssueCategory::DuplicateFacilities);
        flagged.extend(group.orders.iter().map(|r| r.id.as_str()));
    }

    // A store id can repeat across a bad snapshot; count records, not ids.
    let invalid = orders
        .iter()
        .filter(|r| flagged.contains(r.id.as_str()))
        .count();
    let total = orders.len();
    let valid = total - invalid;

    IntegrityReport {
        total_orders: total,
        valid,
        invalid,
        health_score: health_score(valid, total),
        issues: counts,
        details: ReportDetails {
            mismatched_orders: record_issues,
            duplicate_groups: groups,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
