//! `siteid-core` — identifier integrity and reconciliation for rollout orders.
//!
//! Every order record carries a FacilityID (`SITE-SE-01`) and an OrderID
//! (`ORD-2025-01`) whose sequence is derived from the facility. This crate
//! parses both grammars, detects records that break the relationship,
//! finds facilities claimed by more than one record, summarizes the result
//! as an [`IntegrityReport`], and repairs what can be repaired through
//! injected store effects.
//!
//! ```text
//! grammar ──► mismatch ──┐
//!    │                   ├──► report
//!    └──► duplicate ─────┤
//!                        └──► fix (async, effects injected)
//! ```

pub mod config;
pub mod duplicate;
pub mod error;
pub mod fix;
pub mod grammar;
pub mod io;
pub mod issue;
pub mod mismatch;
pub mod record;
pub mod report;
pub mod store;

pub use duplicate::{detect_duplicate_facilities, DuplicateGroup};
pub use error::{EngineError, Result};
pub use fix::{apply_all_fixes, plan_fixes, FixError, FixOptions, FixOutcome, FixPlan, FixSummary};
pub use grammar::{
    canonical_order_id, check_order_year, derive_order_id, generate_order_id,
    parse_facility_suffix, parse_order_id, FacilitySuffix, ParsedOrderId, ORDER_YEARS,
};
pub use issue::{Issue, IssueCategory};
pub use mismatch::{classify_record, detect_mismatches, detect_mismatches_in_year};
pub use record::{OrderPatch, OrderRecord};
pub use report::{generate_integrity_report, generate_integrity_report_in_year, IntegrityReport};
