use crate::error::{EngineError, Result};
use chrono::Datelike;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static FACILITY_RE: OnceLock<Regex> = OnceLock::new();
static ORDER_RE: OnceLock<Regex> = OnceLock::new();

fn facility_re() -> &'static Regex {
    FACILITY_RE.get_or_init(|| Regex::new(r"^SITE-([A-Z]{2})(-?)([0-9]+)$").unwrap())
}

fn order_re() -> &'static Regex {
    ORDER_RE.get_or_init(|| Regex::new(r"^ORD-([0-9]{4})-([0-9]+)$").unwrap())
}

// ---------------------------------------------------------------------------
// FacilitySuffix
// ---------------------------------------------------------------------------

/// The parsed tail of a FacilityID: region code plus sequence digits.
///
/// `seq` keeps the digits exactly as written, so `SITE-SE-007` derives
/// `ORD-<year>-007` and not `ORD-<year>-7`, and arbitrarily long sequences
/// survive unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacilitySuffix {
    pub region: String,
    pub seq: String,
    /// Whether a `-` separated region and sequence (`SITE-SE-01` vs `SITE-SE01`).
    #[serde(default = "default_separated")]
    pub separated: bool,
}

fn default_separated() -> bool {
    true
}

impl FacilitySuffix {
    /// Sequence digits as written, e.g. `07`.
    pub fn seq_text(&self) -> &str {
        &self.seq
    }

    pub fn to_facility_id(&self) -> String {
        let sep = if self.separated { "-" } else { "" };
        format!("SITE-{}{}{}", self.region, sep, self.seq)
    }
}

impl fmt::Display for FacilitySuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_facility_id())
    }
}

/// Parse a FacilityID. Returns `None` for anything off-grammar, including
/// empty input.
pub fn parse_facility_suffix(facility_id: &str) -> Option<FacilitySuffix> {
    let caps = facility_re().captures(facility_id)?;
    Some(FacilitySuffix {
        region: caps.get(1)?.as_str().to_string(),
        seq: caps.get(3)?.as_str().to_string(),
        separated: !caps.get(2)?.as_str().is_empty(),
    })
}

// ---------------------------------------------------------------------------
// OrderID
// ---------------------------------------------------------------------------

/// Years a newly generated OrderID may carry. The grammar only has room
/// for four digits, so anything outside this range could not be parsed
/// back and would be rewritten on every fix run.
pub const ORDER_YEARS: RangeInclusive<i32> = 1000..=9999;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedOrderId {
    pub year: i32,
    /// Sequence digits as written.
    pub seq: String,
}

pub fn parse_order_id(order_id: &str) -> Option<ParsedOrderId> {
    let caps = order_re().captures(order_id)?;
    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    Some(ParsedOrderId {
        year,
        seq: caps.get(2)?.as_str().to_string(),
    })
}

pub fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Reject years that cannot be written as the four-digit `<YEAR>` field.
pub fn check_order_year(year: i32) -> Result<i32> {
    if ORDER_YEARS.contains(&year) {
        Ok(year)
    } else {
        Err(EngineError::InvalidYear(year))
    }
}

fn format_order_id(suffix: &FacilitySuffix, year: i32) -> String {
    format!("ORD-{:04}-{}", year, suffix.seq)
}

/// Format the canonical OrderID for a facility. Falls back to the current
/// UTC year when `year` is `None`; for a fixed year the output is fully
/// determined by its inputs.
pub fn generate_order_id(suffix: &FacilitySuffix, year: Option<i32>) -> Result<String> {
    let year = check_order_year(year.unwrap_or_else(current_year))?;
    Ok(format_order_id(suffix, year))
}

/// The OrderID `order` should have been, keeping its own year.
pub fn canonical_order_id(suffix: &FacilitySuffix, order: &ParsedOrderId) -> String {
    format_order_id(suffix, order.year)
}

/// Derive a fresh OrderID the moment a FacilityID is entered. Malformed
/// FacilityIDs are rejected so the record is never created with them.
pub fn derive_order_id(facility_id: &str, year: Option<i32>) -> Result<String> {
    let suffix = parse_facility_suffix(facility_id)
        .ok_or_else(|| EngineError::InvalidFacilityId(facility_id.to_string()))?;
    generate_order_id(&suffix, year)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
