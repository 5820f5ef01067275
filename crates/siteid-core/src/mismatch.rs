use crate::grammar::{
    canonical_order_id, current_year, generate_order_id, parse_facility_suffix, parse_order_id,
};
use crate::issue::Issue;
use crate::record::OrderRecord;

/// Classify one record. At most one issue comes back, checked in priority
/// order: missing ids, malformed FacilityID, malformed OrderID, mismatch.
///
/// `current_year` is only used to build the correction for an OrderID that
/// does not parse; a parseable OrderID keeps its own year so historical
/// orders are not flagged for predating the current calendar year. When
/// `current_year` cannot be written as an OrderID year the malformed
/// OrderID is reported without a correction.
pub fn classify_record(record: &OrderRecord, current_year: i32) -> Option<Issue> {
    let (facility_id, order_id) = match (record.facility_id(), record.order_id()) {
        (Some(f), Some(o)) => (f, o),
        (f, o) => return Some(Issue::missing_id(&record.id, f, o)),
    };

    let Some(suffix) = parse_facility_suffix(facility_id) else {
        return Some(Issue::invalid_facility(&record.id, facility_id));
    };

    let Some(parsed) = parse_order_id(order_id) else {
        let correct = match generate_order_id(&suffix, Some(current_year)) {
            Ok(correct) => Some(correct),
            Err(e) => {
                tracing::warn!(record = %record.id, "no correction for order id: {e}");
                None
            }
        };
        return Some(Issue::invalid_order(&record.id, facility_id, order_id, correct));
    };

    let expected = canonical_order_id(&suffix, &parsed);
    if expected != order_id {
        return Some(Issue::mismatch(&record.id, facility_id, order_id, expected));
    }
    None
}

/// Run [`classify_record`] over every record using the current UTC year.
pub fn detect_mismatches(orders: &[OrderRecord]) -> Vec<Issue> {
    detect_mismatches_in_year(orders, current_year())
}

pub fn detect_mismatches_in_year(orders: &[OrderRecord], current_year: i32) -> Vec<Issue> {
    let issues: Vec<Issue> = orders
        .iter()
        .filter_map(|record| classify_record(record, current_year))
        .collect();
    for issue in &issues {
        tracing::debug!(category = %issue.category(), "{}", issue.description());
    }
    issues
}

/// True when the record's OrderID is already the canonical derivation of
/// its FacilityID.
pub fn is_canonical(record: &OrderRecord) -> bool {
    let (Some(facility_id), Some(order_id)) = (record.facility_id(), record.order_id()) else {
        return false;
    };
    match (parse_facility_suffix(facility_id), parse_order_id(order_id)) {
        (Some(suffix), Some(parsed)) => canonical_order_id(&suffix, &parsed) == order_id,
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
