use crate::issue::Issue;
use crate::mismatch::is_canonical;
use crate::record::OrderRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// DuplicateGroup
// ---------------------------------------------------------------------------

/// Every record sharing one FacilityID, with the record that should be
/// kept already chosen. The fixer deletes everything in [`removals`].
///
/// [`removals`]: DuplicateGroup::removals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub facility_id: String,
    pub count: usize,
    pub survivor_id: String,
    pub orders: Vec<OrderRecord>,
}

impl DuplicateGroup {
    pub fn survivor(&self) -> Option<&OrderRecord> {
        self.orders.iter().find(|r| r.id == self.survivor_id)
    }

    pub fn removals(&self) -> impl Iterator<Item = &OrderRecord> {
        self.orders.iter().filter(move |r| r.id != self.survivor_id)
    }

    pub fn to_issue(&self) -> Issue {
        Issue::Duplicate {
            facility_id: self.facility_id.clone(),
            record_ids: self.orders.iter().map(|r| r.id.clone()).collect(),
            survivor_id: self.survivor_id.clone(),
            description: format!(
                "facility {} is claimed by {} records; keeping {}",
                self.facility_id, self.count, self.survivor_id
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Survivor selection
// ---------------------------------------------------------------------------

/// Ordering where the preferred survivor sorts first: canonical OrderID,
/// then earliest `created_date` (undated last), then smallest store id.
fn survivor_order(a: &OrderRecord, b: &OrderRecord) -> Ordering {
    let canonical = is_canonical(b).cmp(&is_canonical(a));
    let dated = a.created_date.is_none().cmp(&b.created_date.is_none());
    canonical
        .then(dated)
        .then(a.created_date.cmp(&b.created_date))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn choose_survivor<'a>(members: &[&'a OrderRecord]) -> Option<&'a OrderRecord> {
    members.iter().copied().min_by(|a, b| survivor_order(a, b))
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Group records by exact FacilityID and report every group with two or
/// more members, in order of first appearance. Records without a
/// FacilityID never group.
pub fn detect_duplicate_facilities(orders: &[OrderRecord]) -> Vec<DuplicateGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<(&str, Vec<&OrderRecord>)> = Vec::new();

    for record in orders {
        let Some(facility_id) = record.facility_id() else {
            continue;
        };
        match index.get(facility_id) {
            Some(&i) => buckets[i].1.push(record),
            None => {
                index.insert(facility_id, buckets.len());
                buckets.push((facility_id, vec![record]));
            }
        }
    }

    buckets
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .filter_map(|(facility_id, members)| {
            let survivor = choose_survivor(&members)?;
            tracing::debug!(
                facility_id,
                count = members.len(),
                survivor = %survivor.id,
                "duplicate facility"
            );
            Some(DuplicateGroup {
                facility_id: facility_id.to_string(),
                count: members.len(),
                survivor_id: survivor.id.clone(),
                orders: members.into_iter().cloned().collect(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
