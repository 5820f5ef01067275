use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// IdField
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdField {
    FacilityId,
    OrderId,
}

impl IdField {
    pub fn as_str(self) -> &'static str {
        match self {
            IdField::FacilityId => "facility_id",
            IdField::OrderId => "order_id",
        }
    }
}

impl fmt::Display for IdField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// IssueCategory
// ---------------------------------------------------------------------------

/// Report bucket an issue is counted under. Each issue has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueCategory {
    MissingIds,
    InvalidFacilityFormats,
    InvalidOrderFormats,
    SuffixMismatches,
    DuplicateFacilities,
}

impl IssueCategory {
    pub fn all() -> &'static [IssueCategory] {
        &[
            IssueCategory::MissingIds,
            IssueCategory::InvalidFacilityFormats,
            IssueCategory::InvalidOrderFormats,
            IssueCategory::SuffixMismatches,
            IssueCategory::DuplicateFacilities,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IssueCategory::MissingIds => "missing_ids",
            IssueCategory::InvalidFacilityFormats => "invalid_facility_formats",
            IssueCategory::InvalidOrderFormats => "invalid_order_formats",
            IssueCategory::SuffixMismatches => "suffix_mismatches",
            IssueCategory::DuplicateFacilities => "duplicate_facilities",
        }
    }

    /// Whether the fixer can resolve issues in this bucket without a human.
    pub fn auto_fixable(self) -> bool {
        matches!(
            self,
            IssueCategory::InvalidOrderFormats
                | IssueCategory::SuffixMismatches
                | IssueCategory::DuplicateFacilities
        )
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Issue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Issue {
    MissingId {
        record_id: String,
        missing: Vec<IdField>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        facility_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        order_id: Option<String>,
        description: String,
    },
    InvalidFormat {
        record_id: String,
        field: IdField,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        facility_id: Option<String>,
        /// Present only for OrderID violations on a well-formed facility.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        correct_order_id: Option<String>,
        description: String,
    },
    Mismatch {
        record_id: String,
        facility_id: String,
        order_id: String,
        correct_order_id: String,
        description: String,
    },
    Duplicate {
        facility_id: String,
        record_ids: Vec<String>,
        survivor_id: String,
        description: String,
    },
}

impl Issue {
    pub fn missing_id(
        record_id: &str,
        facility_id: Option<&str>,
        order_id: Option<&str>,
    ) -> Self {
        let mut missing = Vec::new();
        if facility_id.is_none() {
            missing.push(IdField::FacilityId);
        }
        if order_id.is_none() {
            missing.push(IdField::OrderId);
        }
        let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
        Issue::MissingId {
            record_id: record_id.to_string(),
            description: format!("record {record_id} is missing {}", names.join(" and ")),
            missing,
            facility_id: facility_id.map(str::to_string),
            order_id: order_id.map(str::to_string),
        }
    }

    pub fn invalid_facility(record_id: &str, value: &str) -> Self {
        Issue::InvalidFormat {
            record_id: record_id.to_string(),
            field: IdField::FacilityId,
            value: value.to_string(),
            facility_id: Some(value.to_string()),
            correct_order_id: None,
            description: format!(
                "facility id '{value}' does not match SITE-<REGION>-<SEQ>; correct it by hand"
            ),
        }
    }

    pub fn invalid_order(
        record_id: &str,
        facility_id: &str,
        value: &str,
        correct: Option<String>,
    ) -> Self {
        let description = match &correct {
            Some(correct) => {
                format!("order id '{value}' does not match ORD-<YEAR>-<SEQ>; expected {correct}")
            }
            None => format!("order id '{value}' does not match ORD-<YEAR>-<SEQ>; correct it by hand"),
        };
        Issue::InvalidFormat {
            record_id: record_id.to_string(),
            field: IdField::OrderId,
            value: value.to_string(),
            facility_id: Some(facility_id.to_string()),
            correct_order_id: correct,
            description,
        }
    }

    pub fn mismatch(record_id: &str, facility_id: &str, order_id: &str, correct: String) -> Self {
        Issue::Mismatch {
            record_id: record_id.to_string(),
            facility_id: facility_id.to_string(),
            order_id: order_id.to_string(),
            description: format!(
                "order id '{order_id}' does not match facility {facility_id}; expected {correct}"
            ),
            correct_order_id: correct,
        }
    }

    pub fn category(&self) -> IssueCategory {
        match self {
            Issue::MissingId { .. } => IssueCategory::MissingIds,
            Issue::InvalidFormat {
                field: IdField::FacilityId,
                ..
            } => IssueCategory::InvalidFacilityFormats,
            Issue::InvalidFormat {
                field: IdField::OrderId,
                ..
            } => IssueCategory::InvalidOrderFormats,
            Issue::Mismatch { .. } => IssueCategory::SuffixMismatches,
            Issue::Duplicate { .. } => IssueCategory::DuplicateFacilities,
        }
    }

    /// Store ids of every record this issue refers to.
    pub fn record_ids(&self) -> Vec<&str> {
        match self {
            Issue::MissingId { record_id, .. }
            | Issue::InvalidFormat { record_id, .. }
            | Issue::Mismatch { record_id, .. } => vec![record_id.as_str()],
            Issue::Duplicate { record_ids, .. } => record_ids.iter().map(String::as_str).collect(),
        }
    }

    pub fn facility_id(&self) -> Option<&str> {
        match self {
            Issue::MissingId { facility_id, .. } | Issue::InvalidFormat { facility_id, .. } => {
                facility_id.as_deref()
            }
            Issue::Mismatch { facility_id, .. } | Issue::Duplicate { facility_id, .. } => {
                Some(facility_id.as_str())
            }
        }
    }

    pub fn correct_order_id(&self) -> Option<&str> {
        match self {
            Issue::InvalidFormat {
                correct_order_id, ..
            } => correct_order_id.as_deref(),
            Issue::Mismatch {
                correct_order_id, ..
            } => Some(correct_order_id.as_str()),
            _ => None,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Issue::MissingId { description, .. }
            | Issue::InvalidFormat { description, .. }
            | Issue::Mismatch { description, .. }
            | Issue::Duplicate { description, .. } => description.as_str(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category(), self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_id_names_fields() {
        let i = Issue::missing_id("r1", Some("SITE-SE-01"), None);
        assert_eq!(i.category(), IssueCategory::MissingIds);
        assert!(i.description().contains("order_id"));
        assert!(!i.description().contains("facility_id and"));
        let both = Issue::missing_id("r2", None, None);
        assert!(both.description().contains("facility_id and order_id"));
    }

    #[test]
    fn format_category_follows_field() {
        let f = Issue::invalid_facility("r1", "SITE-1");
        assert_eq!(f.category(), IssueCategory::InvalidFacilityFormats);
        assert!(f.correct_order_id().is_none());
        assert!(!f.category().auto_fixable());

        let o = Issue::invalid_order("r1", "SITE-SE-01", "01", Some("ORD-2026-01".into()));
        assert_eq!(o.category(), IssueCategory::InvalidOrderFormats);
        assert_eq!(o.correct_order_id(), Some("ORD-2026-01"));
        assert!(o.category().auto_fixable());
    }

    #[test]
    fn mismatch_serializes_with_kind_tag_and_camel_fields() {
        let i = Issue::mismatch("a", "SITE-SE-02", "ORD-2025-99", "ORD-2025-02".into());
        let json = serde_json::to_value(&i).unwrap();
        assert_eq!(json["kind"], "mismatch");
        assert_eq!(json["recordId"], "a");
        assert_eq!(json["correctOrderId"], "ORD-2025-02");
        let back: Issue = serde_json::from_value(json).unwrap();
        assert_eq!(back, i);
    }

    #[test]
    fn categories_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for c in IssueCategory::all() {
            assert!(seen.insert(c.as_str()));
        }
        assert_eq!(seen.len(), 5);
    }
}
