use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// OrderRecord
// ---------------------------------------------------------------------------

/// An order as held by the record store. Only the identifier fields and
/// `created_date` mean anything here; every other column is carried
/// through untouched in `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Store-assigned key, unrelated to the domain identifiers.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl OrderRecord {
    pub fn new(
        id: impl Into<String>,
        facility_id: impl Into<String>,
        order_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            facility_id: Some(facility_id.into()),
            order_id: Some(order_id.into()),
            created_date: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_date = Some(at);
        self
    }

    /// FacilityID, with empty strings treated as absent.
    pub fn facility_id(&self) -> Option<&str> {
        self.facility_id.as_deref().filter(|s| !s.is_empty())
    }

    /// OrderID, with empty strings treated as absent.
    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref().filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// OrderPatch
// ---------------------------------------------------------------------------

/// Partial update sent through the store's update effect. The engine only
/// ever rewrites `order_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl OrderPatch {
    pub fn order_id(order_id: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
        }
    }

    pub fn apply(&self, record: &mut OrderRecord) {
        if let Some(order_id) = &self.order_id {
            record.order_id = Some(order_id.clone());
        }
    }
}
