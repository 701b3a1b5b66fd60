use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node fetched from OpenStreetMap. Built fresh per fetch and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct OsmNode {
    pub node_id: u64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub tags: BTreeMap<String, String>,
}

impl OsmNode {
    pub fn new(node_id: u64) -> Self {
        Self {
            node_id,
            latitude: None,
            longitude: None,
            tags: BTreeMap::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PosType {
    Cafe,
    Bakery,
    VendingMachine,
    Cafeteria,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampusType {
    Altstadt,
    Bergheim,
    Inf,
}

/// A point of sale. `id` is `None` until the store has persisted the record;
/// the timestamps are owned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pos {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub r#type: PosType,
    pub campus: CampusType,
    pub street: String,
    pub house_number: String,
    pub postal_code: u32,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
