//! Maps the free-form tags of an OpenStreetMap node onto a POS draft.
//!
//! Both the name lookup and the type classification are ordered tables
//! evaluated top to bottom; the first hit wins.

use crate::domain::model::{CampusType, OsmNode, Pos, PosType};
use crate::utils::error::{PosError, Result};

pub const DEFAULT_DESCRIPTION: &str = "Imported from OpenStreetMap";

/// All imports from OpenStreetMap land on this campus.
pub const IMPORT_CAMPUS: CampusType = CampusType::Altstadt;

pub const DEFAULT_POS_TYPE: PosType = PosType::Cafe;

/// Name tags in order of preference.
pub const NAME_KEYS: [&str; 3] = ["name:de", "name:en", "name"];

pub struct TypeRule {
    pub key: &'static str,
    pub values: &'static [&'static str],
    pub pos_type: PosType,
}

pub const TYPE_RULES: &[TypeRule] = &[
    TypeRule {
        key: "amenity",
        values: &["cafe", "biergarten"],
        pos_type: PosType::Cafe,
    },
    TypeRule {
        key: "amenity",
        values: &["bakery"],
        pos_type: PosType::Bakery,
    },
    TypeRule {
        key: "shop",
        values: &["bakery"],
        pos_type: PosType::Bakery,
    },
    TypeRule {
        key: "amenity",
        values: &["vending_machine"],
        pos_type: PosType::VendingMachine,
    },
    TypeRule {
        key: "amenity",
        values: &["restaurant", "fast_food"],
        pos_type: PosType::Cafeteria,
    },
];

/// Converts a node into an unsaved POS (`id` and timestamps unset).
pub fn map_osm_node(node: &OsmNode) -> Result<Pos> {
    let name = extract_name(node)?;
    let description = node
        .tag("description")
        .unwrap_or(DEFAULT_DESCRIPTION)
        .to_string();
    let pos_type = classify(node);
    let street = required_tag(node, "addr:street")?;
    let house_number = required_tag(node, "addr:housenumber")?;
    let postal_code = postal_code(node)?;
    let city = required_tag(node, "addr:city")?;

    Ok(Pos {
        id: None,
        name,
        description,
        r#type: pos_type,
        campus: IMPORT_CAMPUS,
        street,
        house_number,
        postal_code,
        city,
        created_at: None,
        updated_at: None,
    })
}

fn extract_name(node: &OsmNode) -> Result<String> {
    NAME_KEYS
        .iter()
        .filter_map(|key| node.tag(key))
        .find(|value| !value.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            tracing::error!("Required tag 'name' missing for OSM node {}", node.node_id);
            PosError::OsmNodeMissingFields {
                node_id: node.node_id,
            }
        })
}

/// Total: every tag combination yields a type, unmatched ones fall back to `DEFAULT_POS_TYPE`.
pub fn classify(node: &OsmNode) -> PosType {
    let matched = TYPE_RULES.iter().find(|rule| {
        node.tag(rule.key)
            .is_some_and(|value| rule.values.contains(&value))
    });

    match matched {
        Some(rule) => rule.pos_type,
        None => {
            tracing::warn!(
                "Unknown amenity '{}' / shop '{}' for OSM node {}, defaulting to {:?}",
                node.tag("amenity").unwrap_or("-"),
                node.tag("shop").unwrap_or("-"),
                node.node_id,
                DEFAULT_POS_TYPE
            );
            DEFAULT_POS_TYPE
        }
    }
}

fn required_tag(node: &OsmNode, key: &str) -> Result<String> {
    match node.tag(key) {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => {
            tracing::error!("Required tag '{}' missing for OSM node {}", key, node.node_id);
            Err(PosError::OsmNodeMissingFields {
                node_id: node.node_id,
            })
        }
    }
}

/// Postal codes are 32-bit signed integers in the source data; negatives are rejected.
fn postal_code(node: &OsmNode) -> Result<u32> {
    let raw = required_tag(node, "addr:postcode")?;
    let parsed = raw
        .parse::<i32>()
        .map_err(|e| e.to_string())
        .and_then(|value| u32::try_from(value).map_err(|_| "negative value".to_string()));

    parsed.map_err(|reason| {
        tracing::error!(
            "Invalid postal code '{}' for OSM node {}: {}",
            raw,
            node.node_id,
            reason
        );
        PosError::OsmNodeMissingFields {
            node_id: node.node_id,
        }
    })
}
