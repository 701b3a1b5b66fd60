// Adapters layer: concrete implementations of the domain ports (OSM HTTP client, POS stores).

pub mod osm;
pub mod storage;
