pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::TomlConfig;

pub use adapters::{
    osm::OsmApiClient,
    storage::{InMemoryPosStore, JsonFilePosStore},
};
pub use crate::core::{mapper::map_osm_node, pos_service::PosService};
pub use domain::model::{CampusType, OsmNode, Pos, PosType};
pub use utils::error::{PosError, Result};
