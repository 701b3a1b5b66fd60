pub mod mapper;
pub mod pos_service;

pub use crate::domain::model::{CampusType, OsmNode, Pos, PosType};
pub use crate::domain::ports::{ConfigProvider, OsmDataSource, PosStore};
pub use crate::utils::error::Result;
