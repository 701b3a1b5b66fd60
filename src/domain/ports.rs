use crate::domain::model::{OsmNode, Pos};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Remote source of OpenStreetMap nodes.
#[async_trait]
pub trait OsmDataSource: Send + Sync {
    /// Fetches a single node. Every failure, including transport errors,
    /// is reported as `PosError::OsmNodeNotFound`.
    async fn fetch_node(&self, node_id: u64) -> Result<OsmNode>;
}

/// Persistence for POS records. The store owns ids, timestamps and name uniqueness.
#[async_trait]
pub trait PosStore: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Pos>>;

    /// Fails with `PosError::PosNotFound` when no record has this id.
    async fn get_by_id(&self, id: u64) -> Result<Pos>;

    /// Creates when `pos.id` is `None`, otherwise overwrites the record with that id.
    /// Fails with `PosError::DuplicatePosName` when another record has the same name.
    async fn upsert(&self, pos: Pos) -> Result<Pos>;

    async fn clear(&self) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn osm_api_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn user_agent(&self) -> &str;
    fn store_path(&self) -> &str;
}
