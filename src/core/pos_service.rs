use crate::core::mapper::map_osm_node;
use crate::domain::model::Pos;
use crate::domain::ports::{OsmDataSource, PosStore};
use crate::utils::error::{PosError, Result};

/// Business operations on POS records, including the OpenStreetMap import.
/// Holds no state of its own between calls.
pub struct PosService<S: PosStore, O: OsmDataSource> {
    store: S,
    osm: O,
}

impl<S: PosStore, O: OsmDataSource> PosService<S, O> {
    pub fn new(store: S, osm: O) -> Self {
        Self { store, osm }
    }

    pub async fn clear(&self) -> Result<()> {
        tracing::warn!("Clearing all POS data");
        self.store.clear().await
    }

    pub async fn get_all(&self) -> Result<Vec<Pos>> {
        tracing::debug!("Retrieving all POS");
        self.store.get_all().await
    }

    pub async fn get_by_id(&self, id: u64) -> Result<Pos> {
        tracing::debug!("Retrieving POS with ID: {}", id);
        self.store.get_by_id(id).await
    }

    /// Creates the POS when it has no id; otherwise it must already exist.
    pub async fn upsert(&self, pos: Pos) -> Result<Pos> {
        match pos.id {
            None => {
                tracing::info!("Creating new POS: {}", pos.name);
            }
            Some(id) => {
                tracing::info!("Updating POS with ID: {}", id);
                self.get_by_id(id).await?;
            }
        }
        self.perform_upsert(pos).await
    }

    /// Fetch, map, then upsert. Nothing is written unless fetch and mapping succeed.
    pub async fn import_from_osm_node(&self, node_id: u64) -> Result<Pos> {
        tracing::info!("Importing POS from OpenStreetMap node {}...", node_id);

        let node = self.osm.fetch_node(node_id).await?;
        let draft = map_osm_node(&node)?;
        let saved = self.upsert(draft).await?;

        tracing::info!(
            "Successfully imported POS '{}' from OSM node {}",
            saved.name,
            node_id
        );
        Ok(saved)
    }

    async fn perform_upsert(&self, pos: Pos) -> Result<Pos> {
        let name = pos.name.clone();
        match self.store.upsert(pos).await {
            Ok(saved) => {
                tracing::info!("Successfully upserted POS with ID: {:?}", saved.id);
                Ok(saved)
            }
            Err(e @ PosError::DuplicatePosName { .. }) => {
                tracing::error!("Error upserting POS '{}': {}", name, e);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}
