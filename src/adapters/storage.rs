use crate::domain::model::Pos;
use crate::domain::ports::PosStore;
use crate::utils::error::{PosError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Table state shared by both stores. Ids start at 1 and are never reused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PosTable {
    next_id: u64,
    records: BTreeMap<u64, Pos>,
}

impl PosTable {
    fn get_by_id(&self, id: u64) -> Result<Pos> {
        self.records
            .get(&id)
            .cloned()
            .ok_or(PosError::PosNotFound { id })
    }

    fn upsert(&mut self, mut pos: Pos, now: DateTime<Utc>) -> Result<Pos> {
        let name_taken = self
            .records
            .values()
            .any(|existing| existing.name == pos.name && existing.id != pos.id);
        if name_taken {
            return Err(PosError::DuplicatePosName { name: pos.name });
        }

        let id = match pos.id {
            Some(id) => {
                let existing = self.records.get(&id).ok_or(PosError::PosNotFound { id })?;
                pos.created_at = existing.created_at.or(Some(now));
                id
            }
            None => {
                let id = self.next_id.max(1);
                self.next_id = id + 1;
                pos.created_at = Some(now);
                id
            }
        };
        pos.id = Some(id);
        pos.updated_at = Some(now);

        self.records.insert(id, pos.clone());
        Ok(pos)
    }

    fn clear(&mut self) {
        self.records.clear();
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPosStore {
    table: Mutex<PosTable>,
}

impl InMemoryPosStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PosStore for InMemoryPosStore {
    async fn get_all(&self) -> Result<Vec<Pos>> {
        let table = self.table.lock().await;
        Ok(table.records.values().cloned().collect())
    }

    async fn get_by_id(&self, id: u64) -> Result<Pos> {
        self.table.lock().await.get_by_id(id)
    }

    async fn upsert(&self, pos: Pos) -> Result<Pos> {
        self.table.lock().await.upsert(pos, Utc::now())
    }

    async fn clear(&self) -> Result<()> {
        self.table.lock().await.clear();
        Ok(())
    }
}

/// Persists the table as one JSON document. The file is re-read on every
/// operation; a missing file is an empty store.
#[derive(Debug)]
pub struct JsonFilePosStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFilePosStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut file_name = self.path.file_name().unwrap_or_default().to_os_string();
        file_name.push(".tmp");
        self.path.with_file_name(file_name)
    }

    async fn read_table(&self) -> Result<PosTable> {
        match tokio::fs::read(&self.path).await {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PosTable::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_table(&self, table: &PosTable) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let data = serde_json::to_vec_pretty(table)?;
        tracing::debug!(
            "Writing {} POS records ({} bytes) to {}",
            table.records.len(),
            data.len(),
            self.path.display()
        );
        // 先寫暫存檔再 rename
        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, data).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl PosStore for JsonFilePosStore {
    async fn get_all(&self) -> Result<Vec<Pos>> {
        let _guard = self.lock.lock().await;
        let table = self.read_table().await?;
        Ok(table.records.into_values().collect())
    }

    async fn get_by_id(&self, id: u64) -> Result<Pos> {
        let _guard = self.lock.lock().await;
        self.read_table().await?.get_by_id(id)
    }

    async fn upsert(&self, pos: Pos) -> Result<Pos> {
        let _guard = self.lock.lock().await;
        let mut table = self.read_table().await?;
        let saved = table.upsert(pos, Utc::now())?;
        self.write_table(&table).await?;
        Ok(saved)
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut table = self.read_table().await?;
        table.clear();
        self.write_table(&table).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CampusType, PosType};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn draft(name: &str) -> Pos {
        Pos {
            id: None,
            name: name.to_string(),
            description: "Espresso bar".to_string(),
            r#type: PosType::Cafe,
            campus: CampusType::Bergheim,
            street: "Bergheimer Straße".to_string(),
            house_number: "58".to_string(),
            postal_code: 69115,
            city: "Heidelberg".to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamps() {
        let store = InMemoryPosStore::new();

        let first = store.upsert(draft("Café Botanik")).await.unwrap();
        let second = store.upsert(draft("Mensa Marstall")).await.unwrap();

        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
        assert!(first.created_at.is_some());
        assert_eq!(first.created_at, first.updated_at);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_rejected_and_original_kept() {
        let store = InMemoryPosStore::new();
        let original = store.upsert(draft("Café Botanik")).await.unwrap();

        let mut clash = draft("Café Botanik");
        clash.description = "Other".to_string();
        let err = store.upsert(clash).await.unwrap_err();

        assert!(matches!(err, PosError::DuplicatePosName { ref name } if name == "Café Botanik"));
        assert_eq!(store.get_all().await.unwrap(), vec![original]);
    }

    #[tokio::test]
    async fn test_update_keeps_name_and_created_at() {
        let store = InMemoryPosStore::new();
        let created = store.upsert(draft("Café Botanik")).await.unwrap();

        let mut changed = created.clone();
        changed.description = "Now with cake".to_string();
        let updated = store.upsert(changed).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_to_taken_name_fails() {
        let store = InMemoryPosStore::new();
        store.upsert(draft("A")).await.unwrap();
        let mut b = store.upsert(draft("B")).await.unwrap();

        b.name = "A".to_string();
        assert!(matches!(
            store.upsert(b).await,
            Err(PosError::DuplicatePosName { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = InMemoryPosStore::new();
        assert!(matches!(
            store.get_by_id(9).await,
            Err(PosError::PosNotFound { id: 9 })
        ));
    }

    #[tokio::test]
    async fn test_concurrent_creates_with_same_name_fail_exactly_once() {
        let store = Arc::new(InMemoryPosStore::new());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.upsert(draft("Race")).await })
            })
            .collect();

        let mut failures = 0;
        for handle in handles {
            if let Err(PosError::DuplicatePosName { .. }) = handle.await.unwrap() {
                failures += 1;
            }
        }

        assert_eq!(failures, 1);
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_removes_everything_but_ids_are_not_reused() {
        let store = InMemoryPosStore::new();
        store.upsert(draft("A")).await.unwrap();
        store.clear().await.unwrap();

        assert!(store.get_all().await.unwrap().is_empty());
        assert_eq!(store.upsert(draft("A")).await.unwrap().id, Some(2));
    }

    #[tokio::test]
    async fn test_json_store_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("pos.json");

        let store = JsonFilePosStore::new(&path);
        assert!(store.get_all().await.unwrap().is_empty());
        let saved = store.upsert(draft("Café Botanik")).await.unwrap();

        let reopened = JsonFilePosStore::new(&path);
        assert_eq!(reopened.get_by_id(1).await.unwrap(), saved);
        assert!(matches!(
            reopened.upsert(draft("Café Botanik")).await,
            Err(PosError::DuplicatePosName { .. })
        ));

        reopened.clear().await.unwrap();
        assert!(store.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_store_replaces_file_without_leaving_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pos.json");
        let store = JsonFilePosStore::new(&path);

        store.upsert(draft("A")).await.unwrap();
        store.upsert(draft("B")).await.unwrap();

        let entries: Vec<String> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["pos.json".to_string()]);

        let saved: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(saved["records"].as_object().unwrap().len(), 2);
        assert_eq!(saved["nextId"], 3);
    }

    #[tokio::test]
    async fn test_json_store_rejects_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pos.json");
        std::fs::write(&path, b"not json").unwrap();

        let store = JsonFilePosStore::new(&path);
        assert!(matches!(
            store.get_all().await,
            Err(PosError::SerializationError(_))
        ));
    }
}
