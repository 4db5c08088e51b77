use hydrant_shared::models::Hydrant;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

const HYDRANTS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("hydrants");
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("meta");

const NEXT_ID_KEY: &str = "next_id";

pub struct Storage {
    db: Database,
}

impl Storage {
    pub fn open(path: &Path) -> Arc<Self> {
        let db = Database::create(path)
            .unwrap_or_else(|e| panic!("Failed to open database at {}: {}", path.display(), e));

        // Ensure tables exist
        let write_txn = db.begin_write().expect("Failed to begin write txn");
        {
            let _ = write_txn.open_table(HYDRANTS_TABLE);
            let _ = write_txn.open_table(META_TABLE);
        }
        write_txn.commit().expect("Failed to commit initial txn");

        Arc::new(Storage { db })
    }

    /// All records, newest first. Ties on `created_at` break toward the
    /// higher id so insertion order stays stable within one timestamp.
    pub fn list(&self) -> Result<Vec<Hydrant>, String> {
        let read_txn = self.db.begin_read().map_err(|e| e.to_string())?;
        let table = read_txn.open_table(HYDRANTS_TABLE).map_err(|e| e.to_string())?;

        let mut records = Vec::new();
        for entry in table.iter().map_err(|e| e.to_string())? {
            let (_, value) = entry.map_err(|e| e.to_string())?;
            let hydrant: Hydrant =
                serde_json::from_slice(value.value()).map_err(|e| e.to_string())?;
            records.push(hydrant);
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    /// Insert a new record. The id comes from a counter held in the same
    /// write transaction, so ids are monotonically increasing and never
    /// reused even after deletes.
    pub fn insert(
        &self,
        x_coord: f64,
        y_coord: f64,
        image_large_path: &str,
        image_thumb_path: &str,
    ) -> Result<Hydrant, String> {
        let write_txn = self.db.begin_write().map_err(|e| e.to_string())?;
        let hydrant = {
            let mut meta = write_txn.open_table(META_TABLE).map_err(|e| e.to_string())?;
            let id = meta
                .get(NEXT_ID_KEY)
                .map_err(|e| e.to_string())?
                .map(|v| v.value())
                .unwrap_or(1);
            meta.insert(NEXT_ID_KEY, id + 1).map_err(|e| e.to_string())?;

            let hydrant = Hydrant {
                id: id as i64,
                x_coord,
                y_coord,
                image_large_path: image_large_path.to_string(),
                image_thumb_path: image_thumb_path.to_string(),
                created_at: chrono::Utc::now().to_rfc3339(),
            };
            let json = serde_json::to_vec(&hydrant).map_err(|e| e.to_string())?;

            let mut table = write_txn.open_table(HYDRANTS_TABLE).map_err(|e| e.to_string())?;
            table.insert(id, json.as_slice()).map_err(|e| e.to_string())?;
            hydrant
        };
        write_txn.commit().map_err(|e| e.to_string())?;
        Ok(hydrant)
    }

    pub fn get(&self, id: i64) -> Result<Option<Hydrant>, String> {
        let read_txn = self.db.begin_read().map_err(|e| e.to_string())?;
        let table = read_txn.open_table(HYDRANTS_TABLE).map_err(|e| e.to_string())?;

        match table.get(id as u64).map_err(|e| e.to_string())? {
            Some(value) => {
                let hydrant: Hydrant =
                    serde_json::from_slice(value.value()).map_err(|e| e.to_string())?;
                Ok(Some(hydrant))
            }
            None => Ok(None),
        }
    }

    /// Overwrite the coordinates of an existing record in place, leaving
    /// every other field untouched. Returns the updated record, or `None`
    /// (no-op) if the id is absent.
    pub fn update_coords(
        &self,
        id: i64,
        x_coord: f64,
        y_coord: f64,
    ) -> Result<Option<Hydrant>, String> {
        let write_txn = self.db.begin_write().map_err(|e| e.to_string())?;
        let updated = {
            let mut table = write_txn.open_table(HYDRANTS_TABLE).map_err(|e| e.to_string())?;
            // Copy the stored bytes out of the access guard before matching so
            // the guard's borrow of `table` ends before we drop/commit below.
            let existing = table
                .get(id as u64)
                .map_err(|e| e.to_string())?
                .map(|value| value.value().to_vec());
            let existing = match existing {
                Some(bytes) => bytes,
                None => {
                    drop(table);
                    write_txn.commit().map_err(|e| e.to_string())?;
                    return Ok(None);
                }
            };
            let mut hydrant: Hydrant =
                serde_json::from_slice(&existing).map_err(|e| e.to_string())?;
            hydrant.x_coord = x_coord;
            hydrant.y_coord = y_coord;
            let json = serde_json::to_vec(&hydrant).map_err(|e| e.to_string())?;
            table.insert(id as u64, json.as_slice()).map_err(|e| e.to_string())?;
            hydrant
        };
        write_txn.commit().map_err(|e| e.to_string())?;
        Ok(Some(updated))
    }

    /// Remove a record if present. Returns the removed record so the caller
    /// can decide whether to clean up its image files.
    pub fn delete(&self, id: i64) -> Result<Option<Hydrant>, String> {
        let write_txn = self.db.begin_write().map_err(|e| e.to_string())?;
        let removed = {
            let mut table = write_txn.open_table(HYDRANTS_TABLE).map_err(|e| e.to_string())?;
            // Bind the removed guard to a local so its borrow of `table` ends
            // before the block closes and `table` is dropped.
            let removed_guard = table.remove(id as u64).map_err(|e| e.to_string())?;
            match removed_guard {
                Some(value) => {
                    let hydrant: Hydrant =
                        serde_json::from_slice(value.value()).map_err(|e| e.to_string())?;
                    Some(hydrant)
                }
                None => None,
            }
        };
        write_txn.commit().map_err(|e| e.to_string())?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage() -> (tempfile::TempDir, Arc<Storage>) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(&dir.path().join("test.redb"));
        (dir, storage)
    }

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let (_dir, storage) = temp_storage();
        let a = storage.insert(1.0, 2.0, "/uploads/large-a", "/uploads/thumb-a").unwrap();
        let b = storage.insert(3.0, 4.0, "/uploads/large-b", "/uploads/thumb-b").unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn test_ids_are_never_reused_after_delete() {
        let (_dir, storage) = temp_storage();
        let a = storage.insert(1.0, 1.0, "/uploads/large-a", "/uploads/thumb-a").unwrap();
        storage.delete(a.id).unwrap();
        let b = storage.insert(2.0, 2.0, "/uploads/large-b", "/uploads/thumb-b").unwrap();
        assert!(b.id > a.id, "deleted id must not be handed out again");
    }

    #[test]
    fn test_list_newest_first() {
        let (_dir, storage) = temp_storage();
        let a = storage.insert(1.0, 1.0, "/uploads/large-a", "/uploads/thumb-a").unwrap();
        let b = storage.insert(2.0, 2.0, "/uploads/large-b", "/uploads/thumb-b").unwrap();
        let listed = storage.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, b.id);
        assert_eq!(listed[1].id, a.id);
    }

    #[test]
    fn test_get_roundtrip() {
        let (_dir, storage) = temp_storage();
        let inserted = storage
            .insert(100.5, 200.25, "/uploads/large-x.jpg", "/uploads/thumb-x.jpg")
            .unwrap();
        let fetched = storage.get(inserted.id).unwrap().unwrap();
        assert_eq!(fetched, inserted);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let (_dir, storage) = temp_storage();
        assert!(storage.get(999_999).unwrap().is_none());
    }

    #[test]
    fn test_update_coords_preserves_other_fields() {
        let (_dir, storage) = temp_storage();
        let inserted = storage
            .insert(1.0, 2.0, "/uploads/large-x.jpg", "/uploads/thumb-x.jpg")
            .unwrap();
        let updated = storage.update_coords(inserted.id, 50.0, 60.0).unwrap().unwrap();
        assert_eq!(updated.x_coord, 50.0);
        assert_eq!(updated.y_coord, 60.0);
        assert_eq!(updated.id, inserted.id);
        assert_eq!(updated.image_large_path, inserted.image_large_path);
        assert_eq!(updated.image_thumb_path, inserted.image_thumb_path);
        assert_eq!(updated.created_at, inserted.created_at);
    }

    #[test]
    fn test_update_coords_absent_id_is_noop() {
        let (_dir, storage) = temp_storage();
        let before = storage.list().unwrap();
        assert!(storage.update_coords(42, 1.0, 1.0).unwrap().is_none());
        assert_eq!(storage.list().unwrap(), before);
    }

    #[test]
    fn test_delete_returns_removed_record() {
        let (_dir, storage) = temp_storage();
        let inserted = storage
            .insert(1.0, 2.0, "/uploads/large-x.jpg", "/uploads/thumb-x.jpg")
            .unwrap();
        let removed = storage.delete(inserted.id).unwrap().unwrap();
        assert_eq!(removed, inserted);
        assert!(storage.get(inserted.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_absent_returns_none() {
        let (_dir, storage) = temp_storage();
        assert!(storage.delete(7).unwrap().is_none());
        // And again — still none, still no error
        assert!(storage.delete(7).unwrap().is_none());
    }
}
