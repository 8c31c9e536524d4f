//! A collection: a primary key-value store plus the set of secondary
//! indexes built on it, an identifier allocator, and the query surface.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use log::warn;
use serde::Serialize;

use crate::backend::StorageBackend;
use crate::condition::Condition;
use crate::document;
use crate::error::{Error, Result};
use crate::index::Index;
use crate::index_entry::IndexEntry;
use crate::result::ResultCursor;

const NEXT_ID_KEY: &str = "_next_id";

fn wrap_read(err: Error) -> Error {
    Error::StoreRead(err.to_string())
}

fn wrap_write(err: Error) -> Error {
    Error::StoreWrite(err.to_string())
}

fn wrap_erase(err: Error) -> Error {
    Error::StoreErase(err.to_string())
}

/// Primary store handle plus the `field → Index` map for one named
/// collection. Created lazily by [`crate::database::Database::coll`]; lives
/// until the owning database is dropped.
pub struct Collection {
    name: String,
    indexes_dir: PathBuf,
    store: Box<dyn StorageBackend>,
    indexes: HashMap<String, Index>,
    next_id: i64,
}

impl Collection {
    pub(crate) fn open(
        name: &str,
        indexes_dir: PathBuf,
        store: Box<dyn StorageBackend>,
    ) -> Result<Collection> {
        fs::create_dir_all(&indexes_dir)?;

        let mut indexes = HashMap::new();
        for entry in fs::read_dir(&indexes_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let field = match path.file_name().and_then(|n| n.to_str()) {
                Some(f) if !f.starts_with('.') => f.to_string(),
                _ => continue,
            };
            match Index::open(path.clone(), &field) {
                Ok(idx) => {
                    indexes.insert(field, idx);
                }
                Err(err) => warn!(
                    target: "folio::collection",
                    "{}: skipping index {:?} on open: {}", name, path, err
                ),
            }
        }

        let stored = store.read(NEXT_ID_KEY).map_err(wrap_read)?;
        let next_id = match &stored {
            Some(bytes) => document::decode_varint(bytes)?,
            None => 1,
        };

        let mut coll = Collection {
            name: name.to_string(),
            indexes_dir,
            store,
            indexes,
            next_id,
        };
        if stored.is_none() {
            coll.set_next_id(next_id)?;
        }
        Ok(coll)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn set_next_id(&mut self, next_id: i64) -> Result<()> {
        self.next_id = next_id;
        self.store
            .write(NEXT_ID_KEY, &document::encode_varint(next_id))
            .map_err(wrap_write)
    }

    /// Append an index entry for `id` to every index whose field is present
    /// in the decoded record, both on disk and in the in-memory map.
    fn index_record(&mut self, id: i64, bytes: &[u8]) -> Result<()> {
        let fields = document::field_map(bytes)?;
        for (field, index) in self.indexes.iter_mut() {
            let value = match fields.get(field) {
                Some(v) => document::stringify(v),
                None => continue,
            };
            let mut entry = IndexEntry::new(value, id);
            index
                .append_disk(&mut entry)
                .map_err(|err| Error::IndexWrite(err.to_string()))?;
            index.add(entry);
        }
        Ok(())
    }

    /// Remove the (at most one) live entry for `id` from every index.
    fn tombstone_everywhere(&mut self, id: i64) -> Result<()> {
        for index in self.indexes.values_mut() {
            index
                .tombstone_id(id)
                .map_err(|err| Error::IndexWrite(err.to_string()))?;
        }
        Ok(())
    }

    /// Encode and insert `record`, allocating a fresh identifier. Rolls the
    /// allocator back on a primary-store write failure. On an index-write
    /// failure, tombstones any index entries already written for this `id`
    /// by earlier indexes in the same call before erasing the record, so a
    /// partially-indexed record never leaves an index entry pointing at a
    /// now-missing primary record.
    pub fn insert<T: Serialize>(&mut self, record: &T) -> Result<i64> {
        let bytes = document::encode(record)?;

        let id = self.next_id;
        self.set_next_id(id + 1)?;

        if let Err(err) = self.store.write(&id.to_string(), &bytes) {
            let _ = self.set_next_id(id);
            return Err(Error::StoreWrite(err.to_string()));
        }

        if let Err(err) = self.index_record(id, &bytes) {
            let _ = self.tombstone_everywhere(id);
            let _ = self.store.erase(&id.to_string());
            return Err(err);
        }

        Ok(id)
    }

    /// Overwrite the record at `id`. Fails with [`Error::NotFound`] if `id`
    /// has no live record — see the design notes on this resolved open
    /// question.
    pub fn update<T: Serialize>(&mut self, id: i64, record: &T) -> Result<()> {
        if self.store.read(&id.to_string()).map_err(wrap_read)?.is_none() {
            return Err(Error::NotFound(id));
        }

        let bytes = document::encode(record)?;
        self.store
            .write(&id.to_string(), &bytes)
            .map_err(wrap_write)?;

        self.tombstone_everywhere(id)?;
        self.index_record(id, &bytes)?;
        Ok(())
    }

    /// Tombstone every index entry for `id`, then erase the primary record.
    pub fn delete(&mut self, id: i64) -> Result<()> {
        self.tombstone_everywhere(id)?;
        self.store.erase(&id.to_string()).map_err(wrap_erase)?;
        Ok(())
    }

    /// Build an index on `field` from every record already in the
    /// collection. No-op if the index already exists.
    pub fn add_index(&mut self, field: &str) -> Result<()> {
        if self.indexes.contains_key(field) {
            return Ok(());
        }

        let path = self.indexes_dir.join(field);
        let mut idx = Index::create(path.clone(), field)
            .map_err(|err| Error::IndexOpen(err.to_string()))?;

        let keys: Vec<String> = self.store.keys().map_err(wrap_read)?.collect();
        for key in keys {
            if key == NEXT_ID_KEY {
                continue;
            }
            let id: i64 = match key.parse() {
                Ok(id) => id,
                Err(_) => continue,
            };
            let bytes = match self.store.read(&key).map_err(wrap_read)? {
                Some(bytes) => bytes,
                None => continue,
            };
            let fields = document::field_map(&bytes)?;
            let value = match fields.get(field) {
                Some(v) => document::stringify(v),
                None => continue,
            };

            let mut entry = IndexEntry::new(value, id);
            if let Err(err) = idx.append_disk(&mut entry) {
                drop(idx);
                let _ = fs::remove_file(&path);
                return Err(Error::IndexWrite(err.to_string()));
            }
            idx.add(entry);
        }

        self.indexes.insert(field.to_string(), idx);
        Ok(())
    }

    /// Drop the in-memory index and delete its log file. No-op if `field`
    /// has no index.
    pub fn remove_index(&mut self, field: &str) -> Result<()> {
        if let Some(idx) = self.indexes.remove(field) {
            let path = idx.path().to_path_buf();
            drop(idx);
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// `remove_index` followed by `add_index`; restores the index-vs-store
    /// invariant even if the on-disk log had been corrupted.
    pub fn reindex(&mut self, field: &str) -> Result<()> {
        self.remove_index(field)?;
        self.add_index(field)
    }

    /// Evaluate `condition` against the collection's indexes. Fails with
    /// [`Error::NoIndexOnField`] if any field the condition consults has no
    /// matching index.
    pub fn query(&self, condition: &Condition) -> Result<ResultCursor> {
        for field in condition.fields() {
            if !self.indexes.contains_key(&field) {
                return Err(Error::NoIndexOnField(field));
            }
        }
        let ids: Vec<i64> = condition.evaluate(&self.indexes).into_iter().collect();
        Ok(ResultCursor::new(self.store.as_ref(), ids))
    }

    /// Convenience query for a single identifier, bypassing index coverage
    /// checks entirely (`ById` never touches an index).
    pub fn query_id(&self, id: i64) -> Result<ResultCursor> {
        self.query(&Condition::ById(id))
    }

    /// Every record in the collection, in unspecified order.
    pub fn query_all(&self) -> Result<ResultCursor> {
        let ids = self
            .store
            .keys()
            .map_err(wrap_read)?
            .filter(|key| key != NEXT_ID_KEY)
            .filter_map(|key| key.parse::<i64>().ok())
            .collect();
        Ok(ResultCursor::new(self.store.as_ref(), ids))
    }

    /// Compact every index, dropping tombstoned entries.
    pub fn vacuum(&mut self) -> Result<()> {
        let fields: Vec<String> = self.indexes.keys().cloned().collect();
        for field in fields {
            let idx = self.indexes.remove(&field).expect("field came from indexes.keys()");
            let compacted = idx.compact().map_err(|err| Error::IndexOpen(err.to_string()))?;
            self.indexes.insert(field, compacted);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "collection_test.rs"]
mod collection_test;
