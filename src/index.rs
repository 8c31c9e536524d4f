//! A single (collection, field) secondary index: an append-only on-disk log
//! of [`IndexEntry`] records plus an in-memory inverted map rebuilt from
//! that log on open.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use log::warn;

use crate::error::Result;
use crate::index_entry::IndexEntry;
use crate::util;

/// In-memory inverted map plus the append-log backing a single field index.
pub struct Index {
    field: String,
    path: PathBuf,
    file: fs::File,
    data: HashMap<String, Vec<IndexEntry>>,
}

impl Index {
    /// Create a new, empty index log at `path`. Fails if a log already
    /// exists there; callers (`Collection::add_index`) are expected to
    /// check existence first and treat it as a no-op.
    pub fn create(path: PathBuf, field: &str) -> Result<Index> {
        let file = util::create_append(&path)?;
        Ok(Index {
            field: field.to_string(),
            path,
            file,
            data: HashMap::new(),
        })
    }

    /// Open an existing index log, scanning it from the start and rebuilding
    /// the in-memory inverted map from the live (non-tombstoned) entries.
    /// A torn trailing record, or any record that fails to decode, ends the
    /// scan early rather than failing the open outright — the log's prefix
    /// up to that point is still honored.
    pub fn open(path: PathBuf, field: &str) -> Result<Index> {
        let file = util::open_append(&path)?;
        let bytes = fs::read(&path)?;

        let mut data: HashMap<String, Vec<IndexEntry>> = HashMap::new();
        let mut offset = 0usize;
        loop {
            match IndexEntry::decode(&bytes[offset..]) {
                Ok(None) => break,
                Ok(Some((mut entry, n))) => {
                    entry.fpos = offset as u64;
                    offset += n;
                    if !entry.deleted {
                        data.entry(entry.value.clone()).or_default().push(entry);
                    }
                }
                Err(err) => {
                    warn!(
                        target: "folio::index",
                        "{:?}: stopping scan on a torn record at offset {}: {}", path, offset, err
                    );
                    break;
                }
            }
        }

        Ok(Index {
            field: field.to_string(),
            path,
            file,
            data,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert `entry` into the in-memory bucket keyed by its value. Does not
    /// touch disk; callers append to the log separately via
    /// [`Index::append_disk`].
    pub fn add(&mut self, entry: IndexEntry) {
        self.data.entry(entry.value.clone()).or_default().push(entry);
    }

    /// Append `entry` to the log, sync, and stamp its `fpos` with the
    /// offset the write started at.
    pub fn append_disk(&mut self, entry: &mut IndexEntry) -> Result<u64> {
        let buf = entry.encode();
        let fpos = util::append_and_sync(&mut self.file, &buf)?;
        entry.fpos = fpos;
        Ok(fpos)
    }

    /// Remove the live entry for `id` (there is at most one per index, per
    /// the engine's invariant), rewrite its on-disk tombstone flag in
    /// place, and drop it from the in-memory map. No-op if `id` has no live
    /// entry in this index.
    pub fn tombstone_id(&mut self, id: i64) -> Result<()> {
        let hit = self.data.iter().find_map(|(key, entries)| {
            entries
                .iter()
                .position(|e| e.id == id)
                .map(|i| (key.clone(), i))
        });

        let (key, i) = match hit {
            Some(hit) => hit,
            None => return Ok(()),
        };

        let entry = {
            let entries = self.data.get_mut(&key).unwrap();
            let entry = entries.remove(i);
            if entries.is_empty() {
                self.data.remove(&key);
            }
            entry
        };

        let buf = entry.tombstone_bytes();
        util::write_at_and_sync(&mut self.file, entry.fpos, &buf)?;
        Ok(())
    }

    /// Live entries for an exact-match bucket, in insertion order.
    pub fn bucket(&self, value: &str) -> &[IndexEntry] {
        self.data.get(value).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bucket_count(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Rewrite the log, dropping tombstoned records, into a temporary
    /// sibling file and rename it atomically over the original. The index
    /// is then reopened from the compacted file, which is the simplest way
    /// to keep `fpos` values honest (design notes recommend this over
    /// translating offsets during the rewrite).
    pub fn compact(self) -> Result<Index> {
        let Index {
            field, path, file, ..
        } = self;
        drop(file);

        let bytes = fs::read(&path)?;
        let tmp_path = sibling_tmp_path(&path, &field);

        let mut live = Vec::with_capacity(bytes.len());
        let mut offset = 0usize;
        loop {
            match IndexEntry::decode(&bytes[offset..]) {
                Ok(None) => break,
                Ok(Some((entry, n))) => {
                    if !entry.deleted {
                        live.extend_from_slice(&bytes[offset..offset + n]);
                    }
                    offset += n;
                }
                Err(err) => {
                    warn!(
                        target: "folio::index",
                        "{:?}: vacuum stopping at a torn record at offset {}: {}", path, offset, err
                    );
                    break;
                }
            }
        }

        fs::write(&tmp_path, &live)?;
        fs::rename(&tmp_path, &path)?;

        Index::open(path, &field)
    }
}

fn sibling_tmp_path(path: &Path, field: &str) -> PathBuf {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    dir.join(format!(".{}.tmp", field))
}

#[cfg(test)]
#[path = "index_test.rs"]
mod index_test;
