//! A lazy cursor over a query's identifier list: records are fetched from
//! the primary store and decoded one at a time as the caller advances.

use log::warn;
use serde::de::DeserializeOwned;

use crate::backend::StorageBackend;
use crate::document;

/// Borrows the primary store and a snapshot of the identifier list produced
/// by a query. Once `next`/`first` hits a read or decode failure the cursor
/// reports exhausted for the rest of its lifetime.
pub struct ResultCursor<'a> {
    store: &'a dyn StorageBackend,
    ids: Vec<i64>,
    i: usize,
}

impl<'a> ResultCursor<'a> {
    pub(crate) fn new(store: &'a dyn StorageBackend, ids: Vec<i64>) -> ResultCursor<'a> {
        ResultCursor { store, ids, i: 0 }
    }

    /// Number of identifiers this cursor was built with, regardless of how
    /// far it has been advanced.
    pub fn count(&self) -> usize {
        self.ids.len()
    }

    /// Reset to the first identifier, then advance exactly as `next` does.
    pub fn first<T: DeserializeOwned>(&mut self, out_id: Option<&mut i64>) -> Option<T> {
        self.i = 0;
        self.next(out_id)
    }

    /// Read and decode the record at the current position, optionally
    /// copying its identifier into `out_id`, and advance. Returns `None`
    /// once exhausted, or immediately (without advancing further) after a
    /// read or decode failure.
    pub fn next<T: DeserializeOwned>(&mut self, out_id: Option<&mut i64>) -> Option<T> {
        if self.i >= self.ids.len() {
            return None;
        }
        let id = self.ids[self.i];

        let bytes = match self.store.read(&id.to_string()) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                warn!(target: "folio::result", "record {} vanished from the store mid-cursor", id);
                self.i = self.ids.len();
                return None;
            }
            Err(err) => {
                warn!(target: "folio::result", "reading record {} failed: {}", id, err);
                self.i = self.ids.len();
                return None;
            }
        };

        let record = match document::decode::<T>(&bytes) {
            Ok(record) => record,
            Err(err) => {
                warn!(target: "folio::result", "decoding record {} failed: {}", id, err);
                self.i = self.ids.len();
                return None;
            }
        };

        if let Some(out_id) = out_id {
            *out_id = id;
        }
        self.i += 1;
        Some(record)
    }
}

#[cfg(test)]
#[path = "result_test.rs"]
mod result_test;
