//! Binary codec for index append-log records.
//!
//! Wire format, big-endian:
//!
//! ```text
//! uint8   deleted-flag   (0 or 1)
//! uint32  value-length N
//! N bytes value (UTF-8)
//! int64   id
//! ```

use std::convert::TryInto;

use crate::error::{Error, Result};

/// A single append-log record: one mutation against the in-memory inverted
/// index for some field.
///
/// `fpos` is not part of the wire format; it is the byte offset the entry
/// was read from (or written to), retained so [`crate::index::Index`] can
/// rewrite the `deleted` flag in place without rescanning the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub deleted: bool,
    pub value: String,
    pub id: i64,
    pub fpos: u64,
}

impl IndexEntry {
    pub fn new(value: String, id: i64) -> IndexEntry {
        IndexEntry {
            deleted: false,
            value,
            id,
            fpos: 0,
        }
    }

    /// Length of this entry's wire encoding. A tombstoned and a live entry
    /// with the same `value` always encode to the same length, which is
    /// the invariant [`IndexEntry::tombstone_bytes`] relies on.
    pub fn encoded_len(&self) -> usize {
        1 + 4 + self.value.len() + 8
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.push(if self.deleted { 1 } else { 0 });
        buf.extend_from_slice(&(self.value.len() as u32).to_be_bytes());
        buf.extend_from_slice(self.value.as_bytes());
        buf.extend_from_slice(&self.id.to_be_bytes());
        buf
    }

    /// Re-encode `self` with the deleted flag forced high. Used to build the
    /// in-place tombstone write; the returned buffer has the same length as
    /// [`IndexEntry::encode`] would have produced before deletion.
    pub fn tombstone_bytes(&self) -> Vec<u8> {
        let mut entry = self.clone();
        entry.deleted = true;
        entry.encode()
    }

    /// Decode one entry from the start of `buf`.
    ///
    /// Returns `Ok(None)` when `buf` is empty (clean end-of-log). Returns
    /// `Err(Error::IndexShortRead)` when `buf` is non-empty but holds fewer
    /// bytes than the entry declares, i.e. a torn trailing write.
    pub fn decode(buf: &[u8]) -> Result<Option<(IndexEntry, usize)>> {
        if buf.is_empty() {
            return Ok(None);
        }
        if buf.len() < 5 {
            return Err(Error::IndexShortRead(
                "truncated index entry header".to_string(),
            ));
        }

        let deleted = buf[0] != 0;
        let value_len = u32::from_be_bytes(buf[1..5].try_into().unwrap()) as usize;
        let want = 5 + value_len + 8;
        if buf.len() < want {
            return Err(Error::IndexShortRead(format!(
                "wanted {} bytes for index entry, found {}",
                want,
                buf.len()
            )));
        }

        let value = std::str::from_utf8(&buf[5..5 + value_len])?.to_string();
        let id = i64::from_be_bytes(buf[5 + value_len..want].try_into().unwrap());

        Ok(Some((
            IndexEntry {
                deleted,
                value,
                id,
                fpos: 0,
            },
            want,
        )))
    }
}

#[cfg(test)]
#[path = "index_entry_test.rs"]
mod index_entry_test;
