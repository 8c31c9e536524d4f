//! A single append-only log file backend: every write or erase appends a
//! record, and an in-memory offset index (rebuilt by replaying the log on
//! open) resolves a key to its most recent record. This is the `auto` /
//! default backend.

use std::collections::HashMap;
use std::convert::TryInto;
use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::warn;

use super::StorageBackend;
use crate::error::{Error, Result};
use crate::util;

struct Slot {
    fpos: u64,
    len: u32,
    deleted: bool,
}

pub struct LogDbBackend {
    path: PathBuf,
    file: fs::File,
    index: HashMap<String, Slot>,
}

/// Parse one record starting at the front of `buf`.
///
/// Returns `(deleted, key, value_offset, value_len, record_len)`, where
/// `value_offset` is relative to `buf`. `Ok(None)` means `buf` is empty
/// (clean end of log); `Err` means a torn trailing write.
fn decode_header(buf: &[u8]) -> Result<Option<(bool, String, usize, usize, usize)>> {
    if buf.is_empty() {
        return Ok(None);
    }
    if buf.len() < 5 {
        return Err(Error::StoreRead("truncated logdb record header".to_string()));
    }
    let deleted = buf[0] != 0;
    let key_len = u32::from_be_bytes(buf[1..5].try_into().unwrap()) as usize;
    let val_len_off = 5 + key_len;
    if buf.len() < val_len_off + 4 {
        return Err(Error::StoreRead("truncated logdb record key".to_string()));
    }
    let key = std::str::from_utf8(&buf[5..val_len_off])?.to_string();
    let val_len = u32::from_be_bytes(buf[val_len_off..val_len_off + 4].try_into().unwrap()) as usize;
    let val_start = val_len_off + 4;
    let total = val_start + val_len;
    if buf.len() < total {
        return Err(Error::StoreRead("truncated logdb record value".to_string()));
    }
    Ok(Some((deleted, key, val_start, val_len, total)))
}

fn encode_record(key: &str, value: &[u8], deleted: bool) -> Vec<u8> {
    let val_len = if deleted { 0 } else { value.len() };
    let mut buf = Vec::with_capacity(5 + key.len() + 4 + val_len);
    buf.push(if deleted { 1 } else { 0 });
    buf.extend_from_slice(&(key.len() as u32).to_be_bytes());
    buf.extend_from_slice(key.as_bytes());
    buf.extend_from_slice(&(val_len as u32).to_be_bytes());
    if !deleted {
        buf.extend_from_slice(value);
    }
    buf
}

const LOG_FILE_NAME: &str = "data.log";

impl LogDbBackend {
    /// `root` is the collection's own directory (spec.md §3: `colls/<name>/…`
    /// is "one subtree per collection's primary store"); the log itself lives
    /// at `root/data.log` so `root` stays a directory `Database::collections`
    /// can list, not a bare file.
    pub fn open(root: &Path) -> Result<LogDbBackend> {
        fs::create_dir_all(root)?;
        let path = root.join(LOG_FILE_NAME);
        let file = util::open_append(&path)?;
        let bytes = fs::read(&path)?;

        let mut index = HashMap::new();
        let mut offset = 0usize;
        loop {
            match decode_header(&bytes[offset..]) {
                Ok(None) => break,
                Ok(Some((deleted, key, val_off, val_len, total))) => {
                    index.insert(
                        key,
                        Slot {
                            fpos: (offset + val_off) as u64,
                            len: val_len as u32,
                            deleted,
                        },
                    );
                    offset += total;
                }
                Err(err) => {
                    warn!(
                        target: "folio::backend::logdb",
                        "{:?}: stopping scan on a torn record at offset {}: {}", path, offset, err
                    );
                    break;
                }
            }
        }

        Ok(LogDbBackend {
            path: path.to_path_buf(),
            file,
            index,
        })
    }
}

impl StorageBackend for LogDbBackend {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let slot = match self.index.get(key) {
            Some(slot) if !slot.deleted => slot,
            _ => return Ok(None),
        };
        let mut f = fs::File::open(&self.path)?;
        let mut buf = vec![0u8; slot.len as usize];
        f.seek(SeekFrom::Start(slot.fpos))?;
        f.read_exact(&mut buf)?;
        Ok(Some(buf))
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        let buf = encode_record(key, bytes, false);
        let fpos = util::append_and_sync(&mut self.file, &buf)?;
        let val_fpos = fpos + (buf.len() - bytes.len()) as u64;
        self.index.insert(
            key.to_string(),
            Slot {
                fpos: val_fpos,
                len: bytes.len() as u32,
                deleted: false,
            },
        );
        Ok(())
    }

    fn erase(&mut self, key: &str) -> Result<()> {
        if !self.index.contains_key(key) {
            return Ok(());
        }
        let buf = encode_record(key, &[], true);
        util::append_and_sync(&mut self.file, &buf)?;
        self.index.insert(
            key.to_string(),
            Slot {
                fpos: 0,
                len: 0,
                deleted: true,
            },
        );
        Ok(())
    }

    fn keys(&self) -> Result<Box<dyn Iterator<Item = String>>> {
        let live: Vec<String> = self
            .index
            .iter()
            .filter(|(_, slot)| !slot.deleted)
            .map(|(key, _)| key.clone())
            .collect();
        Ok(Box::new(live.into_iter()))
    }
}

#[cfg(test)]
#[path = "logdb_test.rs"]
mod logdb_test;
