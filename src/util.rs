//! Small filesystem helpers shared by the backends and the index log.

use std::{
    fs,
    io::{self, Seek, Write},
    path::Path,
};

use crate::error::Result;

/// Open `path` for random-access reads and writes, creating the file (and
/// its parent directory) if it does not already exist.
///
/// Deliberately not opened with `O_APPEND` (`.append(true)`): under POSIX
/// every write on an append-mode fd lands at EOF regardless of a preceding
/// `seek`, which would break in-place tombstone rewrites
/// ([`write_at_and_sync`]). Callers that want to append explicitly seek to
/// `SeekFrom::End(0)` first (see [`append_and_sync`]).
pub(crate) fn open_append(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path)?)
}

/// Open `path` exclusively for random-access reads and writes; fails if it
/// already exists. See [`open_append`] for why `O_APPEND` is avoided.
pub(crate) fn create_append(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(path)?)
}

/// Write `buf` at the current end of file and fsync, returning the offset
/// the write started at.
pub(crate) fn append_and_sync(fd: &mut fs::File, buf: &[u8]) -> Result<u64> {
    let fpos = fd.seek(io::SeekFrom::End(0))?;
    fd.write_all(buf)?;
    fd.sync_all()?;
    Ok(fpos)
}

/// Overwrite `buf` at `fpos` in place and fsync. Used to flip the deleted
/// flag on an index entry without changing the entry's on-disk length.
pub(crate) fn write_at_and_sync(fd: &mut fs::File, fpos: u64, buf: &[u8]) -> Result<()> {
    fd.seek(io::SeekFrom::Start(fpos))?;
    fd.write_all(buf)?;
    fd.sync_all()?;
    Ok(())
}

/// FNV-1a, used by the `files` and `shardlog` backends to assign a key to a
/// shard/shard-subdirectory. Not cryptographic; just needs to spread keys
/// evenly across a small fixed bucket count.
pub(crate) fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
