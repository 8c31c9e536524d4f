//! One file per key under a two-level sharded directory tree, so a
//! collection with many records never dumps them all into a single huge
//! directory. Shard assignment is a cheap FNV-1a hash of the key, in the
//! spirit of `diskv`'s transform function.

use std::fs;
use std::path::{Path, PathBuf};

use super::StorageBackend;
use crate::error::Result;
use crate::util::fnv1a;

pub struct FilesBackend {
    root: PathBuf,
}

impl FilesBackend {
    pub fn open(root: &Path, _shards: usize) -> Result<FilesBackend> {
        fs::create_dir_all(root)?;
        Ok(FilesBackend {
            root: root.to_path_buf(),
        })
    }

    fn shard_dir(&self, key: &str) -> PathBuf {
        let h = fnv1a(key.as_bytes());
        let d1 = format!("{:02x}", (h & 0xff) as u8);
        let d2 = format!("{:02x}", ((h >> 8) & 0xff) as u8);
        self.root.join(d1).join(d2)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.shard_dir(key).join(key)
    }
}

impl StorageBackend for FilesBackend {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        let dir = self.shard_dir(key);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(key), bytes)?;
        Ok(())
    }

    fn erase(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn keys(&self) -> Result<Box<dyn Iterator<Item = String>>> {
        let mut out = Vec::new();
        for d1 in fs::read_dir(&self.root)? {
            let d1 = d1?.path();
            if !d1.is_dir() {
                continue;
            }
            for d2 in fs::read_dir(&d1)? {
                let d2 = d2?.path();
                if !d2.is_dir() {
                    continue;
                }
                for entry in fs::read_dir(&d2)? {
                    let entry = entry?;
                    if let Some(name) = entry.file_name().to_str() {
                        out.push(name.to_string());
                    }
                }
            }
        }
        Ok(Box::new(out.into_iter()))
    }
}

#[cfg(test)]
#[path = "files_test.rs"]
mod files_test;
