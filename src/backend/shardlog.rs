//! The `logdb` design split across N fixed hash buckets, each an
//! independent append log under its own file. Keys in different buckets
//! never contend for the same file handle.

use std::fs;
use std::path::Path;

use super::logdb::LogDbBackend;
use super::StorageBackend;
use crate::error::Result;
use crate::util::fnv1a;

const DEFAULT_SHARDS: usize = 8;

pub struct ShardLogBackend {
    shards: Vec<LogDbBackend>,
}

impl ShardLogBackend {
    pub fn open(root: &Path, shard_count: usize) -> Result<ShardLogBackend> {
        let shard_count = if shard_count == 0 { DEFAULT_SHARDS } else { shard_count };
        fs::create_dir_all(root)?;
        let mut shards = Vec::with_capacity(shard_count);
        for i in 0..shard_count {
            shards.push(LogDbBackend::open(&root.join(i.to_string()))?);
        }
        Ok(ShardLogBackend { shards })
    }

    fn shard_for(&self, key: &str) -> usize {
        (fnv1a(key.as_bytes()) as usize) % self.shards.len()
    }
}

impl StorageBackend for ShardLogBackend {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.shards[self.shard_for(key)].read(key)
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        let i = self.shard_for(key);
        self.shards[i].write(key, bytes)
    }

    fn erase(&mut self, key: &str) -> Result<()> {
        let i = self.shard_for(key);
        self.shards[i].erase(key)
    }

    fn keys(&self) -> Result<Box<dyn Iterator<Item = String>>> {
        let mut out = Vec::new();
        for shard in &self.shards {
            out.extend(shard.keys()?);
        }
        Ok(Box::new(out.into_iter()))
    }
}

#[cfg(test)]
#[path = "shardlog_test.rs"]
mod shardlog_test;
