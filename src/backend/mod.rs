//! The pluggable storage-backend interface: an opaque key-value store that
//! the rest of the engine never inspects beyond `read`/`write`/`erase`/`keys`.

mod files;
mod logdb;
mod shardlog;

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};

pub use files::FilesBackend;
pub use logdb::LogDbBackend;
pub use shardlog::ShardLogBackend;

/// An opaque byte-value key-value store. Concrete backends are selected by
/// textual name at database creation and frozen into the `engine` marker.
pub trait StorageBackend {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<()>;
    fn erase(&mut self, key: &str) -> Result<()>;
    /// A finite, unordered sequence of every key currently present. Backends
    /// are free to compute this eagerly; the engine always drains it to
    /// completion on each call.
    fn keys(&self) -> Result<Box<dyn Iterator<Item = String>>>;
}

pub type Constructor = fn(&Path, usize) -> Result<Box<dyn StorageBackend>>;

/// A name → constructor mapping for storage backends, passed explicitly into
/// [`crate::database::Database::open`] instead of relying on process-global
/// state. [`BackendRegistry::default`] is a convenience registry
/// pre-populated with the three built-in engines.
pub struct BackendRegistry {
    ctors: HashMap<String, Constructor>,
    aliases: HashMap<String, String>,
}

impl BackendRegistry {
    pub fn new() -> BackendRegistry {
        BackendRegistry {
            ctors: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Register a backend constructor under `name`. Fails with
    /// [`Error::Duplicate`] if `name` is already taken (by a built-in, an
    /// earlier registration, or an alias).
    pub fn register(&mut self, name: &str, ctor: Constructor) -> Result<()> {
        if self.ctors.contains_key(name) || self.aliases.contains_key(name) {
            return Err(Error::Duplicate(name.to_string()));
        }
        self.ctors.insert(name.to_string(), ctor);
        Ok(())
    }

    /// Register `alias` as another spelling for an already-registered
    /// backend `target`.
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<()> {
        if self.ctors.contains_key(alias) || self.aliases.contains_key(alias) {
            return Err(Error::Duplicate(alias.to_string()));
        }
        self.aliases.insert(alias.to_string(), target.to_string());
        Ok(())
    }

    /// Instantiate the backend registered under `name` (resolving aliases),
    /// rooted at `path`. `shards` is only consulted by backends that shard
    /// their on-disk layout; others ignore it.
    pub fn open(&self, name: &str, path: &Path, shards: usize) -> Result<Box<dyn StorageBackend>> {
        let resolved = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        let ctor = self
            .ctors
            .get(resolved)
            .ok_or_else(|| Error::UnknownBackend(name.to_string()))?;
        ctor(path, shards)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ctors.contains_key(name) || self.aliases.contains_key(name)
    }

    /// Resolve `name` to its canonical (non-alias) backend name. Names that
    /// aren't registered at all are returned unchanged; callers still need
    /// `contains`/`open` to detect that case.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }
}

impl Default for BackendRegistry {
    /// The three built-in backends, plus `"auto"` aliasing `"logdb"`.
    fn default() -> BackendRegistry {
        let mut registry = BackendRegistry::new();
        registry
            .register("files", |path, shards| {
                Ok(Box::new(FilesBackend::open(path, shards)?))
            })
            .expect("built-in backend name collision");
        registry
            .register("logdb", |path, _shards| {
                Ok(Box::new(LogDbBackend::open(path)?))
            })
            .expect("built-in backend name collision");
        registry
            .register("shardlog", |path, shards| {
                Ok(Box::new(ShardLogBackend::open(path, shards)?))
            })
            .expect("built-in backend name collision");
        registry
            .alias("auto", "logdb")
            .expect("built-in alias collision");
        registry
    }
}
