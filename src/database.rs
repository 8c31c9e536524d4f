//! Path layout, the `engine` marker, the collection cache, and database-wide
//! vacuum.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::BackendRegistry;
use crate::collection::Collection;
use crate::config::Config;
use crate::error::{Error, Result};

const ENGINE_MARKER: &str = "engine";

/// A database rooted at a filesystem path: `colls/<name>/…` for primary
/// stores, `indexes/<name>/<field>` for index logs, and a single `engine`
/// marker recording the backend chosen on first open.
pub struct Database {
    path: PathBuf,
    backend_name: String,
    registry: BackendRegistry,
    config: Config,
    collections: HashMap<String, Collection>,
}

impl Database {
    /// Open (creating if necessary) the database at `path`, using the
    /// built-in backend registry and default configuration.
    pub fn open(path: impl AsRef<Path>, requested_backend: &str) -> Result<Database> {
        Database::open_with(path, requested_backend, BackendRegistry::default(), Config::default())
    }

    /// Open with an explicit backend registry (for callers who have
    /// registered custom backends) and configuration.
    pub fn open_with(
        path: impl AsRef<Path>,
        requested_backend: &str,
        registry: BackendRegistry,
        config: Config,
    ) -> Result<Database> {
        let path = path.as_ref().to_path_buf();

        fs::create_dir_all(&path).map_err(|err| Error::PathSetup(err.to_string()))?;
        fs::create_dir_all(path.join("colls")).map_err(|err| Error::PathSetup(err.to_string()))?;
        fs::create_dir_all(path.join("indexes")).map_err(|err| Error::PathSetup(err.to_string()))?;

        let marker_path = path.join(ENGINE_MARKER);
        let backend_name = match fs::read_to_string(&marker_path) {
            Ok(contents) => contents.trim().to_string(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let resolved = registry.resolve(requested_backend).to_string();
                if !registry.contains(&resolved) {
                    return Err(Error::UnknownBackend(requested_backend.to_string()));
                }
                fs::write(&marker_path, &resolved).map_err(|err| Error::PathSetup(err.to_string()))?;
                resolved
            }
            Err(err) => return Err(Error::PathSetup(err.to_string())),
        };

        if !registry.contains(&backend_name) {
            return Err(Error::UnknownBackend(backend_name));
        }

        Ok(Database {
            path,
            backend_name,
            registry,
            config,
            collections: HashMap::new(),
        })
    }

    /// Drop the in-memory collection cache. Does not touch disk.
    pub fn close(&mut self) {
        self.collections.clear();
    }

    /// Recursively delete the database directory.
    pub fn remove(self) -> Result<()> {
        fs::remove_dir_all(&self.path)?;
        Ok(())
    }

    /// Return the cached collection `name`, opening it lazily on first
    /// access.
    pub fn coll(&mut self, name: &str) -> Result<&mut Collection> {
        if !self.collections.contains_key(name) {
            let coll = self.open_coll(name)?;
            self.collections.insert(name.to_string(), coll);
        }
        Ok(self.collections.get_mut(name).expect("just inserted"))
    }

    fn open_coll(&self, name: &str) -> Result<Collection> {
        let shards = self.config.shard_count.unwrap_or(0);
        let store = self
            .registry
            .open(&self.backend_name, &self.path.join("colls").join(name), shards)?;
        let indexes_dir = self.path.join("indexes").join(name);
        Collection::open(name, indexes_dir, store)
    }

    /// Subdirectory names under `colls/`, i.e. every collection that has
    /// ever been written to (whether or not it is currently cached).
    pub fn collections(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.path.join("colls"))? {
            let entry = entry?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    /// Vacuum every currently cached (open) collection.
    pub fn vacuum(&mut self) -> Result<()> {
        for coll in self.collections.values_mut() {
            coll.vacuum()?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }
}

#[cfg(test)]
#[path = "database_test.rs"]
mod database_test;
