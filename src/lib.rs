//! `folio` is an embeddable, file-backed document store.
//!
//! A host application opens a [`Database`] rooted at a filesystem path,
//! obtains named [`Collection`]s from it, and performs create/read/update/
//! delete operations on arbitrary `serde`-serializable records. Records are
//! addressed by a monotonically issued 64-bit identifier. Fields can be
//! indexed to accelerate equality lookups, and queries are expressed either
//! as a [`Condition`] tree built programmatically or parsed from a small
//! S-expression language (see [`expression::parse`]).
//!
//! The store is single-threaded and single-writer: no file locks are taken
//! and no internal synchronization is provided. Concurrent access to the
//! same database path from multiple threads or processes is undefined
//! behavior.

pub mod backend;
pub mod collection;
pub mod condition;
pub mod config;
pub mod database;
pub mod document;
pub mod error;
pub mod expression;
pub mod index;
pub mod index_entry;
pub mod result;
mod util;

pub use crate::backend::{BackendRegistry, StorageBackend};
pub use crate::collection::Collection;
pub use crate::condition::Condition;
pub use crate::config::Config;
pub use crate::database::Database;
pub use crate::error::{Error, Result};
pub use crate::index::Index;
pub use crate::index_entry::IndexEntry;
pub use crate::result::ResultCursor;
