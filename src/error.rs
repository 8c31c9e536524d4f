//! Crate-wide error type.
//!
//! Every fallible operation in `folio` returns [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. Error kinds are deliberately kept small
//! and specific so that a host application can match on them instead of
//! parsing message strings.

use std::{fmt, io, str};

/// Errors surfaced by the core engine.
///
/// Variants map directly onto the error kinds of the design: encode/decode
/// failures, backend I/O failures, index I/O failures, and the planner and
/// parser errors raised by the query layer.
#[derive(Debug)]
pub enum Error {
    /// Record serialization failed.
    Encode(String),
    /// Record deserialization failed.
    Decode(String),
    /// Backend `read` failed.
    StoreRead(String),
    /// Backend `write` failed.
    StoreWrite(String),
    /// Backend `erase` failed.
    StoreErase(String),
    /// Opening or scanning an index log failed.
    IndexOpen(String),
    /// Appending or tombstoning an index entry failed.
    IndexWrite(String),
    /// An index log entry was truncated mid-record.
    IndexShortRead(String),
    /// `engine` marker names a backend that was never registered.
    UnknownBackend(String),
    /// A backend was registered twice under the same name.
    Duplicate(String),
    /// A query referenced a field with no matching index.
    NoIndexOnField(String),
    /// The S-expression query text was malformed or semantically invalid.
    ParseError(String),
    /// Directory creation failed while opening a database.
    PathSetup(String),
    /// `Update`/lookup referenced an identifier with no live record.
    NotFound(i64),
    /// Wrapped I/O error not covered by a more specific variant above.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Encode(msg) => write!(f, "encode: {}", msg),
            Error::Decode(msg) => write!(f, "decode: {}", msg),
            Error::StoreRead(msg) => write!(f, "store-read: {}", msg),
            Error::StoreWrite(msg) => write!(f, "store-write: {}", msg),
            Error::StoreErase(msg) => write!(f, "store-erase: {}", msg),
            Error::IndexOpen(msg) => write!(f, "index-open: {}", msg),
            Error::IndexWrite(msg) => write!(f, "index-write: {}", msg),
            Error::IndexShortRead(msg) => write!(f, "index-short-read: {}", msg),
            Error::UnknownBackend(name) => write!(f, "unknown-backend: {}", name),
            Error::Duplicate(name) => write!(f, "duplicate: {}", name),
            Error::NoIndexOnField(field) => write!(f, "no-index-on-field: {}", field),
            Error::ParseError(msg) => write!(f, "parse-error: {}", msg),
            Error::PathSetup(msg) => write!(f, "path-setup: {}", msg),
            Error::NotFound(id) => write!(f, "not-found: id {}", id),
            Error::Io(err) => write!(f, "io-error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Encode(err.to_string())
    }
}

impl From<str::Utf8Error> for Error {
    fn from(err: str::Utf8Error) -> Error {
        Error::IndexShortRead(format!("invalid utf8 in index value: {}", err))
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
