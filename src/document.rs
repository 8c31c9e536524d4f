//! Record encoding and the decoded field-map view the index and condition
//! layers consume.
//!
//! The engine never inspects a caller's type directly: it only ever sees
//! already-encoded bytes (for the primary store) and a decoded
//! `serde_json::Map` (for indexing and query matching). This keeps
//! `Collection<T>` generic over any `Serialize + DeserializeOwned` type
//! without the index/condition/expression layers needing to know about it.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Canonically encode a record to its on-disk byte representation (JSON).
pub fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(record).map_err(|err| Error::Encode(err.to_string()))
}

/// Reverse of [`encode`].
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|err| Error::Decode(err.to_string()))
}

/// Decode `bytes` into the top-level field map used by indexing and query
/// matching. Non-object top-level values (e.g. a record encoded from a
/// `Vec<String>`) decode to an empty map, since such records carry no named
/// fields an index could ever be built on.
pub fn field_map(bytes: &[u8]) -> Result<Map<String, Value>> {
    match serde_json::from_slice::<Value>(bytes).map_err(|err| Error::Decode(err.to_string()))? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

/// Stringify a decoded field value the same way at insertion time (when an
/// index entry is appended) and at query time (when an `(eq field value)`
/// expression is evaluated), so the two can be compared as plain strings.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Encode `id` as a signed LEB128 varint, matching the wire format used for
/// the reserved `_next_id` key.
pub(crate) fn encode_varint(id: i64) -> Vec<u8> {
    let mut value = (id << 1) ^ (id >> 63);
    let mut buf = Vec::with_capacity(10);
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
    buf
}

/// Reverse of [`encode_varint`].
pub(crate) fn decode_varint(buf: &[u8]) -> Result<i64> {
    let mut result: u64 = 0;
    let mut shift = 0u32;
    for (i, byte) in buf.iter().enumerate() {
        result |= ((byte & 0x7f) as u64) << shift;
        if byte & 0x80 == 0 {
            let value = (result >> 1) as i64 ^ -((result & 1) as i64);
            return Ok(value);
        }
        shift += 7;
        if i == 9 {
            break;
        }
    }
    Err(Error::Decode("truncated varint for _next_id".to_string()))
}

#[cfg(test)]
#[path = "document_test.rs"]
mod document_test;
