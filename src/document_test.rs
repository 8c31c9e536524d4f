use super::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Serialize, Deserialize, PartialEq, Debug)]
struct Book {
    title: String,
    pages: u32,
}

#[test]
fn encode_decode_roundtrip() {
    let book = Book {
        title: "Fables".to_string(),
        pages: 239,
    };
    let bytes = encode(&book).unwrap();
    let back: Book = decode(&bytes).unwrap();
    assert_eq!(book, back);
}

#[test]
fn field_map_on_object() {
    let bytes = encode(&json!({"Author": "Mark Twain", "Pages": 364})).unwrap();
    let map = field_map(&bytes).unwrap();
    assert_eq!(map.get("Author").unwrap(), "Mark Twain");
    assert_eq!(map.get("Pages").unwrap(), 364);
}

#[test]
fn field_map_on_non_object_is_empty() {
    let bytes = encode(&vec!["hello", "world!"]).unwrap();
    let map = field_map(&bytes).unwrap();
    assert!(map.is_empty());
}

#[test]
fn stringify_matches_query_tokens() {
    assert_eq!(stringify(&json!(270)), "270");
    assert_eq!(stringify(&json!("Mark Twain")), "Mark Twain");
    assert_eq!(stringify(&json!(17.95)), "17.95");
}

#[test]
fn varint_roundtrip() {
    for id in [0_i64, 1, 2, 1000, i64::MAX, -1] {
        let buf = encode_varint(id);
        assert_eq!(decode_varint(&buf).unwrap(), id);
    }
}
