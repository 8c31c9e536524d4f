use super::*;
use tempfile::tempdir;

fn append(idx: &mut Index, value: &str, id: i64) {
    let mut entry = IndexEntry::new(value.to_string(), id);
    idx.append_disk(&mut entry).unwrap();
    idx.add(entry);
}

#[test]
fn create_then_reopen_rebuilds_map() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("author");

    {
        let mut idx = Index::create(path.clone(), "author").unwrap();
        append(&mut idx, "Mark Twain", 1);
        append(&mut idx, "Mark Twain", 2);
        append(&mut idx, "Aesop", 3);
        assert_eq!(idx.bucket_count(), 2);
    }

    let reopened = Index::open(path, "author").unwrap();
    assert_eq!(reopened.bucket_count(), 2);
    assert_eq!(reopened.bucket("Mark Twain").len(), 2);
    assert_eq!(reopened.bucket("Aesop").len(), 1);
}

#[test]
fn tombstone_removes_from_memory_but_not_from_siblings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("y");
    let mut idx = Index::create(path, "y").unwrap();

    append(&mut idx, "19", 1);
    append(&mut idx, "19", 2);
    append(&mut idx, "42", 3);

    idx.tombstone_id(1).unwrap();

    assert_eq!(idx.bucket("19").len(), 1);
    assert_eq!(idx.bucket("19")[0].id, 2);
    assert_eq!(idx.bucket("42").len(), 1);
}

#[test]
fn tombstone_on_disk_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("x");

    let mut idx = Index::create(path.clone(), "x").unwrap();
    append(&mut idx, "a", 1);
    append(&mut idx, "b", 2);
    idx.tombstone_id(1).unwrap();
    drop(idx);

    let reopened = Index::open(path, "x").unwrap();
    assert_eq!(reopened.bucket_count(), 1);
    assert_eq!(reopened.bucket("b").len(), 1);
    assert!(reopened.bucket("a").is_empty());
}

#[test]
fn compact_drops_tombstones_and_preserves_live_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("x");

    let mut idx = Index::create(path, "x").unwrap();
    append(&mut idx, "a", 1);
    append(&mut idx, "b", 2);
    append(&mut idx, "c", 3);
    idx.tombstone_id(2).unwrap();

    let compacted = idx.compact().unwrap();
    assert_eq!(compacted.bucket_count(), 2);
    assert_eq!(compacted.bucket("a").len(), 1);
    assert_eq!(compacted.bucket("c").len(), 1);
    assert!(compacted.bucket("b").is_empty());

    let raw = std::fs::read(compacted.path()).unwrap();
    let mut offset = 0;
    let mut count = 0;
    while let Some((entry, n)) = IndexEntry::decode(&raw[offset..]).unwrap() {
        assert!(!entry.deleted);
        offset += n;
        count += 1;
    }
    assert_eq!(count, 2);
}

#[test]
fn compact_on_empty_index_is_a_noop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty");
    let idx = Index::create(path, "empty").unwrap();
    let compacted = idx.compact().unwrap();
    assert!(compacted.is_empty());
}
