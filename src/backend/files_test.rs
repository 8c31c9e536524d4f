use super::*;
use tempfile::tempdir;

#[test]
fn write_then_read_round_trips() {
    let dir = tempdir().unwrap();
    let mut backend = FilesBackend::open(dir.path(), 0).unwrap();
    backend.write("1", b"{\"a\":1}").unwrap();
    assert_eq!(backend.read("1").unwrap(), Some(b"{\"a\":1}".to_vec()));
}

#[test]
fn read_of_missing_key_is_none() {
    let dir = tempdir().unwrap();
    let backend = FilesBackend::open(dir.path(), 0).unwrap();
    assert_eq!(backend.read("missing").unwrap(), None);
}

#[test]
fn erase_removes_the_key() {
    let dir = tempdir().unwrap();
    let mut backend = FilesBackend::open(dir.path(), 0).unwrap();
    backend.write("1", b"x").unwrap();
    backend.erase("1").unwrap();
    assert_eq!(backend.read("1").unwrap(), None);
}

#[test]
fn erase_of_missing_key_is_a_noop() {
    let dir = tempdir().unwrap();
    let mut backend = FilesBackend::open(dir.path(), 0).unwrap();
    assert!(backend.erase("missing").is_ok());
}

#[test]
fn keys_enumerates_every_written_key() {
    let dir = tempdir().unwrap();
    let mut backend = FilesBackend::open(dir.path(), 0).unwrap();
    backend.write("1", b"a").unwrap();
    backend.write("2", b"b").unwrap();
    backend.write("_next_id", b"c").unwrap();

    let mut keys: Vec<String> = backend.keys().unwrap().collect();
    keys.sort();
    assert_eq!(keys, vec!["1".to_string(), "2".to_string(), "_next_id".to_string()]);
}
