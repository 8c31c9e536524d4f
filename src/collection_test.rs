use super::*;
use crate::backend::LogDbBackend;
use serde::Deserialize;
use tempfile::tempdir;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Person {
    x: String,
    y: i64,
    z: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct Book {
    title: String,
    author: String,
    price: f64,
    pages: i64,
}

fn open_collection(dir: &std::path::Path, name: &str) -> Collection {
    let store = Box::new(LogDbBackend::open(&dir.join(format!("{}.log", name))).unwrap());
    Collection::open(name, dir.join("indexes").join(name), store).unwrap()
}

#[test]
fn insert_allocates_monotonic_ids() {
    let dir = tempdir().unwrap();
    let mut coll = open_collection(dir.path(), "t");
    let a = coll.insert(&vec!["hello", "world!"]).unwrap();
    let b = coll.insert(&Person { x: "x".into(), y: 1, z: 1.0 }).unwrap();
    assert_eq!(a, 1);
    assert_eq!(b, 2);
    assert_eq!(coll.next_id, 3);
}

#[test]
fn update_on_missing_id_fails_not_found() {
    let dir = tempdir().unwrap();
    let mut coll = open_collection(dir.path(), "t");
    let err = coll.update(999, &Person { x: "x".into(), y: 1, z: 1.0 }).unwrap_err();
    assert!(matches!(err, Error::NotFound(999)));
}

#[test]
fn insert_update_delete_maintains_index_bucket_counts() {
    let dir = tempdir().unwrap();
    let mut coll = open_collection(dir.path(), "persons");
    coll.add_index("x").unwrap();

    let mut people = vec![
        Person { x: "John Doe".into(), y: 23, z: 1.85 },
        Person { x: "Jan Maier".into(), y: 17, z: 1.75 },
        Person { x: "Franz Haber".into(), y: 19, z: 1.90 },
    ];
    let mut ids = Vec::new();
    for p in &people {
        ids.push(coll.insert(p).unwrap());
    }
    assert_eq!(coll.indexes["x"].bucket_count(), 3);

    coll.add_index("y").unwrap();
    assert_eq!(coll.indexes["y"].bucket_count(), 3);

    people[0] = Person { x: "Max Mustermann".into(), y: 42, z: 1.83 };
    people[1] = Person { x: "Franz Huber".into(), y: 19, z: 1.97 };
    people[2] = Person { x: "Franz Haber-Oettinger".into(), y: 19, z: 1.90 };
    for (id, p) in ids.iter().zip(people.iter()) {
        coll.update(*id, p).unwrap();
    }

    assert_eq!(coll.indexes["x"].bucket_count(), 3);
    assert_eq!(coll.indexes["y"].bucket_count(), 2);
    assert_eq!(coll.indexes["y"].bucket("19").len(), 2);

    for id in &ids {
        coll.delete(*id).unwrap();
    }
    assert!(coll.indexes["x"].is_empty());
    assert!(coll.indexes["y"].is_empty());

    coll.vacuum().unwrap();
}

#[test]
fn query_by_indexed_field_matches_author() {
    let dir = tempdir().unwrap();
    let mut coll = open_collection(dir.path(), "books");
    coll.add_index("author").unwrap();

    let books = vec![
        Book { title: "Fables".into(), author: "Aesop".into(), price: 17.95, pages: 239 },
        Book {
            title: "Adventures of Huckleberry Finn".into(),
            author: "Mark Twain".into(),
            price: 7.95,
            pages: 364,
        },
        Book {
            title: "Tom Sawyer Aboard".into(),
            author: "Mark Twain".into(),
            price: 9.99,
            pages: 270,
        },
    ];
    for b in &books {
        coll.insert(b).unwrap();
    }

    let mut cursor = coll.query(&Condition::equals("author", "Mark Twain")).unwrap();
    assert_eq!(cursor.count(), 2);
    let mut seen = 0;
    while let Some(b) = cursor.next::<Book>(None) {
        assert_eq!(b.author, "Mark Twain");
        seen += 1;
    }
    assert_eq!(seen, 2);
}

#[test]
fn or_query_across_two_indexed_fields_unions_results() {
    let dir = tempdir().unwrap();
    let mut coll = open_collection(dir.path(), "books");
    coll.add_index("author").unwrap();
    coll.add_index("pages").unwrap();

    let books = vec![
        Book { title: "Fables".into(), author: "Aesop".into(), price: 17.95, pages: 239 },
        Book {
            title: "Adventures of Huckleberry Finn".into(),
            author: "Mark Twain".into(),
            price: 7.95,
            pages: 364,
        },
        Book {
            title: "Tom Sawyer Aboard".into(),
            author: "Mark Twain".into(),
            price: 9.99,
            pages: 270,
        },
    ];
    for b in &books {
        coll.insert(b).unwrap();
    }

    let cond = Condition::Or(vec![
        Condition::equals("author", "Aesop"),
        Condition::equals("pages", "270"),
    ]);
    let mut cursor = coll.query(&cond).unwrap();
    assert_eq!(cursor.count(), 2);
    let mut titles: Vec<String> = Vec::new();
    while let Some(b) = cursor.next::<Book>(None) {
        titles.push(b.title);
    }
    titles.sort();
    assert_eq!(titles, vec!["Fables".to_string(), "Tom Sawyer Aboard".to_string()]);
}

#[test]
fn query_id_returns_exactly_one_record() {
    let dir = tempdir().unwrap();
    let mut coll = open_collection(dir.path(), "books");
    let id = coll
        .insert(&Book { title: "Fables".into(), author: "Aesop".into(), price: 17.95, pages: 239 })
        .unwrap();

    let mut cursor = coll.query_id(id).unwrap();
    let b: Book = cursor.next(None).unwrap();
    assert_eq!(b.title, "Fables");
    assert!(cursor.next::<Book>(None).is_none());
}

#[test]
fn query_on_unindexed_field_fails() {
    let dir = tempdir().unwrap();
    let coll = open_collection(dir.path(), "books");
    let err = coll.query(&Condition::equals("title", "Fables")).unwrap_err();
    assert!(matches!(err, Error::NoIndexOnField(field) if field == "title"));
}

#[test]
fn query_all_enumerates_every_record() {
    let dir = tempdir().unwrap();
    let mut coll = open_collection(dir.path(), "t");
    coll.insert(&Person { x: "a".into(), y: 1, z: 1.0 }).unwrap();
    coll.insert(&Person { x: "b".into(), y: 2, z: 2.0 }).unwrap();

    let mut cursor = coll.query_all().unwrap();
    assert_eq!(cursor.count(), 2);
    let mut count = 0;
    while cursor.next::<Person>(None).is_some() {
        count += 1;
    }
    assert_eq!(count, 2);
}

#[test]
fn add_index_is_idempotent() {
    let dir = tempdir().unwrap();
    let mut coll = open_collection(dir.path(), "t");
    coll.insert(&Person { x: "a".into(), y: 1, z: 1.0 }).unwrap();
    coll.add_index("x").unwrap();
    coll.add_index("x").unwrap();
    assert_eq!(coll.indexes["x"].bucket_count(), 1);
}

#[test]
fn reindex_rebuilds_from_current_records() {
    let dir = tempdir().unwrap();
    let mut coll = open_collection(dir.path(), "t");
    coll.insert(&Person { x: "a".into(), y: 1, z: 1.0 }).unwrap();
    coll.add_index("x").unwrap();
    coll.insert(&Person { x: "a".into(), y: 2, z: 1.0 }).unwrap();
    coll.reindex("x").unwrap();
    assert_eq!(coll.indexes["x"].bucket("a").len(), 2);
}
