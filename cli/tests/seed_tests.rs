use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use tooldir_cli::{load_seed, parse_seed, save_seed, seeded_store};
use tooldir_model::Entry;
use tooldir_store::DEFAULT_COLLECTION;
use tooldir_types::{EntryId, ServerTimestamp};

const SEED: &str = r#"[
  {
    "id": "obsidian",
    "createdAt": "2024-03-01T12:00:00Z",
    "name": "Obsidian",
    "description": "Local-first Markdown notes",
    "category": "PKM",
    "pricing": "Freemium",
    "tags": ["Markdown", "Offline"],
    "ratingSum": 9,
    "ratingCount": 2
  },
  {
    "name": "Scratch",
    "description": "No id, no timestamp"
  }
]"#;

#[test]
fn parses_ids_timestamps_and_body() {
    let docs = parse_seed(SEED).unwrap();
    assert_eq!(docs.len(), 2);

    let obsidian = &docs[0];
    assert_eq!(obsidian.id, EntryId::new("obsidian"));
    assert_eq!(
        obsidian.created_at,
        Some(ServerTimestamp::from_millis(1_709_294_400_000))
    );
    assert_eq!(obsidian.data.get("id"), None);
    assert_eq!(obsidian.data["pricing"], json!("Freemium"));

    let entry = Entry::from_document(obsidian);
    assert_eq!(entry.average_rating(), Some(4.5));
    assert_eq!(entry.tags.as_slice(), &["Markdown".to_string(), "Offline".to_string()]);

    let scratch = &docs[1];
    assert!(!scratch.id.as_str().is_empty());
    assert_eq!(scratch.created_at, None);
}

#[test]
fn rejects_non_array_seed() {
    let err = parse_seed(r#"{"name": "x"}"#).unwrap_err();
    assert!(err.to_string().contains("JSON array"));
}

#[test]
fn rejects_pre_epoch_timestamps() {
    let err = parse_seed(r#"[{"name": "x", "createdAt": "1969-12-31T00:00:00Z"}]"#).unwrap_err();
    assert!(format!("{err:#}").contains("before 1970"));
}

#[test]
fn missing_file_names_the_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");
    let err = load_seed(&path).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn save_then_load_preserves_the_collection() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("apps.json");
    fs::write(&path, SEED).unwrap();

    let docs = load_seed(&path).unwrap();
    save_seed(&path, &docs).unwrap();
    let reloaded = load_seed(&path).unwrap();

    assert_eq!(reloaded, docs);
}

#[test]
fn seeded_store_holds_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("apps.json");
    fs::write(&path, SEED).unwrap();

    let store = seeded_store(Some(&path)).unwrap();
    assert_eq!(store.documents(DEFAULT_COLLECTION).len(), 2);

    let empty = seeded_store(None).unwrap();
    assert!(empty.documents(DEFAULT_COLLECTION).is_empty());
}
