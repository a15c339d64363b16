//! End-to-end pin collection scenarios, including persistence round-trips.

use paperscope::models::Paper;
use paperscope::store::{PinStore, PinToggle};

fn paper(id: &str) -> Paper {
    Paper {
        id: id.to_string(),
        title: format!("Paper {id}"),
        journal: "Unknown".to_string(),
        ..Default::default()
    }
}

// =============================================================================
// Grouping scenarios
// =============================================================================

#[test]
fn test_pin_then_group_then_move() {
    let mut store = PinStore::in_memory();

    assert_eq!(store.toggle_pin(paper("A")).unwrap(), PinToggle::Pinned);
    assert_eq!(store.toggle_pin(paper("B")).unwrap(), PinToggle::Pinned);

    let macro_id = store.create_group("Macro").unwrap();
    assert!(store.move_paper_to_group("A", Some(macro_id.clone())));

    assert_eq!(store.bucket_order(&Some(macro_id)), ["A"]);
    assert_eq!(store.bucket_order(&None), ["B"]);
    assert!(store.is_consistent());
}

#[test]
fn test_unpin_removes_from_group() {
    let mut store = PinStore::in_memory();
    store.toggle_pin(paper("A")).unwrap();
    let gid = store.create_group("G").unwrap();
    store.move_paper_to_group("A", Some(gid.clone()));

    assert_eq!(store.toggle_pin(paper("A")).unwrap(), PinToggle::Unpinned);
    assert!(store.bucket_order(&Some(gid)).is_empty());
    assert!(store.is_empty());
    assert!(store.is_consistent());
}

#[test]
fn test_mutation_sequence_keeps_partition() {
    let mut store = PinStore::in_memory();
    for id in ["A", "B", "C", "D", "E"] {
        store.toggle_pin(paper(id)).unwrap();
    }

    let g1 = store.create_group("One").unwrap();
    let g2 = store.create_group("Two").unwrap();

    store.move_paper_to_group("A", Some(g1.clone()));
    store.move_paper_to_group("B", Some(g1.clone()));
    store.move_paper_to_group_at("C", Some(g2.clone()), 0);
    store.reorder_in_group(&Some(g1.clone()), 0, 1);
    store.move_paper_to_group("B", Some(g2.clone()));
    store.toggle_pin(paper("D")).unwrap();
    store.rename_group(&g2, "Two renamed");
    store.delete_group(&g1);

    assert!(store.is_consistent());
    assert_eq!(store.len(), 4);

    // Every pin appears in exactly one bucket.
    let mut placed: Vec<&String> = store.bucket_order(&None).iter().collect();
    placed.extend(store.bucket_order(&Some(g2)).iter());
    assert_eq!(placed.len(), store.len());
}

// =============================================================================
// Persistence round-trips
// =============================================================================

#[test]
fn test_write_through_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pins.json");

    {
        let mut store = PinStore::load(path.clone());
        store.toggle_pin(paper("A")).unwrap();
        store.toggle_pin(paper("B")).unwrap();
        let gid = store.create_group("Saved").unwrap();
        store.move_paper_to_group("A", Some(gid));
    }

    let reloaded = PinStore::load(path);
    assert_eq!(reloaded.len(), 2);
    assert!(reloaded.is_pinned("A"));
    assert!(reloaded.is_pinned("B"));
    assert_eq!(reloaded.groups().len(), 1);
    assert_eq!(reloaded.groups()[0].name, "Saved");

    let gid = reloaded.groups()[0].id.clone();
    assert_eq!(reloaded.bucket_order(&Some(gid)), ["A"]);
    assert_eq!(reloaded.bucket_order(&None), ["B"]);
    assert!(reloaded.is_consistent());
}

#[test]
fn test_missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = PinStore::load(dir.path().join("does-not-exist.json"));
    assert!(store.is_empty());
    assert!(store.groups().is_empty());
}

#[test]
fn test_corrupt_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pins.json");
    std::fs::write(&path, "{not valid json").unwrap();

    let store = PinStore::load(path);
    assert!(store.is_empty());
}

#[test]
fn test_legacy_bare_array_migrates_ungrouped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pins.json");

    let legacy = serde_json::to_string(&vec![paper("W1"), paper("W2")]).unwrap();
    std::fs::write(&path, legacy).unwrap();

    let store = PinStore::load(path);
    assert_eq!(store.len(), 2);
    assert!(store.groups().is_empty());
    assert_eq!(store.bucket_order(&None), ["W1", "W2"]);
    assert_eq!(store.paper("W1").unwrap().title, "Paper W1");
    assert!(store.is_consistent());
}

#[test]
fn test_hand_edited_file_is_repaired() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pins.json");

    // Snapshot where a bucket references an unpinned id and a pinned id
    // was dropped from every bucket.
    let doctored = serde_json::json!({
        "version": 1,
        "pins": ["W1", "W2"],
        "papers": {"W1": paper("W1"), "W2": paper("W2"), "W9": paper("W9")},
        "groups": [],
        "order": [{"group": null, "papers": ["W1", "W9"]}]
    });
    std::fs::write(&path, serde_json::to_vec(&doctored).unwrap()).unwrap();

    let store = PinStore::load(path);
    assert!(store.is_consistent());
    assert_eq!(store.len(), 2);
    // W9 dropped, W2 re-appended to the ungrouped bucket.
    assert_eq!(store.bucket_order(&None), ["W1", "W2"]);
    assert!(store.paper("W9").is_none());
}

#[test]
fn test_clear_persists_empty_collection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pins.json");

    {
        let mut store = PinStore::load(path.clone());
        store.toggle_pin(paper("A")).unwrap();
        store.create_group("Kept").unwrap();
        store.clear_pins();
    }

    let reloaded = PinStore::load(path);
    assert!(reloaded.is_empty());
    assert_eq!(reloaded.groups().len(), 1);
}
