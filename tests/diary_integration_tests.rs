use personal_diary::diary_state::{CORRUPT_KEY, ENTRIES_KEY};
use personal_diary::draft::DraftEditor;
use personal_diary::storage::{FileStorage, SnapshotStorage};
use personal_diary::{parse_response, DiaryError, EntryDraft, EntryPatch, EntryStore, LoadOutcome};
use std::fs;
use tempfile::tempdir;

fn contents<S: SnapshotStorage>(store: &EntryStore<S>) -> Vec<String> {
    store.entries().iter().map(|e| e.content.clone()).collect()
}

#[test]
fn add_three_then_delete_the_middle_one() {
    let dir = tempdir().unwrap();
    let mut store = EntryStore::open(FileStorage::open(dir.path()).unwrap()).unwrap();

    store.add(EntryDraft::new("A")).unwrap();
    let b = store.add(EntryDraft::new("B")).unwrap();
    store.add(EntryDraft::new("C")).unwrap();
    assert_eq!(contents(&store), ["C", "B", "A"]);

    store.delete(&b.id).unwrap();
    assert_eq!(contents(&store), ["C", "A"]);
}

#[test]
fn reopened_store_sees_every_mutation() {
    let dir = tempdir().unwrap();
    let mut store = EntryStore::open(FileStorage::open(dir.path()).unwrap()).unwrap();

    let first = store.add(EntryDraft::new("first")).unwrap();
    let mut draft = EntryDraft::new("second");
    draft.image = Some("data:image/png;base64,iVBORw==".to_string());
    draft.music_link = Some("https://open.spotify.com/track/xyz".to_string());
    store.add(draft).unwrap();
    store
        .update(&first.id, EntryPatch::content("first, edited"))
        .unwrap();

    let reopened = EntryStore::open(FileStorage::open(dir.path()).unwrap()).unwrap();
    assert_eq!(reopened.entries(), store.entries());
    assert_eq!(
        reopened.entries()[0].image.as_deref(),
        Some("data:image/png;base64,iVBORw==")
    );
}

#[test]
fn snapshot_file_uses_the_entries_key() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    let path = storage.path_for(ENTRIES_KEY);
    let mut store = EntryStore::open(storage).unwrap();
    store.add(EntryDraft::new("on disk")).unwrap();

    assert_eq!(path, dir.path().join("diaryEntries.json"));
    let raw = fs::read_to_string(path).unwrap();
    assert!(raw.contains("\"version\":1"));
    assert!(raw.contains("\"createdAt\""));
}

#[test]
fn corrupt_file_is_preserved_and_store_starts_empty() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("diaryEntries.json"), "[{\"id\": ").unwrap();

    let storage = FileStorage::open(dir.path()).unwrap();
    assert!(matches!(
        EntryStore::load(&storage).unwrap(),
        LoadOutcome::Corrupt(_)
    ));

    let store = EntryStore::open(storage).unwrap();
    assert!(store.is_empty());
    drop(store);

    // A second corrupt start must not clobber the first backup.
    fs::write(dir.path().join("diaryEntries.json"), "garbage").unwrap();
    EntryStore::open(FileStorage::open(dir.path()).unwrap()).unwrap();

    let mut backups: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(&format!("{CORRUPT_KEY}.")))
        .collect();
    backups.sort();
    assert_eq!(backups.len(), 2);

    let mut contents: Vec<String> = backups
        .iter()
        .map(|name| fs::read_to_string(dir.path().join(name)).unwrap())
        .collect();
    contents.sort();
    assert_eq!(contents, ["[{\"id\": ", "garbage"]);
}

#[test]
fn editor_validation_keeps_store_unchanged() {
    let dir = tempdir().unwrap();
    let mut store = EntryStore::open(FileStorage::open(dir.path()).unwrap()).unwrap();
    store.add(EntryDraft::new("existing")).unwrap();

    let mut editor = DraftEditor::new();
    let err = editor.save(&mut store).unwrap_err();

    assert!(matches!(err, DiaryError::Validation(_)));
    assert_eq!(store.len(), 1);
}

#[test]
fn corrected_text_flows_into_a_new_entry() {
    let dir = tempdir().unwrap();
    let mut store = EntryStore::open(FileStorage::open(dir.path()).unwrap()).unwrap();

    let mut editor = DraftEditor::new();
    editor.draft.content = "hello world".to_string();
    let result = parse_response(
        "Corrected text: Hello world.\nExplanations:\n- Fixed capitalization\n- Added period",
        &editor.draft.content,
    );
    assert_eq!(result.explanations, ["Fixed capitalization", "Added period"]);

    editor.draft.content = result.corrected_text;
    let saved = editor.save(&mut store).unwrap();

    assert_eq!(store.get(&saved.id).unwrap().content, "Hello world.");
}
