use tasklist_core::{
    export_snapshot, import_snapshot, DecodeError, ImportMode, KeyValueStore, MemoryStore,
    StoreConfig, Task, TaskStore, TaskStoreError, TaskValidationError, TransferError,
    DEFAULT_STORAGE_KEY, EXPORT_FORMAT_VERSION,
};

#[test]
fn export_writes_versioned_document() {
    let tasks = vec![Task::new("Buy milk").unwrap()];

    let raw = export_snapshot(&tasks).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(json["version"], EXPORT_FORMAT_VERSION);
    assert!(json["exportDate"].as_str().unwrap().ends_with('Z'));
    assert_eq!(json["tasks"][0]["id"], tasks[0].id.as_str());
    assert!(raw.contains("\n  \"tasks\""));
}

#[test]
fn export_then_import_reproduces_collection() {
    let mut done = Task::new("done").unwrap();
    done.completed = true;
    let tasks = vec![Task::new("pending").unwrap(), done];

    let raw = export_snapshot(&tasks).unwrap();
    assert_eq!(import_snapshot(&raw, ImportMode::Lenient).unwrap(), tasks);
}

#[test]
fn import_accepts_minimal_task_objects() {
    let tasks = import_snapshot(
        r#"{"tasks":[{"id":"a","text":"x","completed":true}]}"#,
        ImportMode::Lenient,
    )
    .unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "a");
    assert!(tasks[0].completed);
    assert_eq!(tasks[0].created_at, tasks[0].updated_at);
}

#[test]
fn import_rejects_malformed_payloads() {
    let cases = [
        "not json",
        r#"{"exportDate":"2026-10-18T00:00:00.000Z"}"#,
        r#"{"tasks":"a,b"}"#,
        r#"{"tasks":null}"#,
        r#"{"tasks":[{"text":"no id","completed":false}]}"#,
    ];

    for raw in cases {
        let err = import_snapshot(raw, ImportMode::Lenient).unwrap_err();
        assert!(
            matches!(err, TransferError::Malformed(_)),
            "expected malformed import for {raw}, got {err}"
        );
    }

    assert!(matches!(
        import_snapshot("not json", ImportMode::Lenient).unwrap_err(),
        TransferError::Malformed(DecodeError::Syntax(_))
    ));
}

#[test]
fn lenient_import_keeps_text_outside_add_rules() {
    let long = "z".repeat(300);
    let raw = format!(
        r#"{{"tasks":[{{"id":"a","text":"","completed":false}},{{"id":"b","text":"{long}","completed":false}}]}}"#
    );

    let tasks = import_snapshot(&raw, ImportMode::Lenient).unwrap();
    assert_eq!(tasks[0].text, "");
    assert_eq!(tasks[1].text, long);
}

#[test]
fn strict_import_applies_add_rules() {
    let trimmed = import_snapshot(
        r#"{"tasks":[{"id":"a","text":"  spaced  ","completed":false}]}"#,
        ImportMode::Strict,
    )
    .unwrap();
    assert_eq!(trimmed[0].text, "spaced");

    let err = import_snapshot(
        r#"{"tasks":[{"id":"ok","text":"fine","completed":false},{"id":"blank","text":"  ","completed":false}]}"#,
        ImportMode::Strict,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        TransferError::Rejected {
            task_id,
            reason: TaskValidationError::Empty,
        } if task_id == "blank"
    ));
}

#[test]
fn store_import_replaces_collection_and_persists() {
    let mut store = TaskStore::open(MemoryStore::new(), &StoreConfig::default());
    assert!(store.add("old").unwrap().is_saved());

    let imported = store
        .import(r#"{"tasks":[{"id":"a","text":"x","completed":true}]}"#)
        .unwrap();

    assert!(imported.is_saved());
    assert_eq!(imported.into_value(), 1);
    assert_eq!(store.tasks().len(), 1);
    assert!(store.tasks()[0].completed);

    let stored = store
        .gateway()
        .store()
        .get_item(DEFAULT_STORAGE_KEY)
        .unwrap()
        .unwrap();
    assert!(stored.contains("\"id\":\"a\""));
    assert!(!stored.contains("old"));
}

#[test]
fn failed_store_import_leaves_collection_untouched() {
    let mut store = TaskStore::open(MemoryStore::new(), &StoreConfig::default());
    let existing = store.add("keep").unwrap().into_value();

    let err = store.import("not json").unwrap_err();

    assert!(matches!(
        err,
        TaskStoreError::Transfer(TransferError::Malformed(_))
    ));
    assert_eq!(store.tasks(), &[existing][..]);
}

#[test]
fn store_uses_configured_import_mode() {
    let config = StoreConfig {
        import_mode: ImportMode::Strict,
        ..StoreConfig::default()
    };
    let mut store = TaskStore::open(MemoryStore::new(), &config);

    let err = store
        .import(r#"{"tasks":[{"id":"a","text":"","completed":false}]}"#)
        .unwrap_err();
    assert!(matches!(
        err,
        TaskStoreError::Transfer(TransferError::Rejected { .. })
    ));
    assert!(store.tasks().is_empty());
}

#[test]
fn store_export_matches_free_function_shape() {
    let mut store = TaskStore::open(MemoryStore::new(), &StoreConfig::default());
    assert!(store.add("exported").unwrap().is_saved());

    let raw = store.export().unwrap();
    let reimported = import_snapshot(&raw, ImportMode::Strict).unwrap();
    assert_eq!(reimported, store.tasks());
}
