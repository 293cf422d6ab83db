#[path = "fixtures.rs"]
mod fixtures;

use chatshift::core::error::ChatshiftError;
use chatshift::core::journal::Journal;
use chatshift::core::migrate::{MigrationMode, migrate_sessions, migrate_workspace};
use fixtures::{StorageFixture, composer, legacy_tab, raw_kv, record_ids};
use serde_json::Value as JsonValue;

#[test]
fn move_is_a_transfer_not_a_clone() {
    let fx = StorageFixture::new();
    fx.add_workspace("alpha");
    let beta = fx.add_workspace("beta");
    fx.seed_composer(
        "alpha",
        &[composer("r1", "first", 2000, &[]), composer("r2", "second", 1000, &[])],
        &[],
    );

    let stores = fx.stores();
    let results = migrate_sessions(
        &stores,
        &["r1".to_string()],
        &beta,
        MigrationMode::Move,
        false,
        &Journal::disabled(),
    )
    .unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].success, "{:?}", results[0]);
    assert!(results[0].new_record_identifier.is_none());
    assert_eq!(record_ids(&fx.workspace_db("alpha")), vec!["r2"]);
    assert_eq!(record_ids(&fx.workspace_db("beta")), vec!["r1"]);
}

#[test]
fn copy_preserves_the_source_and_replicates_bubbles() {
    let fx = StorageFixture::new();
    fx.add_workspace("alpha");
    let beta = fx.add_workspace("beta");
    fx.seed_composer("alpha", &[composer("r1", "chat", 2000, &["b1", "b2"])], &[]);
    fx.put_bubble("r1", "b1", "question");
    fx.put_bubble("r1", "b2", "answer");

    let stores = fx.stores();
    let results = migrate_sessions(
        &stores,
        &["r1".to_string()],
        &beta,
        MigrationMode::Copy,
        false,
        &Journal::disabled(),
    )
    .unwrap();

    assert!(results[0].success, "{:?}", results[0]);
    let new_id = results[0].new_record_identifier.clone().unwrap();
    assert_ne!(new_id, "r1");

    // Source untouched, destination gained exactly one record.
    assert_eq!(record_ids(&fx.workspace_db("alpha")), vec!["r1"]);
    assert_eq!(record_ids(&fx.workspace_db("beta")), vec![new_id.clone()]);

    // Both bubble namespaces are fully populated and disjoint.
    assert_eq!(fx.bubble_keys("r1").len(), 2);
    assert_eq!(fx.bubble_keys(&new_id).len(), 2);

    // The copied record's headers point at the new bubbles, not r1's.
    let raw = raw_kv(&fx.workspace_db("beta"), fixtures::COMPOSER_KEY).unwrap();
    let value: JsonValue = serde_json::from_str(&raw).unwrap();
    let headers = value["allComposers"][0]["fullConversationHeadersOnly"]
        .as_array()
        .unwrap();
    for header in headers {
        let bubble_id = header["bubbleId"].as_str().unwrap();
        assert!(bubble_id != "b1" && bubble_id != "b2");
        assert!(
            fx.bubble_keys(&new_id)
                .contains(&format!("bubbleId:{new_id}:{bubble_id}"))
        );
    }
}

#[test]
fn copy_keeps_dangling_header_entries() {
    let fx = StorageFixture::new();
    fx.add_workspace("alpha");
    let beta = fx.add_workspace("beta");
    fx.seed_composer("alpha", &[composer("r1", "chat", 2000, &["b1", "ghost"])], &[]);
    fx.put_bubble("r1", "b1", "present");

    let stores = fx.stores();
    let results = migrate_sessions(
        &stores,
        &["r1".to_string()],
        &beta,
        MigrationMode::Copy,
        false,
        &Journal::disabled(),
    )
    .unwrap();
    let new_id = results[0].new_record_identifier.clone().unwrap();

    // Only the bubble that existed was duplicated.
    assert_eq!(fx.bubble_keys(&new_id).len(), 1);

    let raw = raw_kv(&fx.workspace_db("beta"), fixtures::COMPOSER_KEY).unwrap();
    let value: JsonValue = serde_json::from_str(&raw).unwrap();
    let headers = value["allComposers"][0]["fullConversationHeadersOnly"]
        .as_array()
        .unwrap();
    assert_eq!(headers.len(), 2);
    assert_ne!(headers[0]["bubbleId"].as_str().unwrap(), "b1");
    assert_eq!(headers[1]["bubbleId"].as_str().unwrap(), "ghost");
}

#[test]
fn dry_run_changes_nothing_byte_for_byte() {
    let fx = StorageFixture::new();
    fx.add_workspace("alpha");
    let beta = fx.add_workspace("beta");
    fx.seed_composer("alpha", &[composer("r1", "chat", 2000, &["b1"])], &[]);
    fx.seed_composer("beta", &[composer("r9", "other", 500, &[])], &[]);
    fx.put_bubble("r1", "b1", "text");

    let alpha_before = raw_kv(&fx.workspace_db("alpha"), fixtures::COMPOSER_KEY);
    let beta_before = raw_kv(&fx.workspace_db("beta"), fixtures::COMPOSER_KEY);

    let stores = fx.stores();
    for mode in [MigrationMode::Move, MigrationMode::Copy] {
        let results = migrate_sessions(
            &stores,
            &["r1".to_string()],
            &beta,
            mode,
            true,
            &Journal::disabled(),
        )
        .unwrap();
        assert!(results[0].success);
        assert!(results[0].dry_run);
        assert!(results[0].new_record_identifier.is_none());
    }

    assert_eq!(raw_kv(&fx.workspace_db("alpha"), fixtures::COMPOSER_KEY), alpha_before);
    assert_eq!(raw_kv(&fx.workspace_db("beta"), fixtures::COMPOSER_KEY), beta_before);
    assert_eq!(fx.bubble_keys("r1").len(), 1);
}

#[test]
fn batch_keeps_order_and_survives_a_missing_record() {
    let fx = StorageFixture::new();
    fx.add_workspace("alpha");
    let beta = fx.add_workspace("beta");
    fx.seed_composer(
        "alpha",
        &[composer("r1", "one", 3000, &[]), composer("r3", "three", 1000, &[])],
        &[],
    );

    let stores = fx.stores();
    let results = migrate_sessions(
        &stores,
        &["r1".to_string(), "doesnotexist".to_string(), "r3".to_string()],
        &beta,
        MigrationMode::Move,
        false,
        &Journal::disabled(),
    )
    .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].record_identifier, "r1");
    assert_eq!(results[1].record_identifier, "doesnotexist");
    assert_eq!(results[2].record_identifier, "r3");
    assert!(results[0].success);
    assert!(!results[1].success);
    assert_eq!(results[1].error_code.as_deref(), Some("RECORD_NOT_FOUND"));
    assert!(results[2].success);
    assert_eq!(record_ids(&fx.workspace_db("beta")), vec!["r1", "r3"]);
}

#[test]
fn round_trip_restores_both_stores() {
    let fx = StorageFixture::new();
    let alpha = fx.add_workspace("alpha");
    let beta = fx.add_workspace("beta");
    fx.seed_composer(
        "alpha",
        &[composer("r1", "one", 2000, &[]), composer("r2", "two", 1000, &[])],
        &[],
    );
    fx.seed_composer("beta", &[composer("r9", "nine", 500, &[])], &[]);

    let stores = fx.stores();
    let journal = Journal::disabled();
    let out = migrate_sessions(
        &stores,
        &["r1".to_string()],
        &beta,
        MigrationMode::Move,
        false,
        &journal,
    )
    .unwrap();
    assert!(out[0].success);

    let back = migrate_sessions(
        &stores,
        &["r1".to_string()],
        &alpha,
        MigrationMode::Move,
        false,
        &journal,
    )
    .unwrap();
    assert!(back[0].success);

    let mut alpha_ids = record_ids(&fx.workspace_db("alpha"));
    alpha_ids.sort();
    assert_eq!(alpha_ids, vec!["r1", "r2"]);
    assert_eq!(record_ids(&fx.workspace_db("beta")), vec!["r9"]);
}

#[test]
fn same_workspace_is_rejected_per_record() {
    let fx = StorageFixture::new();
    let alpha = fx.add_workspace("alpha");
    fx.seed_composer("alpha", &[composer("r1", "one", 2000, &[])], &[]);

    let stores = fx.stores();
    let results = migrate_sessions(
        &stores,
        &["r1".to_string()],
        &alpha,
        MigrationMode::Move,
        false,
        &Journal::disabled(),
    )
    .unwrap();

    assert!(!results[0].success);
    assert_eq!(results[0].error_code.as_deref(), Some("SAME_LOCATION"));
    assert_eq!(record_ids(&fx.workspace_db("alpha")), vec!["r1"]);
}

#[test]
fn unknown_destination_fails_before_any_mutation() {
    let fx = StorageFixture::new();
    fx.add_workspace("alpha");
    fx.seed_composer("alpha", &[composer("r1", "one", 2000, &[])], &[]);

    let stores = fx.stores();
    let err = migrate_sessions(
        &stores,
        &["r1".to_string()],
        std::path::Path::new("/nowhere/at/all"),
        MigrationMode::Move,
        false,
        &Journal::disabled(),
    )
    .unwrap_err();

    assert!(matches!(err, ChatshiftError::DestinationNotFound(_)), "{err}");
    assert_eq!(record_ids(&fx.workspace_db("alpha")), vec!["r1"]);
}

#[test]
fn move_into_legacy_store_keeps_its_shape() {
    let fx = StorageFixture::new();
    fx.add_workspace("alpha");
    let beta = fx.add_workspace("beta");
    fx.seed_composer("alpha", &[composer("r1", "one", 2000, &[])], &[]);
    fx.seed_legacy("beta", &[legacy_tab("l1", "old chat", 100)]);

    let stores = fx.stores();
    let results = migrate_sessions(
        &stores,
        &["r1".to_string()],
        &beta,
        MigrationMode::Move,
        false,
        &Journal::disabled(),
    )
    .unwrap();
    assert!(results[0].success);

    // Still under the legacy key; the migration did not upgrade the store.
    assert!(raw_kv(&fx.workspace_db("beta"), fixtures::COMPOSER_KEY).is_none());
    assert_eq!(record_ids(&fx.workspace_db("beta")), vec!["l1", "r1"]);
}

#[test]
fn move_preserves_envelope_siblings() {
    let fx = StorageFixture::new();
    fx.add_workspace("alpha");
    let beta = fx.add_workspace("beta");
    fx.seed_composer(
        "alpha",
        &[composer("r1", "one", 2000, &[]), composer("r2", "two", 1000, &[])],
        &[("selectedComposerId", serde_json::json!("r2"))],
    );

    let stores = fx.stores();
    migrate_sessions(
        &stores,
        &["r1".to_string()],
        &beta,
        MigrationMode::Move,
        false,
        &Journal::disabled(),
    )
    .unwrap();

    let raw = raw_kv(&fx.workspace_db("alpha"), fixtures::COMPOSER_KEY).unwrap();
    let value: JsonValue = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["selectedComposerId"].as_str(), Some("r2"));
    assert_eq!(value["allComposers"].as_array().unwrap().len(), 1);
}

#[test]
fn workspace_merge_guards_a_non_empty_destination() {
    let fx = StorageFixture::new();
    let alpha = fx.add_workspace("alpha");
    let beta = fx.add_workspace("beta");
    fx.seed_composer(
        "alpha",
        &[composer("r1", "one", 2000, &[]), composer("r2", "two", 1000, &[])],
        &[],
    );
    fx.seed_composer("beta", &[composer("r9", "nine", 500, &[])], &[]);

    let alpha_before = raw_kv(&fx.workspace_db("alpha"), fixtures::COMPOSER_KEY);
    let beta_before = raw_kv(&fx.workspace_db("beta"), fixtures::COMPOSER_KEY);

    let stores = fx.stores();
    let err = migrate_workspace(
        &stores,
        &alpha,
        &beta,
        MigrationMode::Move,
        false,
        false,
        &Journal::disabled(),
    )
    .unwrap_err();
    assert!(matches!(err, ChatshiftError::DestinationNotEmpty(_)), "{err}");
    assert_eq!(raw_kv(&fx.workspace_db("alpha"), fixtures::COMPOSER_KEY), alpha_before);
    assert_eq!(raw_kv(&fx.workspace_db("beta"), fixtures::COMPOSER_KEY), beta_before);

    // Force merges additively: destination keeps its own records.
    let aggregate = migrate_workspace(
        &stores,
        &alpha,
        &beta,
        MigrationMode::Move,
        false,
        true,
        &Journal::disabled(),
    )
    .unwrap();
    assert!(aggregate.success);
    assert_eq!(aggregate.total_count, 2);
    assert_eq!(aggregate.success_count, 2);

    assert_eq!(record_ids(&fx.workspace_db("alpha")), Vec::<String>::new());
    let mut beta_ids = record_ids(&fx.workspace_db("beta"));
    beta_ids.sort();
    assert_eq!(beta_ids, vec!["r1", "r2", "r9"]);
}

#[test]
fn workspace_merge_needs_source_records() {
    let fx = StorageFixture::new();
    let alpha = fx.add_workspace("alpha");
    let beta = fx.add_workspace("beta");
    fx.seed_composer("beta", &[composer("r9", "nine", 500, &[])], &[]);

    let stores = fx.stores();
    // Empty source store and a path with no store at all fail the same way.
    for source in [alpha, std::path::PathBuf::from("/no/such/project")] {
        let err = migrate_workspace(
            &stores,
            &source,
            &beta,
            MigrationMode::Move,
            false,
            true,
            &Journal::disabled(),
        )
        .unwrap_err();
        assert!(matches!(err, ChatshiftError::NoRecordsFound(_)), "{err}");
    }
}

#[test]
fn locked_source_fails_fast_with_database_locked() {
    let fx = StorageFixture::new();
    fx.add_workspace("alpha");
    let beta = fx.add_workspace("beta");
    fx.seed_composer("alpha", &[composer("r1", "one", 2000, &[])], &[]);

    // Hold the source store the way the editor does.
    let holder = rusqlite::Connection::open(fx.workspace_db("alpha")).unwrap();
    holder.execute_batch("BEGIN EXCLUSIVE").unwrap();

    let stores = fx.stores();
    let results = migrate_sessions(
        &stores,
        &["r1".to_string()],
        &beta,
        MigrationMode::Move,
        false,
        &Journal::disabled(),
    )
    .unwrap();

    assert!(!results[0].success);
    assert_eq!(results[0].error_code.as_deref(), Some("DATABASE_LOCKED"));
    holder.execute_batch("ROLLBACK").unwrap();
    assert_eq!(record_ids(&fx.workspace_db("alpha")), vec!["r1"]);
}

#[test]
fn locked_destination_after_source_write_is_migration_failed() {
    let fx = StorageFixture::new();
    fx.add_workspace("alpha");
    let beta = fx.add_workspace("beta");
    fx.seed_composer("alpha", &[composer("r1", "one", 2000, &[])], &[]);

    let holder = rusqlite::Connection::open(fx.workspace_db("beta")).unwrap();
    holder.execute_batch("BEGIN EXCLUSIVE").unwrap();

    let stores = fx.stores();
    let results = migrate_sessions(
        &stores,
        &["r1".to_string()],
        &beta,
        MigrationMode::Move,
        false,
        &Journal::disabled(),
    )
    .unwrap();

    // The source write already landed; the record is gone from both live
    // arrays and the result says so instead of pretending it is retryable.
    assert!(!results[0].success);
    assert_eq!(results[0].error_code.as_deref(), Some("MIGRATION_FAILED"));
    assert!(results[0].error.as_deref().unwrap().contains("removed"));
    holder.execute_batch("ROLLBACK").unwrap();
    assert_eq!(record_ids(&fx.workspace_db("alpha")), Vec::<String>::new());
    assert_eq!(record_ids(&fx.workspace_db("beta")), Vec::<String>::new());
}

#[test]
fn journal_records_each_attempt() {
    let fx = StorageFixture::new();
    fx.add_workspace("alpha");
    let beta = fx.add_workspace("beta");
    fx.seed_composer("alpha", &[composer("r1", "one", 2000, &[])], &[]);

    let journal_path = fx.root.join("migrations.jsonl");
    let stores = fx.stores();
    migrate_sessions(
        &stores,
        &["r1".to_string(), "missing".to_string()],
        &beta,
        MigrationMode::Move,
        false,
        &Journal::at(journal_path.clone()),
    )
    .unwrap();

    let raw = std::fs::read_to_string(&journal_path).unwrap();
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: JsonValue = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["op"].as_str(), Some("move"));
    assert_eq!(first["record_id"].as_str(), Some("r1"));
    assert_eq!(first["status"].as_str(), Some("OK"));
    let second: JsonValue = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["status"].as_str(), Some("RECORD_NOT_FOUND"));
}
