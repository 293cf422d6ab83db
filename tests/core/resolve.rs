#[path = "fixtures.rs"]
mod fixtures;

use chatshift::core::error::ChatshiftError;
use chatshift::core::journal::Journal;
use chatshift::core::migrate::{MigrationMode, migrate_sessions};
use chatshift::core::resolve::resolve_tokens;
use chatshift::core::session;
use fixtures::{StorageFixture, composer, record_ids};

#[test]
fn numbers_resolve_against_the_printed_listing_order() {
    let fx = StorageFixture::new();
    fx.add_workspace("alpha");
    fx.seed_composer(
        "alpha",
        &[composer("r-old", "old", 100, &[]), composer("r-new", "new", 9000, &[])],
        &[],
    );

    let stores = fx.stores();
    let listing = session::list_sessions(&stores).unwrap();

    // Newest first: position 1 is r-new even though r-old is first in the
    // stored array.
    let resolved = resolve_tokens(&["1".to_string(), "2".to_string()], &listing).unwrap();
    assert_eq!(resolved, vec!["r-new".to_string(), "r-old".to_string()]);
}

#[test]
fn mixed_tokens_resolve_in_input_order() {
    let fx = StorageFixture::new();
    fx.add_workspace("alpha");
    fx.seed_composer(
        "alpha",
        &[composer("r1", "one", 300, &[]), composer("r2", "two", 200, &[])],
        &[],
    );

    let stores = fx.stores();
    let listing = session::list_sessions(&stores).unwrap();
    let resolved =
        resolve_tokens(&["r2,1".to_string(), "r2".to_string()], &listing).unwrap();
    assert_eq!(
        resolved,
        vec!["r2".to_string(), "r1".to_string(), "r2".to_string()]
    );
}

#[test]
fn out_of_range_number_fails_the_whole_request() {
    let fx = StorageFixture::new();
    fx.add_workspace("alpha");
    fx.seed_composer("alpha", &[composer("r1", "one", 300, &[])], &[]);

    let stores = fx.stores();
    let listing = session::list_sessions(&stores).unwrap();
    let err = resolve_tokens(&["2".to_string()], &listing).unwrap_err();
    assert!(matches!(err, ChatshiftError::RecordNotFound(_)));
}

#[test]
fn a_resolved_number_drives_a_migration() {
    let fx = StorageFixture::new();
    fx.add_workspace("alpha");
    let beta = fx.add_workspace("beta");
    fx.seed_composer(
        "alpha",
        &[composer("r-old", "old", 100, &[]), composer("r-new", "new", 9000, &[])],
        &[],
    );

    let stores = fx.stores();
    let listing = session::list_sessions(&stores).unwrap();
    let identifiers = resolve_tokens(&["1".to_string()], &listing).unwrap();

    let results = migrate_sessions(
        &stores,
        &identifiers,
        &beta,
        MigrationMode::Move,
        false,
        &Journal::disabled(),
    )
    .unwrap();
    assert!(results[0].success);
    assert_eq!(record_ids(&fx.workspace_db("alpha")), vec!["r-old"]);
    assert_eq!(record_ids(&fx.workspace_db("beta")), vec!["r-new"]);
}
