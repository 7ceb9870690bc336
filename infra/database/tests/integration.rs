use doorstep_database::{Database, DatabaseError};

async fn mem_db() -> Database {
    Database::builder()
        .url("mem://")
        .session("doorstep-test", "core")
        .init()
        .await
        .expect("in-memory database should initialize")
}

#[tokio::test]
async fn migrations_define_schema_and_rerun_is_a_noop() {
    let db = mem_db().await;

    // The schema is usable right after init.
    let role = db.create_role("member").await.expect("role insert");
    assert_eq!(role.name, "member");

    // Re-running the same migration set against the live connection skips everything.
    let db2 = Database::builder()
        .url("mem://")
        .session("doorstep-test-rerun", "core")
        .init()
        .await
        .expect("second init");
    drop(db2);

    drop(db);
}

#[tokio::test]
async fn username_unique_index_rejects_duplicates() {
    let db = mem_db().await;

    db.create_user("janedoe", None).await.expect("first insert");

    let err = db.create_user("janedoe", None).await.expect_err("duplicate must fail");
    assert!(matches!(err, DatabaseError::Driver(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn role_membership_is_a_value_join() {
    let db = mem_db().await;

    let admins = db.create_role("admin").await.expect("role");
    let guests = db.create_role("guest").await.expect("role");

    db.create_user("janedoe", Some(&admins.id)).await.expect("user");
    db.create_user("johndoe", Some(&admins.id)).await.expect("user");
    db.create_user("drifter", Some(&guests.id)).await.expect("user");
    db.create_user("roleless", None).await.expect("user");

    let members = db.users_in_role(&admins.id).await.expect("membership query");
    let names: Vec<_> = members.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["janedoe", "johndoe"]);

    let found = db.find_user_by_username("drifter").await.expect("lookup");
    assert_eq!(found.expect("present").role_id, Some(guests.id));

    let missing = db.find_user_by_username("nobody").await.expect("lookup");
    assert!(missing.is_none());
}

#[tokio::test]
async fn tampered_migration_ledger_is_detected() {
    let db = mem_db().await;

    // A freshly initialized database re-verifies cleanly.
    db.verify_migrations().await.expect("clean ledger verifies");

    // Rewrite the recorded checksum behind the runner's back.
    db.query("UPDATE migration SET checksum = 'tampered' WHERE version = '0001'")
        .await
        .expect("ledger update")
        .check()
        .expect("ledger update result");

    let err = db.verify_migrations().await.expect_err("drift must be detected");
    assert!(matches!(err, DatabaseError::ChecksumMismatch { .. }), "unexpected error: {err}");
}

#[tokio::test]
async fn revert_drops_the_schema() {
    let db = mem_db().await;

    db.create_user("janedoe", None).await.expect("insert before revert");

    db.revert_last_migration().await.expect("revert");

    // Schema is gone: the unique index no longer guards the table.
    db.create_user("janedoe", None).await.expect("insert after revert");
    db.create_user("janedoe", None).await.expect("duplicate after revert");

    // Nothing left to revert.
    let err = db.revert_last_migration().await.expect_err("second revert must fail");
    assert!(matches!(err, DatabaseError::Migration { .. }));
}

#[tokio::test]
async fn builder_requires_url_and_session() {
    let err = Database::builder().session("ns", "db").init().await.expect_err("missing url");
    assert!(matches!(err, DatabaseError::Unavailable { .. }));

    let err = Database::builder().url("mem://").init().await.expect_err("missing session");
    assert!(matches!(err, DatabaseError::Unavailable { .. }));
}
