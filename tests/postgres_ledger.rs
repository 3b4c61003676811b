//! Postgres-backed stores against a throwaway database
//!
//! Needs the server from `configuration.yaml`; run with `cargo test -- --ignored`.

use jobboard::configuration::{get_configuration, DatabaseSettings};
use jobboard::domain::{NewUser, RefreshTokenRecord, User, UserRole};
use jobboard::error::StoreError;
use jobboard::store::{CredentialStore, PgCredentialStore, PgRefreshTokenLedger, RefreshTokenLedger};
use sqlx::{Connection, Executor, PgConnection, PgPool};

pub struct TestDb {
    pub credentials: PgCredentialStore,
    pub ledger: PgRefreshTokenLedger,
}

async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");

    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

async fn spawn_db() -> TestDb {
    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    configuration.password.hash_cost = 4;
    let pool = configure_database(&configuration.database).await;

    TestDb {
        credentials: PgCredentialStore::new(pool.clone(), configuration.password.clone()),
        ledger: PgRefreshTokenLedger::new(pool),
    }
}

async fn create_user(db: &TestDb, email: &str) -> User {
    db.credentials
        .create(
            NewUser {
                email: email.to_string(),
                role: UserRole::Candidate,
            },
            "SecurePass123",
        )
        .await
        .expect("Failed to create user")
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn conditional_revoke_succeeds_exactly_once() {
    let db = spawn_db().await;
    let user = create_user(&db, "a@x.com").await;
    let record = RefreshTokenRecord::new("hash-1".to_string(), "jti-1".to_string(), user.id, 7);
    db.ledger.insert(&record).await.unwrap();

    assert!(db.ledger.revoke_if_active("hash-1").await.unwrap());
    assert!(!db.ledger.revoke_if_active("hash-1").await.unwrap());
    assert!(!db.ledger.revoke_if_active("no-such-hash").await.unwrap());

    let stored = db.ledger.find("hash-1").await.unwrap().expect("row should exist");
    assert!(stored.is_revoked);
    assert_eq!(stored.jwt_id, "jti-1");
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn concurrent_conditional_revokes_have_one_winner() {
    let db = spawn_db().await;
    let user = create_user(&db, "a@x.com").await;
    let record = RefreshTokenRecord::new("hash-1".to_string(), "jti-1".to_string(), user.id, 7);
    db.ledger.insert(&record).await.unwrap();

    let (first, second) = tokio::join!(
        db.ledger.revoke_if_active("hash-1"),
        db.ledger.revoke_if_active("hash-1"),
    );

    assert!(first.unwrap() ^ second.unwrap());
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn revoke_all_only_touches_active_rows_of_one_user() {
    let db = spawn_db().await;
    let alice = create_user(&db, "alice@x.com").await;
    let bob = create_user(&db, "bob@x.com").await;
    for (hash, user_id) in [("a1", alice.id), ("a2", alice.id), ("a3", alice.id), ("b1", bob.id)] {
        let record = RefreshTokenRecord::new(hash.to_string(), "jti".to_string(), user_id, 7);
        db.ledger.insert(&record).await.unwrap();
    }
    db.ledger.revoke_if_active("a1").await.unwrap();

    assert_eq!(db.ledger.revoke_all_for_user(alice.id).await.unwrap(), 2);
    assert!(!db.ledger.find("b1").await.unwrap().unwrap().is_revoked);
}

#[tokio::test]
#[ignore = "requires a running Postgres"]
async fn duplicate_email_is_reported_as_duplicate() {
    let db = spawn_db().await;
    create_user(&db, "a@x.com").await;

    let second = db
        .credentials
        .create(
            NewUser {
                email: "a@x.com".to_string(),
                role: UserRole::Company,
            },
            "SecurePass123",
        )
        .await;

    assert!(matches!(second, Err(StoreError::Duplicate(_))));
}
