use chrono::{TimeDelta, Utc};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

use tollgate_core::domain::{NewUser, Role};
use tollgate_core::error::RepoError;
use tollgate_core::ports::{BaseRepository, RecoveryTokenRepository, RoleRepository, UserRepository};

use super::entity::{recovery_token, role, user};
use super::postgres_repo::{
    PostgresRecoveryTokenRepository, PostgresRoleRepository, PostgresUserRepository,
};

fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

fn admin_role_model() -> role::Model {
    role::Model {
        id: 1,
        name: "admin".to_owned(),
    }
}

#[tokio::test]
async fn test_find_role_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![admin_role_model()]])
        .into_connection();

    let repo = PostgresRoleRepository::new(db);

    let role: Option<Role> = repo.find_by_id(1).await.unwrap();

    assert_eq!(
        role,
        Some(Role {
            id: 1,
            name: "admin".to_owned()
        })
    );
}

#[tokio::test]
async fn test_ensure_returns_existing_role() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![admin_role_model()]])
        .into_connection();

    let repo = PostgresRoleRepository::new(db);

    let role = repo.ensure("admin").await.unwrap();
    assert_eq!(role.id, 1);
}

#[tokio::test]
async fn test_create_user_has_no_role() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user::Model {
            id: 7,
            username: "ana".to_owned(),
            email: "ana@example.com".to_owned(),
            hashed_password: "$argon2id$stub".to_owned(),
            role_id: None,
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let created = repo
        .create(NewUser {
            username: "ana".to_owned(),
            email: "ana@example.com".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(created.id, 7);
    assert_eq!(created.password_hash, "$argon2id$stub");
    assert!(created.role.is_none());
}

#[tokio::test]
async fn test_update_password_of_missing_user() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(0)])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    assert!(matches!(
        repo.update_password_hash(42, "hash").await,
        Err(RepoError::NotFound)
    ));
}

#[tokio::test]
async fn test_find_recovery_token() {
    let expires_at = Utc::now() + TimeDelta::minutes(30);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![recovery_token::Model {
            id: 1,
            email: "ana@example.com".to_owned(),
            recovery_token: "tok".to_owned(),
            expires_at: expires_at.fixed_offset(),
            used: false,
        }]])
        .into_connection();

    let repo = PostgresRecoveryTokenRepository::new(db);

    let record = repo.find_by_token("tok").await.unwrap().unwrap();

    assert_eq!(record.email, "ana@example.com");
    assert_eq!(record.expires_at, expires_at);
    assert!(!record.used);
}

#[tokio::test]
async fn test_consume_only_once() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(1), exec(0)])
        .into_connection();

    let repo = PostgresRecoveryTokenRepository::new(db);

    assert!(repo.consume("tok").await.unwrap());
    assert!(!repo.consume("tok").await.unwrap());
}

#[tokio::test]
async fn test_redeem_updates_token_and_password() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(1), exec(1)])
        .into_connection();

    let repo = PostgresRecoveryTokenRepository::new(db);

    assert!(repo.redeem("tok", 7, "new-hash").await.unwrap());
}

#[tokio::test]
async fn test_redeem_used_token_writes_nothing() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec(0)])
        .into_connection();

    let repo = PostgresRecoveryTokenRepository::new(db);

    assert!(!repo.redeem("tok", 7, "new-hash").await.unwrap());
}
