//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, QueryFilter, Set, TransactionTrait,
};

use tollgate_core::domain::{NewUser, PasswordRecoveryToken, Role, User, mask_email};
use tollgate_core::error::RepoError;
use tollgate_core::ports::{BaseRepository, RecoveryTokenRepository, RoleRepository, UserRepository};

use super::entity::recovery_token::{self, Entity as RecoveryTokenEntity};
use super::entity::role::{self, Entity as RoleEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_err, write_err};

/// PostgreSQL role repository.
pub type PostgresRoleRepository = PostgresBaseRepository<RoleEntity>;

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RepoError> {
        let result = RoleEntity::find()
            .filter(role::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn ensure(&self, name: &str) -> Result<Role, RepoError> {
        if let Some(existing) = self.find_by_name(name).await? {
            return Ok(existing);
        }

        let inserted = role::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await;

        match inserted {
            Ok(model) => {
                tracing::info!(role = %name, "Role created");
                Ok(model.into())
            }
            // Lost a race with a concurrent insert; the row exists now.
            Err(e) => match write_err(e) {
                RepoError::Constraint(_) => {
                    self.find_by_name(name).await?.ok_or(RepoError::NotFound)
                }
                other => Err(other),
            },
        }
    }
}

/// PostgreSQL user repository. Every lookup joins the user's role.
pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    async fn find_one(&self, filter: SimpleExpr) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(filter)
            .find_also_related(RoleEntity)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(|(model, role)| user::into_domain(model, role)))
    }
}

#[async_trait]
impl BaseRepository<User, i64> for PostgresUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        self.find_one(user::Column::Id.eq(id)).await
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        self.find_one(user::Column::Username.eq(username)).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        self.find_one(user::Column::Email.eq(email)).await
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let model = user::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            hashed_password: Set(new_user.password_hash),
            role_id: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err)?;

        Ok(user::into_domain(model, None))
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<(), RepoError> {
        let result = UserEntity::update_many()
            .col_expr(
                user::Column::HashedPassword,
                Expr::value(password_hash.to_string()),
            )
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(write_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn assign_role(&self, user_id: i64, role_id: i64) -> Result<User, RepoError> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::RoleId, Expr::value(role_id))
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(write_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        self.find_by_id(user_id).await?.ok_or(RepoError::NotFound)
    }
}

/// PostgreSQL password recovery token repository.
pub struct PostgresRecoveryTokenRepository {
    db: DbConn,
}

impl PostgresRecoveryTokenRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecoveryTokenRepository for PostgresRecoveryTokenRepository {
    async fn create(
        &self,
        email: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepoError> {
        recovery_token::ActiveModel {
            email: Set(email.to_string()),
            recovery_token: Set(token.to_string()),
            expires_at: Set(expires_at.fixed_offset()),
            used: Set(false),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(write_err)?;

        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<PasswordRecoveryToken>, RepoError> {
        let result = RecoveryTokenEntity::find()
            .filter(recovery_token::Column::RecoveryToken.eq(token))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn consume(&self, token: &str) -> Result<bool, RepoError> {
        let result = RecoveryTokenEntity::update_many()
            .col_expr(recovery_token::Column::Used, Expr::value(true))
            .filter(recovery_token::Column::RecoveryToken.eq(token))
            .filter(recovery_token::Column::Used.eq(false))
            .exec(&self.db)
            .await
            .map_err(write_err)?;

        Ok(result.rows_affected > 0)
    }

    async fn redeem(
        &self,
        token: &str,
        user_id: i64,
        password_hash: &str,
    ) -> Result<bool, RepoError> {
        let txn = self.db.begin().await.map_err(query_err)?;

        // Conditional update: only one concurrent redeemer can flip `used`.
        let consumed = RecoveryTokenEntity::update_many()
            .col_expr(recovery_token::Column::Used, Expr::value(true))
            .filter(recovery_token::Column::RecoveryToken.eq(token))
            .filter(recovery_token::Column::Used.eq(false))
            .exec(&txn)
            .await
            .map_err(write_err)?;

        if consumed.rows_affected == 0 {
            txn.rollback().await.map_err(query_err)?;
            return Ok(false);
        }

        let updated = UserEntity::update_many()
            .col_expr(
                user::Column::HashedPassword,
                Expr::value(password_hash.to_string()),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(&txn)
            .await
            .map_err(write_err)?;

        if updated.rows_affected == 0 {
            txn.rollback().await.map_err(query_err)?;
            return Ok(false);
        }

        txn.commit().await.map_err(query_err)?;
        Ok(true)
    }
}
