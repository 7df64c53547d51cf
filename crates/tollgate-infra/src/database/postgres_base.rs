use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{DbConn, DbErr, EntityTrait, PrimaryKeyTrait, SqlErr};

use tollgate_core::error::RepoError;
use tollgate_core::ports::BaseRepository;

/// Generic PostgreSQL repository for entities that map one row to one domain value.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: DbConn,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: DbConn) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E, T, ID> BaseRepository<T, ID> for PostgresBaseRepository<E>
where
    E: EntityTrait,
    E::Model: Sync + Send,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    ID: Send + Sync + Into<sea_orm::Value> + Clone + 'static,
    T: From<E::Model> + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError> {
        let result = E::find_by_id(id).one(&self.db).await.map_err(query_err)?;

        Ok(result.map(Into::into))
    }
}

pub(crate) fn query_err(e: DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

/// Map a write error, surfacing unique violations as constraint errors.
pub(crate) fn write_err(e: DbErr) -> RepoError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => RepoError::Constraint(detail),
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => RepoError::Constraint(detail),
        _ => RepoError::Query(e.to_string()),
    }
}
