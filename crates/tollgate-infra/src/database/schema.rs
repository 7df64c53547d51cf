//! Table bootstrap for a fresh database.

use sea_orm::{ConnectionTrait, DbConn, DbErr, EntityTrait, Schema};

use super::entity::{recovery_token, role, user};

/// Create the role, user and recovery token tables when they do not exist yet.
pub async fn create_tables(db: &DbConn) -> Result<(), DbErr> {
    create_table(db, role::Entity).await?;
    create_table(db, user::Entity).await?;
    create_table(db, recovery_token::Entity).await?;

    tracing::info!("Database schema ready");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DbConn, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut stmt = Schema::new(backend).create_table_from_entity(entity);
    stmt.if_not_exists();

    db.execute(backend.build(&stmt)).await?;
    Ok(())
}
