//! Password recovery token entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "auth_password_recovery_token")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub email: String,
    #[sea_orm(unique, column_type = "Text")]
    pub recovery_token: String,
    pub expires_at: DateTimeWithTimeZone,
    pub used: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for tollgate_core::domain::PasswordRecoveryToken {
    fn from(model: Model) -> Self {
        Self {
            token: model.recovery_token,
            email: model.email,
            expires_at: model.expires_at.into(),
            used: model.used,
        }
    }
}
