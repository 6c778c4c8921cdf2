//! Users table.
//!
//! `hashed_password` is an argon2 PHC string; it never leaves the engine
//! except through [`crate::password::verify`].

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub full_name: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_admin: bool,
    /// ISO 4217 code spendings are converted into at write time.
    pub preferred_currency: String,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::spendings::Entity")]
    Spendings,
}

impl Related<super::spendings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Spendings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
