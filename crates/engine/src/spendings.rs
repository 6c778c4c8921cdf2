//! Spendings table.
//!
//! A row is a historical record: `amount` is pre-converted into the owning
//! user's display currency at write time, while `original_amount` and
//! `original_currency` preserve what was entered. The pair only changes
//! through an explicit update or a bulk re-conversion.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "spendings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    /// `round(original_amount * exchange_rate, 2)`, or `original_amount`
    /// when the currencies match.
    pub amount: f64,
    pub original_amount: f64,
    pub original_currency: String,
    pub display_currency: String,
    pub exchange_rate: f64,
    pub category: String,
    pub location: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Free-form grouping tag, independent of `category`.
    pub label: Option<String>,
    pub date: Date,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
