pub use sea_orm_migration::prelude::*;

mod m20250801_000001_users;
mod m20250801_000002_spendings;
mod m20250815_000000_currency;
mod m20250831_000000_labels;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_000001_users::Migration),
            Box::new(m20250801_000002_spendings::Migration),
            Box::new(m20250815_000000_currency::Migration),
            Box::new(m20250831_000000_labels::Migration),
        ]
    }
}
