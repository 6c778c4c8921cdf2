//! Multi-currency support.
//!
//! Users gain a preferred display currency; spendings keep the as-entered
//! amount/currency next to the converted one. Rows written before this
//! migration are backfilled as already-USD with a rate of 1.0.

use sea_orm::{ConnectionTrait, DbBackend};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .add_column(
                        ColumnDef::new(Users::PreferredCurrency)
                            .string_len(3)
                            .not_null()
                            .default("USD"),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Spendings::Table)
                    .add_column(ColumnDef::new(Spendings::OriginalAmount).double())
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Spendings::Table)
                    .add_column(ColumnDef::new(Spendings::OriginalCurrency).string_len(3))
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Spendings::Table)
                    .add_column(ColumnDef::new(Spendings::DisplayCurrency).string_len(3))
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Spendings::Table)
                    .add_column(ColumnDef::new(Spendings::ExchangeRate).double())
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        db.execute_unprepared(
            "UPDATE spendings \
             SET original_amount = amount, \
                 original_currency = 'USD', \
                 display_currency = 'USD', \
                 exchange_rate = 1.0 \
             WHERE original_amount IS NULL",
        )
        .await?;

        // SQLite cannot alter a column to NOT NULL; the entities always
        // write these fields, so the constraint only gets enforced where
        // the backend supports it.
        if manager.get_database_backend() != DbBackend::Sqlite {
            db.execute_unprepared(
                "ALTER TABLE spendings ALTER COLUMN original_amount SET NOT NULL",
            )
            .await?;
            db.execute_unprepared(
                "ALTER TABLE spendings ALTER COLUMN original_currency SET NOT NULL",
            )
            .await?;
            db.execute_unprepared(
                "ALTER TABLE spendings ALTER COLUMN display_currency SET NOT NULL",
            )
            .await?;
            db.execute_unprepared("ALTER TABLE spendings ALTER COLUMN exchange_rate SET NOT NULL")
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Spendings::Table)
                    .drop_column(Spendings::ExchangeRate)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Spendings::Table)
                    .drop_column(Spendings::DisplayCurrency)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Spendings::Table)
                    .drop_column(Spendings::OriginalCurrency)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Spendings::Table)
                    .drop_column(Spendings::OriginalAmount)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Users::Table)
                    .drop_column(Users::PreferredCurrency)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Users {
    Table,
    PreferredCurrency,
}

#[derive(Iden)]
enum Spendings {
    Table,
    OriginalAmount,
    OriginalCurrency,
    DisplayCurrency,
    ExchangeRate,
}
