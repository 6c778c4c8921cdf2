use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Spendings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Spendings::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Spendings::UserId).integer().not_null())
                    .col(ColumnDef::new(Spendings::Amount).double().not_null())
                    .col(
                        ColumnDef::new(Spendings::Category)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Spendings::Location)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Spendings::Description).text())
                    .col(ColumnDef::new(Spendings::Date).date().not_null())
                    .col(ColumnDef::new(Spendings::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Spendings::UpdatedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-spendings-user_id")
                            .from(Spendings::Table, Spendings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-spendings-user_id-date")
                    .table(Spendings::Table)
                    .col(Spendings::UserId)
                    .col(Spendings::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Spendings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Spendings {
    Table,
    Id,
    UserId,
    Amount,
    Category,
    Location,
    Description,
    Date,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
