use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Spendings::Table)
                    .add_column(ColumnDef::new(Spendings::Label).string_len(100))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Spendings::Table)
                    .drop_column(Spendings::Label)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum Spendings {
    Table,
    Label,
}
