use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Score {
    Table,
    UnlockRequested
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                TableAlterStatement::new()
                    .table(Score::Table)
                    .add_column(ColumnDef::new(Score::UnlockRequested).not_null().boolean().default(false))
                    .to_owned()
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                TableAlterStatement::new()
                    .table(Score::Table)
                    .drop_column(Score::UnlockRequested)
                    .to_owned()
            )
            .await
    }
}
