use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240118_000001_create_table"
    }
}


#[derive(Iden)]
pub enum Competition {
    Table,
    Uuid,
    Name,
    Status,
}

#[derive(Iden)]
pub enum Criterion {
    Table,
    Uuid,
    CompetitionId,
    Name,
    WeightPercentage,
}

#[derive(Iden)]
pub enum Participant {
    Table,
    Uuid,
    CompetitionId,
    RealName,
    BoothCode,
}

#[derive(Iden)]
pub enum Judge {
    Table,
    Uuid,
    CompetitionId,
    Name,
}

#[derive(Iden)]
pub enum Score {
    Table,
    Uuid,
    CompetitionId,
    JudgeId,
    ParticipantId,
    CriterionId,
    Value,
    IsLocked,
}


#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
        .create_table(
            sea_query::Table::create()
                .table(Competition::Table)
                .if_not_exists()
                .col(ColumnDef::new(Competition::Uuid).uuid().not_null().primary_key())
                .col(ColumnDef::new(Competition::Name).string().not_null())
                .col(ColumnDef::new(Competition::Status).string().not_null())
                .to_owned()
        ).await?;

        manager
        .create_table(
            sea_query::Table::create()
                .table(Criterion::Table)
                .if_not_exists()
                .col(ColumnDef::new(Criterion::Uuid).uuid().not_null().primary_key())
                .col(ColumnDef::new(Criterion::CompetitionId).uuid().not_null())
                .col(ColumnDef::new(Criterion::Name).string().not_null())
                .col(ColumnDef::new(Criterion::WeightPercentage).double().not_null())
                .foreign_key(
                    ForeignKeyCreateStatement::new()
                        .name("fk-criterion-competition")
                        .from_tbl(Criterion::Table)
                        .from_col(Criterion::CompetitionId)
                        .to_tbl(Competition::Table)
                        .to_col(Competition::Uuid)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager
        .create_table(
            sea_query::Table::create()
                .table(Participant::Table)
                .if_not_exists()
                .col(ColumnDef::new(Participant::Uuid).uuid().not_null().primary_key())
                .col(ColumnDef::new(Participant::CompetitionId).uuid().not_null())
                .col(ColumnDef::new(Participant::RealName).string().not_null())
                .col(ColumnDef::new(Participant::BoothCode).string().not_null())
                .foreign_key(
                    ForeignKeyCreateStatement::new()
                        .name("fk-participant-competition")
                        .from_tbl(Participant::Table)
                        .from_col(Participant::CompetitionId)
                        .to_tbl(Competition::Table)
                        .to_col(Competition::Uuid)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager
        .create_index(
            sea_query::Index::create()
                .name("idx-participant-booth-code")
                .table(Participant::Table)
                .col(Participant::CompetitionId)
                .col(Participant::BoothCode)
                .unique()
                .to_owned()
        ).await?;

        manager
        .create_table(
            sea_query::Table::create()
                .table(Judge::Table)
                .if_not_exists()
                .col(ColumnDef::new(Judge::Uuid).uuid().not_null().primary_key())
                .col(ColumnDef::new(Judge::CompetitionId).uuid().not_null())
                .col(ColumnDef::new(Judge::Name).string().not_null())
                .foreign_key(
                    ForeignKeyCreateStatement::new()
                        .name("fk-judge-competition")
                        .from_tbl(Judge::Table)
                        .from_col(Judge::CompetitionId)
                        .to_tbl(Competition::Table)
                        .to_col(Competition::Uuid)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager
        .create_table(
            sea_query::Table::create()
                .table(Score::Table)
                .if_not_exists()
                .col(ColumnDef::new(Score::Uuid).uuid().not_null().primary_key())
                .col(ColumnDef::new(Score::CompetitionId).uuid().not_null())
                .col(ColumnDef::new(Score::JudgeId).uuid().not_null())
                .col(ColumnDef::new(Score::ParticipantId).uuid().not_null())
                .col(ColumnDef::new(Score::CriterionId).uuid().not_null())
                .col(ColumnDef::new(Score::Value).double().not_null())
                .col(ColumnDef::new(Score::IsLocked).boolean().not_null().default(false))
                .foreign_key(
                    ForeignKeyCreateStatement::new()
                        .name("fk-score-competition")
                        .from_tbl(Score::Table)
                        .from_col(Score::CompetitionId)
                        .to_tbl(Competition::Table)
                        .to_col(Competition::Uuid)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKeyCreateStatement::new()
                        .name("fk-score-judge")
                        .from_tbl(Score::Table)
                        .from_col(Score::JudgeId)
                        .to_tbl(Judge::Table)
                        .to_col(Judge::Uuid)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKeyCreateStatement::new()
                        .name("fk-score-participant")
                        .from_tbl(Score::Table)
                        .from_col(Score::ParticipantId)
                        .to_tbl(Participant::Table)
                        .to_col(Participant::Uuid)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .foreign_key(
                    ForeignKeyCreateStatement::new()
                        .name("fk-score-criterion")
                        .from_tbl(Score::Table)
                        .from_col(Score::CriterionId)
                        .to_tbl(Criterion::Table)
                        .to_col(Criterion::Uuid)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager
        .create_index(
            sea_query::Index::create()
                .name("idx-score-cell")
                .table(Score::Table)
                .col(Score::JudgeId)
                .col(Score::ParticipantId)
                .col(Score::CriterionId)
                .unique()
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Score::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Judge::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Participant::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Criterion::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Competition::Table).to_owned()).await?;

        Ok(())
    }
}
