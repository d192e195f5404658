use sea_orm_migration::prelude::*;
pub use sea_orm_migration::prelude::{MigrationTrait, MigratorTrait};

mod m20240118_000001_create_table;
mod m20240309_121500_add_participant_alias;
mod m20240506_183000_add_score_unlock_request;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240118_000001_create_table::Migration),
            Box::new(m20240309_121500_add_participant_alias::Migration),
            Box::new(m20240506_183000_add_score_unlock_request::Migration),
        ]
    }
}
