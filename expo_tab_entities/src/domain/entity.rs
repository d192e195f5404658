use async_trait::async_trait;
use sea_orm::{prelude::Uuid, ConnectionTrait};

#[async_trait]
pub trait CompetitionEntity: Send + Sync {
    async fn save<C>(&self, db: &C, guarantee_insert: bool) -> Result<(), anyhow::Error> where C: ConnectionTrait;

    async fn get_competition<C>(&self, db: &C) -> Result<Option<Uuid>, anyhow::Error> where C: ConnectionTrait;
}

#[async_trait]
pub trait LoadEntity: Sized {
    async fn try_get<C>(db: &C, uuid: Uuid) -> Result<Option<Self>, anyhow::Error> where C: ConnectionTrait;

    async fn get<C>(db: &C, uuid: Uuid) -> Result<Self, anyhow::Error> where C: ConnectionTrait {
        Self::try_get(db, uuid).await?.ok_or_else(|| anyhow::anyhow!("Entity {} does not exist", uuid))
    }
}
