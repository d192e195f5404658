use async_trait::async_trait;
use sea_orm::{prelude::*, ActiveValue, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::schema;
use crate::utilities::BatchLoad;
use crate::utilities::BatchLoadError;

use super::entity::{CompetitionEntity, LoadEntity};

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct Judge {
    pub uuid: Uuid,
    pub competition_id: Uuid,
    pub name: String,
}

impl Judge {
    fn from_model(model: schema::judge::Model) -> Self {
        Judge {
            uuid: model.uuid,
            competition_id: model.competition_id,
            name: model.name,
        }
    }

    pub async fn get_many<C>(db: &C, uuids: Vec<Uuid>) -> Result<Vec<Judge>, BatchLoadError> where C: ConnectionTrait {
        let judges = schema::judge::Entity::batch_load_all(db, uuids).await?;
        Ok(judges.into_iter().map(Self::from_model).collect())
    }

    pub async fn get_all_in_competition<C>(db: &C, competition_id: Uuid) -> Result<Vec<Judge>, DbErr> where C: ConnectionTrait {
        let judges = schema::judge::Entity::find()
            .filter(schema::judge::Column::CompetitionId.eq(competition_id))
            .order_by_asc(schema::judge::Column::Name)
            .all(db).await?;
        Ok(judges.into_iter().map(Self::from_model).collect())
    }
}

#[async_trait]
impl LoadEntity for Judge {
    async fn try_get<C>(db: &C, uuid: Uuid) -> Result<Option<Self>, anyhow::Error> where C: ConnectionTrait {
        let model = schema::judge::Entity::find_by_id(uuid).one(db).await?;
        Ok(model.map(Self::from_model))
    }
}

#[async_trait]
impl CompetitionEntity for Judge {
    async fn save<C>(&self, db: &C, guarantee_insert: bool) -> Result<(), anyhow::Error> where C: ConnectionTrait {
        let model = schema::judge::ActiveModel {
            uuid: ActiveValue::Set(self.uuid),
            competition_id: ActiveValue::Set(self.competition_id),
            name: ActiveValue::Set(self.name.clone()),
        };
        if guarantee_insert {
            model.insert(db).await?;
        }
        else {
            let existing_model = schema::judge::Entity::find_by_id(self.uuid).one(db).await?;
            if existing_model.is_some() {
                model.update(db).await?;
            }
            else {
                model.insert(db).await?;
            }
        };

        Ok(())
    }

    async fn get_competition<C>(&self, _db: &C) -> Result<Option<Uuid>, anyhow::Error> where C: ConnectionTrait {
        Ok(Some(self.competition_id))
    }
}
