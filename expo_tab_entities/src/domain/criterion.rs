use async_trait::async_trait;
use sea_orm::{prelude::*, ActiveValue};
use serde::{Deserialize, Serialize};

use crate::schema;
use crate::utilities::BatchLoadError;
use crate::utilities::BatchLoad;

use super::entity::{CompetitionEntity, LoadEntity};

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Criterion {
    pub uuid: Uuid,
    pub competition_id: Uuid,
    pub name: String,
    pub weight_percentage: f64,
}

impl Criterion {
    fn from_model(model: schema::criterion::Model) -> Self {
        Criterion {
            uuid: model.uuid,
            competition_id: model.competition_id,
            name: model.name,
            weight_percentage: model.weight_percentage,
        }
    }

    pub async fn get_many<C>(db: &C, uuids: Vec<Uuid>) -> Result<Vec<Criterion>, BatchLoadError> where C: ConnectionTrait {
        let criteria = schema::criterion::Entity::batch_load_all(db, uuids).await?;
        Ok(criteria.into_iter().map(Self::from_model).collect())
    }

    pub async fn get_all_in_competition<C>(db: &C, competition_id: Uuid) -> Result<Vec<Criterion>, DbErr> where C: ConnectionTrait {
        let criteria = schema::criterion::Entity::find()
            .filter(schema::criterion::Column::CompetitionId.eq(competition_id))
            .all(db).await?;
        Ok(criteria.into_iter().map(Self::from_model).collect())
    }
}

#[async_trait]
impl LoadEntity for Criterion {
    async fn try_get<C>(db: &C, uuid: Uuid) -> Result<Option<Self>, anyhow::Error> where C: ConnectionTrait {
        let model = schema::criterion::Entity::find_by_id(uuid).one(db).await?;
        Ok(model.map(Self::from_model))
    }
}

#[async_trait]
impl CompetitionEntity for Criterion {
    async fn save<C>(&self, db: &C, guarantee_insert: bool) -> Result<(), anyhow::Error> where C: ConnectionTrait {
        let model = schema::criterion::ActiveModel {
            uuid: ActiveValue::Set(self.uuid),
            competition_id: ActiveValue::Set(self.competition_id),
            name: ActiveValue::Set(self.name.clone()),
            weight_percentage: ActiveValue::Set(self.weight_percentage),
        };
        if guarantee_insert {
            model.insert(db).await?;
        }
        else {
            let existing_model = schema::criterion::Entity::find_by_id(self.uuid).one(db).await?;
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
