use async_trait::async_trait;
use rand::Rng;
use sea_orm::{prelude::*, ActiveValue, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::schema;
use crate::utilities::BatchLoad;
use crate::utilities::BatchLoadError;

use super::entity::{CompetitionEntity, LoadEntity};

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct Participant {
    pub uuid: Uuid,
    pub competition_id: Uuid,
    pub real_name: String,
    pub alias: Option<String>,
    pub booth_code: String,
}

impl Participant {
    fn from_model(model: schema::participant::Model) -> Self {
        Participant {
            uuid: model.uuid,
            competition_id: model.competition_id,
            real_name: model.real_name,
            alias: model.alias,
            booth_code: model.booth_code,
        }
    }

    pub async fn get_many<C>(db: &C, uuids: Vec<Uuid>) -> Result<Vec<Participant>, BatchLoadError> where C: ConnectionTrait {
        let participants = schema::participant::Entity::batch_load_all(db, uuids).await?;
        Ok(participants.into_iter().map(Self::from_model).collect())
    }

    pub async fn get_all_in_competition<C>(db: &C, competition_id: Uuid) -> Result<Vec<Participant>, DbErr> where C: ConnectionTrait {
        let participants = schema::participant::Entity::find()
            .filter(schema::participant::Column::CompetitionId.eq(competition_id))
            .order_by_asc(schema::participant::Column::BoothCode)
            .all(db).await?;
        Ok(participants.into_iter().map(Self::from_model).collect())
    }

    /// Booth codes are stored uppercase; the lookup normalizes its input
    /// so scanner and hand-typed entry behave the same.
    pub async fn get_by_booth_code<C>(db: &C, competition_id: Uuid, booth_code: &str) -> Result<Option<Participant>, DbErr> where C: ConnectionTrait {
        let participant = schema::participant::Entity::find()
            .filter(schema::participant::Column::CompetitionId.eq(competition_id))
            .filter(schema::participant::Column::BoothCode.eq(booth_code.to_uppercase()))
            .one(db).await?;
        Ok(participant.map(Self::from_model))
    }
}

#[async_trait]
impl LoadEntity for Participant {
    async fn try_get<C>(db: &C, uuid: Uuid) -> Result<Option<Self>, anyhow::Error> where C: ConnectionTrait {
        let model = schema::participant::Entity::find_by_id(uuid).one(db).await?;
        Ok(model.map(Self::from_model))
    }
}

#[async_trait]
impl CompetitionEntity for Participant {
    async fn save<C>(&self, db: &C, guarantee_insert: bool) -> Result<(), anyhow::Error> where C: ConnectionTrait {
        let model = schema::participant::ActiveModel {
            uuid: ActiveValue::Set(self.uuid),
            competition_id: ActiveValue::Set(self.competition_id),
            real_name: ActiveValue::Set(self.real_name.clone()),
            alias: ActiveValue::Set(self.alias.clone()),
            booth_code: ActiveValue::Set(self.booth_code.to_uppercase()),
        };
        if guarantee_insert {
            model.insert(db).await?;
        }
        else {
            let existing_model = schema::participant::Entity::find_by_id(self.uuid).one(db).await?;
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

const ALIAS_PREFIXES: &[&str] = &["Neon", "Cyber", "Iron", "Shadow", "Crimson", "Azure", "Golden", "Electric", "Quantum", "Hyper"];
const ALIAS_NOUNS: &[&str] = &["Tiger", "Eagle", "Falcon", "Wolf", "Phoenix", "Dragon", "Viper", "Storm", "Glitch", "Spark"];

/// Anonymous display alias in the style shown on public scoreboards,
/// e.g. "Team NeonTiger-42".
pub fn random_alias() -> String {
    let mut rng = rand::thread_rng();
    let prefix = ALIAS_PREFIXES[rng.gen_range(0..ALIAS_PREFIXES.len())];
    let noun = ALIAS_NOUNS[rng.gen_range(0..ALIAS_NOUNS.len())];
    let number = rng.gen_range(1..=99);
    format!("Team {}{}-{}", prefix, noun, number)
}


#[test]
fn test_random_alias_shape() {
    let alias = random_alias();
    assert!(alias.starts_with("Team "));
    assert!(alias.contains('-'));
}
