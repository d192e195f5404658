use std::{error::Error, fmt::Display, str::FromStr};

use async_trait::async_trait;
use sea_orm::{prelude::*, ActiveValue};
use serde::{Deserialize, Serialize};

use crate::schema;
use crate::utilities::{BatchLoad, BatchLoadError};

use super::entity::{CompetitionEntity, LoadEntity};

#[derive(Debug, PartialEq, Eq)]
pub enum CompetitionParseError {
    UnknownStatus(String),
    CompetitionDoesNotExist(Uuid),
    DbErr(DbErr),
}

impl Display for CompetitionParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{:?}", self))?;
        Ok(())
    }
}

impl Error for CompetitionParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CompetitionParseError::DbErr(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DbErr> for CompetitionParseError {
    fn from(value: DbErr) -> Self {
        CompetitionParseError::DbErr(value)
    }
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionStatus {
    Setup,
    Live,
    Ended,
}

impl FromStr for CompetitionStatus {
    type Err = CompetitionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "setup" => Ok(CompetitionStatus::Setup),
            "live" => Ok(CompetitionStatus::Live),
            "ended" => Ok(CompetitionStatus::Ended),
            _ => Err(CompetitionParseError::UnknownStatus(s.into())),
        }
    }
}

impl CompetitionStatus {
    pub fn to_str(&self) -> String {
        match self {
            CompetitionStatus::Setup => "setup".into(),
            CompetitionStatus::Live => "live".into(),
            CompetitionStatus::Ended => "ended".into(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct Competition {
    pub uuid: Uuid,
    pub name: String,
    pub status: CompetitionStatus,
}

impl Competition {
    pub fn new(name: String) -> Self {
        Competition {
            uuid: Uuid::new_v4(),
            name,
            status: CompetitionStatus::Setup,
        }
    }

    fn from_model(model: schema::competition::Model) -> Result<Self, CompetitionParseError> {
        Ok(Competition {
            uuid: model.uuid,
            name: model.name,
            status: model.status.parse()?,
        })
    }

    pub async fn get_many<C>(db: &C, uuids: Vec<Uuid>) -> Result<Vec<Competition>, CompetitionParseError> where C: ConnectionTrait {
        let competitions = schema::competition::Entity::batch_load_all(db, uuids.clone()).await.map_err(
            |e| match e {
                BatchLoadError::DbErr(e) => CompetitionParseError::DbErr(e),
                BatchLoadError::RowNotFound => CompetitionParseError::CompetitionDoesNotExist(uuids[0]),
            }
        )?;

        competitions.into_iter().map(Self::from_model).collect()
    }

    pub async fn get_all_with_status<C>(db: &C, status: CompetitionStatus) -> Result<Vec<Competition>, CompetitionParseError> where C: ConnectionTrait {
        let competitions = schema::competition::Entity::find()
            .filter(schema::competition::Column::Status.eq(status.to_str()))
            .all(db).await?;
        competitions.into_iter().map(Self::from_model).collect()
    }
}

#[async_trait]
impl LoadEntity for Competition {
    async fn try_get<C>(db: &C, uuid: Uuid) -> Result<Option<Self>, anyhow::Error> where C: ConnectionTrait {
        let model = schema::competition::Entity::find_by_id(uuid).one(db).await?;
        Ok(model.map(Self::from_model).transpose()?)
    }
}

#[async_trait]
impl CompetitionEntity for Competition {
    async fn save<C>(&self, db: &C, guarantee_insert: bool) -> Result<(), anyhow::Error> where C: ConnectionTrait {
        let model = schema::competition::ActiveModel {
            uuid: ActiveValue::Set(self.uuid),
            name: ActiveValue::Set(self.name.clone()),
            status: ActiveValue::Set(self.status.to_str()),
        };
        if guarantee_insert {
            model.insert(db).await?;
        }
        else {
            let existing_model = schema::competition::Entity::find_by_id(self.uuid).one(db).await?;
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
        Ok(Some(self.uuid))
    }
}


#[test]
fn test_status_round_trip() {
    for status in [CompetitionStatus::Setup, CompetitionStatus::Live, CompetitionStatus::Ended] {
        assert_eq!(status.to_str().parse::<CompetitionStatus>().unwrap(), status);
    }
}

#[test]
fn test_unknown_status_is_rejected() {
    let result = "paused".parse::<CompetitionStatus>();
    assert_eq!(result, Err(CompetitionParseError::UnknownStatus("paused".into())));
}
