use async_trait::async_trait;
use sea_orm::{prelude::*, ActiveValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema;

use super::entity::{CompetitionEntity, LoadEntity};

#[derive(Debug, Error)]
pub enum ScoreLedgerError {
    /// The cell was submitted; the judge must go through the
    /// unlock-request/approval cycle before editing again.
    #[error("scorecard cell is locked")]
    CellLocked,
    #[error("scorecard cell is not locked")]
    CellNotLocked,
    #[error("no scores have been entered for this cell")]
    CellNotFound,
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// One judge's value for one participant on one criterion, together with
/// its mutability state. At most one live row exists per
/// (judge, participant, criterion) key.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Score {
    pub uuid: Uuid,
    pub competition_id: Uuid,
    pub judge_id: Uuid,
    pub participant_id: Uuid,
    pub criterion_id: Uuid,
    pub value: f64,
    pub is_locked: bool,
    pub unlock_requested: bool,
}

impl Score {
    pub fn from_model(model: schema::score::Model) -> Self {
        Score {
            uuid: model.uuid,
            competition_id: model.competition_id,
            judge_id: model.judge_id,
            participant_id: model.participant_id,
            criterion_id: model.criterion_id,
            value: model.value,
            is_locked: model.is_locked,
            unlock_requested: model.unlock_requested,
        }
    }

    pub async fn get_all_in_competition<C>(db: &C, competition_id: Uuid) -> Result<Vec<Score>, DbErr> where C: ConnectionTrait {
        let scores = schema::score::Entity::find()
            .filter(schema::score::Column::CompetitionId.eq(competition_id))
            .all(db).await?;
        Ok(scores.into_iter().map(Self::from_model).collect())
    }

    pub async fn get_all_for_judge<C>(db: &C, judge_id: Uuid) -> Result<Vec<Score>, DbErr> where C: ConnectionTrait {
        let scores = schema::score::Entity::find()
            .filter(schema::score::Column::JudgeId.eq(judge_id))
            .all(db).await?;
        Ok(scores.into_iter().map(Self::from_model).collect())
    }
}

#[async_trait]
impl LoadEntity for Score {
    async fn try_get<C>(db: &C, uuid: Uuid) -> Result<Option<Self>, anyhow::Error> where C: ConnectionTrait {
        let model = schema::score::Entity::find_by_id(uuid).one(db).await?;
        Ok(model.map(Self::from_model))
    }
}

#[async_trait]
impl CompetitionEntity for Score {
    async fn save<C>(&self, db: &C, guarantee_insert: bool) -> Result<(), anyhow::Error> where C: ConnectionTrait {
        let model = schema::score::ActiveModel {
            uuid: ActiveValue::Set(self.uuid),
            competition_id: ActiveValue::Set(self.competition_id),
            judge_id: ActiveValue::Set(self.judge_id),
            participant_id: ActiveValue::Set(self.participant_id),
            criterion_id: ActiveValue::Set(self.criterion_id),
            value: ActiveValue::Set(self.value),
            is_locked: ActiveValue::Set(self.is_locked),
            unlock_requested: ActiveValue::Set(self.unlock_requested),
        };
        if guarantee_insert {
            model.insert(db).await?;
        }
        else {
            let existing_model = schema::score::Entity::find_by_id(self.uuid).one(db).await?;
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

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ScorecardStatus {
    Pending,
    InProgress,
    Completed,
}

/// All score rows of one judge for one participant. Locking, unlock
/// requests and approvals operate on this whole cell, never on a single
/// criterion row.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Scorecard {
    pub competition_id: Uuid,
    pub judge_id: Uuid,
    pub participant_id: Uuid,
    pub entries: Vec<Score>,
}

impl Scorecard {
    pub fn new(competition_id: Uuid, judge_id: Uuid, participant_id: Uuid) -> Self {
        Scorecard {
            competition_id,
            judge_id,
            participant_id,
            entries: vec![],
        }
    }

    pub async fn try_load<C>(db: &C, judge_id: Uuid, participant_id: Uuid) -> Result<Option<Scorecard>, DbErr> where C: ConnectionTrait {
        let rows = schema::score::Entity::find()
            .filter(schema::score::Column::JudgeId.eq(judge_id))
            .filter(schema::score::Column::ParticipantId.eq(participant_id))
            .all(db).await?;

        if rows.is_empty() {
            return Ok(None);
        }

        let competition_id = rows[0].competition_id;
        Ok(Some(Scorecard {
            competition_id,
            judge_id,
            participant_id,
            entries: rows.into_iter().map(Score::from_model).collect(),
        }))
    }

    pub async fn load_or_new<C>(db: &C, competition_id: Uuid, judge_id: Uuid, participant_id: Uuid) -> Result<Scorecard, DbErr> where C: ConnectionTrait {
        Ok(Self::try_load(db, judge_id, participant_id).await?
            .unwrap_or_else(|| Self::new(competition_id, judge_id, participant_id)))
    }

    /// A cell counts as locked as soon as any of its rows is locked.
    pub fn is_locked(&self) -> bool {
        self.entries.iter().any(|e| e.is_locked)
    }

    pub fn has_unlock_request(&self) -> bool {
        self.entries.iter().any(|e| e.unlock_requested)
    }

    pub fn status(&self) -> ScorecardStatus {
        if self.entries.is_empty() {
            ScorecardStatus::Pending
        }
        else if self.is_locked() {
            ScorecardStatus::Completed
        }
        else {
            ScorecardStatus::InProgress
        }
    }

    pub fn value_for_criterion(&self, criterion_id: Uuid) -> Option<f64> {
        self.entries.iter().find(|e| e.criterion_id == criterion_id).map(|e| e.value)
    }

    /// Judge entry. Overwrites the row for the criterion if one exists,
    /// creates it otherwise. Rejected once the cell is locked.
    pub fn set_value(&mut self, criterion_id: Uuid, value: f64) -> Result<(), ScoreLedgerError> {
        if self.is_locked() {
            return Err(ScoreLedgerError::CellLocked);
        }

        match self.entries.iter_mut().find(|e| e.criterion_id == criterion_id) {
            Some(entry) => {
                entry.value = value;
            },
            None => {
                self.entries.push(Score {
                    uuid: Uuid::new_v4(),
                    competition_id: self.competition_id,
                    judge_id: self.judge_id,
                    participant_id: self.participant_id,
                    criterion_id,
                    value,
                    is_locked: false,
                    unlock_requested: false,
                });
            }
        }

        Ok(())
    }

    /// Judge submit. From here on the cell is read-only to the judge.
    pub fn lock(&mut self) -> Result<(), ScoreLedgerError> {
        if self.entries.is_empty() {
            return Err(ScoreLedgerError::CellNotFound);
        }
        for entry in self.entries.iter_mut() {
            entry.is_locked = true;
        }
        Ok(())
    }

    /// Judge appeal. Only valid on a locked cell; asking twice is a no-op.
    /// The flag is only ever cleared again by [`Scorecard::approve_unlock`].
    pub fn request_unlock(&mut self) -> Result<(), ScoreLedgerError> {
        if self.entries.is_empty() {
            return Err(ScoreLedgerError::CellNotFound);
        }
        if !self.is_locked() {
            return Err(ScoreLedgerError::CellNotLocked);
        }
        for entry in self.entries.iter_mut() {
            entry.unlock_requested = true;
        }
        Ok(())
    }

    /// Admin grant. Reopens the whole cell for editing and clears any
    /// pending request on it.
    pub fn approve_unlock(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.is_locked = false;
            entry.unlock_requested = false;
        }
    }
}


#[cfg(test)]
fn make_card_with_values(values: Vec<(u128, f64)>) -> Scorecard {
    let mut card = Scorecard::new(Uuid::from_u128(1), Uuid::from_u128(3000), Uuid::from_u128(1000));
    for (criterion, value) in values {
        card.set_value(Uuid::from_u128(criterion), value).unwrap();
    }
    card
}

#[test]
fn test_submit_cycle_reaches_unlocked_again() {
    let mut card = make_card_with_values(vec![(200, 80.0), (201, 60.0)]);
    assert_eq!(card.status(), ScorecardStatus::InProgress);

    card.lock().unwrap();
    assert_eq!(card.status(), ScorecardStatus::Completed);

    card.request_unlock().unwrap();
    assert!(card.is_locked());
    assert!(card.has_unlock_request());

    card.approve_unlock();
    assert!(!card.is_locked());
    assert!(!card.has_unlock_request());
    assert!(card.entries.iter().all(|e| !e.is_locked && !e.unlock_requested));
}

#[test]
fn test_locked_cell_rejects_entry() {
    let mut card = make_card_with_values(vec![(200, 80.0)]);
    card.lock().unwrap();

    let result = card.set_value(Uuid::from_u128(200), 90.0);
    assert!(matches!(result, Err(ScoreLedgerError::CellLocked)));
    assert_eq!(card.value_for_criterion(Uuid::from_u128(200)), Some(80.0));
}

#[test]
fn test_unlock_request_requires_lock() {
    let mut card = make_card_with_values(vec![(200, 80.0)]);
    let result = card.request_unlock();
    assert!(matches!(result, Err(ScoreLedgerError::CellNotLocked)));
}

#[test]
fn test_unlock_request_is_idempotent() {
    let mut card = make_card_with_values(vec![(200, 80.0), (201, 60.0)]);
    card.lock().unwrap();
    card.request_unlock().unwrap();
    card.request_unlock().unwrap();
    assert!(card.entries.iter().all(|e| e.unlock_requested));
}

#[test]
fn test_entry_overwrites_existing_row_in_place() {
    let mut card = make_card_with_values(vec![(200, 80.0)]);
    let original_uuid = card.entries[0].uuid;

    card.set_value(Uuid::from_u128(200), 85.0).unwrap();
    assert_eq!(card.entries.len(), 1);
    assert_eq!(card.entries[0].uuid, original_uuid);
    assert_eq!(card.entries[0].value, 85.0);
}

#[test]
fn test_empty_cell_is_pending() {
    let card = Scorecard::new(Uuid::from_u128(1), Uuid::from_u128(3000), Uuid::from_u128(1000));
    assert_eq!(card.status(), ScorecardStatus::Pending);
    assert!(matches!(card.clone().lock(), Err(ScoreLedgerError::CellNotFound)));
}
