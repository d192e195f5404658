use async_trait::async_trait;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

use expo_tab_entities::domain::criterion::Criterion;
use expo_tab_entities::domain::entity::LoadEntity;
use expo_tab_entities::prelude::*;

use super::base::{ActionError, ActionTrait};

/// Judge entry for one whole cell: every criterion value in one write,
/// optionally locking the cell as the final submit. The ledger rejects
/// the write if the cell was already submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitScorecardAction {
    pub competition_id: Uuid,
    pub judge_id: Uuid,
    pub participant_id: Uuid,
    pub values: Vec<CriterionScore>,
    pub lock: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion_id: Uuid,
    pub value: f64,
}

#[async_trait]
impl ActionTrait for SubmitScorecardAction {
    async fn get_changes<C>(self, db: &C) -> Result<EntityGroup, anyhow::Error> where C: sea_orm::ConnectionTrait {
        let judge = Judge::get(db, self.judge_id).await?;
        let participant = Participant::get(db, self.participant_id).await?;
        if judge.competition_id != self.competition_id || participant.competition_id != self.competition_id {
            return Err(ActionError::MismatchedCompetition.into());
        }

        let criteria = Criterion::get_all_in_competition(db, self.competition_id).await?;

        let mut card = Scorecard::load_or_new(db, self.competition_id, self.judge_id, self.participant_id).await?;
        for entry in &self.values {
            if !criteria.iter().any(|c| c.uuid == entry.criterion_id) {
                return Err(ActionError::UnknownCriterion(entry.criterion_id).into());
            }
            card.set_value(entry.criterion_id, entry.value)?;
        }

        if self.lock {
            card.lock()?;
        }

        Ok(EntityGroup::new_with_entities(
            card.entries.into_iter().map(Entity::Score).collect()
        ))
    }
}
