use std::collections::HashMap;

use async_trait::async_trait;
use itertools::Itertools;

use sea_orm::prelude::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use expo_tab_entities::domain::criterion::Criterion;
use expo_tab_entities::domain::score::Scorecard;
use expo_tab_entities::matrix::round_score;
use expo_tab_entities::prelude::*;

use super::base::LoadedView;

/// The admin-facing live matrix of one competition, kept current by the
/// coordinator and re-read wholesale on every relevant change.
pub struct LoadedTabulationView {
    pub competition_uuid: Uuid,
    pub matrix: TabulationMatrix,
}

impl LoadedTabulationView {
    pub async fn load<C>(db: &C, competition_uuid: Uuid) -> Result<LoadedTabulationView, anyhow::Error> where C: sea_orm::ConnectionTrait {
        Ok(
            LoadedTabulationView {
                competition_uuid,
                matrix: TabulationMatrix::load_from_competition(db, competition_uuid).await?,
            }
        )
    }

    /// Audit detail for one (judge, participant) cell: every criterion of
    /// the competition with the raw entered value (0 when never entered),
    /// plus the cell's aggregate lock state.
    pub async fn inspect_cell<C>(&self, db: &C, judge_uuid: Uuid, participant_uuid: Uuid) -> Result<CellInspection, anyhow::Error> where C: sea_orm::ConnectionTrait {
        let criteria = Criterion::get_all_in_competition(db, self.competition_uuid).await?;
        let card = Scorecard::try_load(db, judge_uuid, participant_uuid).await?
            .unwrap_or_else(|| Scorecard::new(self.competition_uuid, judge_uuid, participant_uuid));

        let mut weighted_total = 0.0;
        let breakdown = criteria.iter().map(|criterion| {
            let value = card.value_for_criterion(criterion.uuid);
            if let Some(value) = value {
                weighted_total += value * criterion.weight_percentage / 100.0;
            }
            CriterionValue {
                criterion_uuid: criterion.uuid,
                name: criterion.name.clone(),
                value: value.unwrap_or(0.0),
            }
        }).collect_vec();

        Ok(CellInspection {
            judge_uuid,
            participant_uuid,
            breakdown,
            weighted_total: round_score(weighted_total),
            is_locked: card.is_locked(),
            unlock_requested: card.has_unlock_request(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellInspection {
    pub judge_uuid: Uuid,
    pub participant_uuid: Uuid,
    pub breakdown: Vec<CriterionValue>,
    pub weighted_total: f64,
    pub is_locked: bool,
    pub unlock_requested: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionValue {
    pub criterion_uuid: Uuid,
    pub name: String,
    pub value: f64,
}

#[async_trait]
impl LoadedView for LoadedTabulationView {
    async fn update_and_get_changes(&mut self, db: &DatabaseConnection, changes: &EntityChangeSummary) -> Result<Option<HashMap<String, serde_json::Value>>, anyhow::Error> {
        let relevant = changes.touches_competition(self.competition_uuid)
            && [EntityTypeId::Score, EntityTypeId::Criterion, EntityTypeId::Participant, EntityTypeId::Judge]
                .into_iter()
                .any(|t| changes.has_changes_for_type(t));

        if relevant {
            self.matrix = TabulationMatrix::load_from_competition(db, self.competition_uuid).await?;

            let mut out = HashMap::new();
            out.insert(".".to_string(), serde_json::to_value(&self.matrix)?);

            Ok(Some(out))
        }
        else {
            Ok(None)
        }
    }

    async fn view_string(&self) -> Result<String, anyhow::Error> {
        Ok(serde_json::to_string(&self.matrix)?)
    }
}
