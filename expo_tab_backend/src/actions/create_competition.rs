use async_trait::async_trait;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

use expo_tab_entities::prelude::*;

use super::base::{ActionError, ActionTrait};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Organizer action: creates a competition in `setup` state together with
/// its full scoring rubric. The weight sum is checked here and only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompetitionAction {
    pub name: String,
    pub criteria: Vec<CriterionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionSpec {
    pub name: String,
    pub weight_percentage: f64,
}

#[async_trait]
impl ActionTrait for CreateCompetitionAction {
    async fn get_changes<C>(self, _db: &C) -> Result<EntityGroup, anyhow::Error> where C: sea_orm::ConnectionTrait {
        let total: f64 = self.criteria.iter().map(|c| c.weight_percentage).sum();
        if (total - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ActionError::InvalidWeightConfiguration { total }.into());
        }

        let competition = Competition::new(self.name);
        let competition_id = competition.uuid;

        let mut groups = EntityGroup::new();
        groups.add(Entity::Competition(competition));
        for spec in self.criteria {
            groups.add(Entity::Criterion(Criterion {
                uuid: Uuid::new_v4(),
                competition_id,
                name: spec.name,
                weight_percentage: spec.weight_percentage,
            }));
        }

        Ok(groups)
    }
}
