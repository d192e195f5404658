use async_trait::async_trait;
use thiserror::Error;

use expo_tab_entities::prelude::*;

#[derive(Debug, Error)]
pub enum ActionError {
    /// Criteria weights of a competition must sum to 100 when the rubric
    /// is created. Stored weights are never re-validated afterwards.
    #[error("criteria weights must sum to 100, got {total}")]
    InvalidWeightConfiguration { total: f64 },
    #[error("entity does not belong to the given competition")]
    MismatchedCompetition,
    #[error("criterion {0} does not belong to the given competition")]
    UnknownCriterion(sea_orm::prelude::Uuid),
}

#[async_trait]
pub trait ActionTrait {
    async fn get_changes<C>(self, db: &C) -> Result<EntityGroup, anyhow::Error> where C: sea_orm::ConnectionTrait;
}
