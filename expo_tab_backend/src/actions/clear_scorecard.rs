use async_trait::async_trait;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

use expo_tab_entities::prelude::*;

use super::base::ActionTrait;

/// Admin reset: removes every score row of one (judge, participant) cell,
/// forcing a complete re-score. Also used to reject an unlock request
/// outright.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearScorecardAction {
    pub judge_id: Uuid,
    pub participant_id: Uuid,
}

#[async_trait]
impl ActionTrait for ClearScorecardAction {
    async fn get_changes<C>(self, db: &C) -> Result<EntityGroup, anyhow::Error> where C: sea_orm::ConnectionTrait {
        let card = Scorecard::try_load(db, self.judge_id, self.participant_id).await?;

        let mut groups = EntityGroup::new();
        if let Some(card) = card {
            for entry in card.entries {
                groups.delete(EntityTypeId::Score, entry.uuid);
            }
        }

        Ok(groups)
    }
}
