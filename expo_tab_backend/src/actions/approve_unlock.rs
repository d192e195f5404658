use async_trait::async_trait;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

use expo_tab_entities::prelude::*;

use super::base::ActionTrait;

/// Admin grant: reopens one judge's scorecard for one participant by
/// clearing the lock and any pending request on every criterion row of
/// the cell. Idempotent; approving a cell with no rows is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveUnlockAction {
    pub judge_id: Uuid,
    pub participant_id: Uuid,
}

#[async_trait]
impl ActionTrait for ApproveUnlockAction {
    async fn get_changes<C>(self, db: &C) -> Result<EntityGroup, anyhow::Error> where C: sea_orm::ConnectionTrait {
        let card = Scorecard::try_load(db, self.judge_id, self.participant_id).await?;

        let mut groups = EntityGroup::new();
        if let Some(mut card) = card {
            card.approve_unlock();
            card.entries.into_iter().for_each(|s| groups.add(Entity::Score(s)));
        }

        Ok(groups)
    }
}
