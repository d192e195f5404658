use async_trait::async_trait;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

use expo_tab_entities::prelude::*;

use super::base::ActionTrait;

/// Judge appeal on a submitted cell. Sets the request flag on every row
/// of the cell; the flag only comes off again through
/// [`super::ApproveUnlockAction`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestUnlockAction {
    pub judge_id: Uuid,
    pub participant_id: Uuid,
}

#[async_trait]
impl ActionTrait for RequestUnlockAction {
    async fn get_changes<C>(self, db: &C) -> Result<EntityGroup, anyhow::Error> where C: sea_orm::ConnectionTrait {
        let mut card = Scorecard::try_load(db, self.judge_id, self.participant_id).await?
            .ok_or(ScoreLedgerError::CellNotFound)?;

        card.request_unlock()?;

        Ok(EntityGroup::new_with_entities(
            card.entries.into_iter().map(Entity::Score).collect()
        ))
    }
}
