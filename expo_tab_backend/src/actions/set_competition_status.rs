use async_trait::async_trait;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

use expo_tab_entities::domain::entity::LoadEntity;
use expo_tab_entities::prelude::*;

use super::base::ActionTrait;

/// Organizer lifecycle switch: setup -> live -> ended. Only `live`
/// competitions appear on the public feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetCompetitionStatusAction {
    pub competition_id: Uuid,
    pub status: CompetitionStatus,
}

#[async_trait]
impl ActionTrait for SetCompetitionStatusAction {
    async fn get_changes<C>(self, db: &C) -> Result<EntityGroup, anyhow::Error> where C: sea_orm::ConnectionTrait {
        let mut competition = Competition::get(db, self.competition_id).await?;
        competition.status = self.status;

        let mut groups = EntityGroup::new();
        groups.add(Entity::Competition(competition));
        Ok(groups)
    }
}
