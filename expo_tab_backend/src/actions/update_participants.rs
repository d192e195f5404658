use async_trait::async_trait;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

use expo_tab_entities::prelude::*;

use super::base::{ActionError, ActionTrait};

/// Organizer roster maintenance: upsert and delete participants of one
/// competition in a single batch. Deleting a participant takes all of
/// their score rows with it via the store's cascade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateParticipantsAction {
    pub competition_id: Uuid,
    pub updated_participants: Vec<Participant>,
    pub deleted_participants: Vec<Uuid>,
}

#[async_trait]
impl ActionTrait for UpdateParticipantsAction {
    async fn get_changes<C>(self, _db: &C) -> Result<EntityGroup, anyhow::Error> where C: sea_orm::ConnectionTrait {
        let mut groups = EntityGroup::new();

        for participant in self.updated_participants {
            if participant.competition_id != self.competition_id {
                return Err(ActionError::MismatchedCompetition.into());
            }
            groups.add(Entity::Participant(participant));
        }

        for uuid in self.deleted_participants {
            groups.delete(EntityTypeId::Participant, uuid);
        }

        Ok(groups)
    }
}
