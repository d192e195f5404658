use serde::{Deserialize, Serialize};

use expo_tab_entities::prelude::*;

mod base;
mod submit_scorecard;
mod request_unlock;
mod approve_unlock;
mod clear_scorecard;
mod create_competition;
mod set_competition_status;
mod update_participants;

pub use self::base::{ActionError, ActionTrait};
pub use self::submit_scorecard::{CriterionScore, SubmitScorecardAction};
pub use self::request_unlock::RequestUnlockAction;
pub use self::approve_unlock::ApproveUnlockAction;
pub use self::clear_scorecard::ClearScorecardAction;
pub use self::create_competition::{CreateCompetitionAction, CriterionSpec};
pub use self::set_competition_status::SetCompetitionStatusAction;
pub use self::update_participants::UpdateParticipantsAction;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    SubmitScorecard { action: SubmitScorecardAction },
    RequestUnlock { action: RequestUnlockAction },
    ApproveUnlock { action: ApproveUnlockAction },
    ClearScorecard { action: ClearScorecardAction },
    CreateCompetition { action: CreateCompetitionAction },
    SetCompetitionStatus { action: SetCompetitionStatusAction },
    UpdateParticipants { action: UpdateParticipantsAction },
}

impl Action {
    pub async fn execute<C>(self, db: &C) -> Result<EntityGroup, anyhow::Error> where C: sea_orm::ConnectionTrait {
        match self {
            Action::SubmitScorecard { action } => action.get_changes(db).await,
            Action::RequestUnlock { action } => action.get_changes(db).await,
            Action::ApproveUnlock { action } => action.get_changes(db).await,
            Action::ClearScorecard { action } => action.get_changes(db).await,
            Action::CreateCompetition { action } => action.get_changes(db).await,
            Action::SetCompetitionStatus { action } => action.get_changes(db).await,
            Action::UpdateParticipants { action } => action.get_changes(db).await,
        }
    }
}
