use std::collections::HashMap;

use sea_orm::prelude::*;

use crate::domain::competition::Competition;
use crate::domain::criterion::Criterion;
use crate::domain::entity::LoadEntity;
use crate::domain::judge::Judge;
use crate::domain::participant::Participant;

/// Read-mostly reference data of one competition, loaded as a snapshot.
/// Participants come back in booth-code order and judges in name order,
/// which is the display order all views use.
#[derive(Debug, Clone)]
pub struct CompetitionInfo {
    pub competition: Competition,
    pub participants: Vec<Participant>,
    pub judges: Vec<Judge>,
    pub criteria: Vec<Criterion>,
    pub participants_by_id: HashMap<Uuid, Participant>,
    pub judges_by_id: HashMap<Uuid, Judge>,
    pub criteria_by_id: HashMap<Uuid, Criterion>,
}

impl CompetitionInfo {
    pub async fn load<C>(db: &C, competition_uuid: Uuid) -> Result<CompetitionInfo, anyhow::Error> where C: ConnectionTrait {
        let competition = Competition::get(db, competition_uuid).await?;
        let participants = Participant::get_all_in_competition(db, competition_uuid).await?;
        let judges = Judge::get_all_in_competition(db, competition_uuid).await?;
        let criteria = Criterion::get_all_in_competition(db, competition_uuid).await?;

        let participants_by_id = participants.iter().map(|p| (p.uuid, p.clone())).collect();
        let judges_by_id = judges.iter().map(|j| (j.uuid, j.clone())).collect();
        let criteria_by_id = criteria.iter().map(|c| (c.uuid, c.clone())).collect();

        Ok(CompetitionInfo {
            competition,
            participants,
            judges,
            criteria,
            participants_by_id,
            judges_by_id,
            criteria_by_id,
        })
    }
}
