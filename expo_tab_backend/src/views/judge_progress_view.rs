use std::collections::HashMap;

use async_trait::async_trait;
use itertools::Itertools;

use sea_orm::prelude::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use expo_tab_entities::domain::entity::LoadEntity;
use expo_tab_entities::prelude::*;

use super::base::LoadedView;

/// One judge's assignment list: every participant of their competition
/// with the scorecard state, as shown on the judge dashboard.
pub struct LoadedJudgeProgressView {
    pub judge_uuid: Uuid,
    pub competition_uuid: Uuid,
    pub entries: Vec<JudgeProgressEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeProgressEntry {
    pub participant_uuid: Uuid,
    pub participant_name: String,
    pub alias: Option<String>,
    pub booth_code: String,
    pub status: ScorecardStatus,
}

impl LoadedJudgeProgressView {
    pub async fn load<C>(db: &C, judge_uuid: Uuid) -> Result<LoadedJudgeProgressView, anyhow::Error> where C: sea_orm::ConnectionTrait {
        let judge = Judge::get(db, judge_uuid).await?;
        let competition_uuid = judge.competition_id;

        let entries = Self::load_entries(db, judge_uuid, competition_uuid).await?;

        Ok(LoadedJudgeProgressView {
            judge_uuid,
            competition_uuid,
            entries,
        })
    }

    async fn load_entries<C>(db: &C, judge_uuid: Uuid, competition_uuid: Uuid) -> Result<Vec<JudgeProgressEntry>, anyhow::Error> where C: sea_orm::ConnectionTrait {
        let participants = Participant::get_all_in_competition(db, competition_uuid).await?;
        let scores = Score::get_all_for_judge(db, judge_uuid).await?;
        let scores_by_participant = scores.into_iter().into_group_map_by(|s| s.participant_id);

        Ok(participants.into_iter().map(|participant| {
            let entries = scores_by_participant.get(&participant.uuid);
            // A single locked row marks the whole evaluation as submitted.
            let status = match entries {
                None => ScorecardStatus::Pending,
                Some(rows) if rows.iter().any(|r| r.is_locked) => ScorecardStatus::Completed,
                Some(_) => ScorecardStatus::InProgress,
            };
            JudgeProgressEntry {
                participant_uuid: participant.uuid,
                participant_name: participant.real_name,
                alias: participant.alias,
                booth_code: participant.booth_code,
                status,
            }
        }).collect_vec())
    }
}

#[async_trait]
impl LoadedView for LoadedJudgeProgressView {
    async fn update_and_get_changes(&mut self, db: &DatabaseConnection, changes: &EntityChangeSummary) -> Result<Option<HashMap<String, serde_json::Value>>, anyhow::Error> {
        let relevant = changes.touches_competition(self.competition_uuid)
            && [EntityTypeId::Score, EntityTypeId::Participant]
                .into_iter()
                .any(|t| changes.has_changes_for_type(t));

        if relevant {
            self.entries = Self::load_entries(db, self.judge_uuid, self.competition_uuid).await?;

            let mut out = HashMap::new();
            out.insert(".".to_string(), serde_json::to_value(&self.entries)?);

            Ok(Some(out))
        }
        else {
            Ok(None)
        }
    }

    async fn view_string(&self) -> Result<String, anyhow::Error> {
        Ok(serde_json::to_string(&self.entries)?)
    }
}
