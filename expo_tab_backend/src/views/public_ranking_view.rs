use std::collections::HashMap;

use async_trait::async_trait;
use itertools::Itertools;
use thiserror::Error;

use sea_orm::prelude::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use expo_tab_entities::info::CompetitionInfo;
use expo_tab_entities::prelude::*;

use super::base::LoadedView;

#[derive(Debug, Error)]
pub enum PublicFeedError {
    #[error("competition is not live")]
    CompetitionNotLive,
}

/// One line of the public leaderboard. Deliberately carries no judge
/// identity, per-criterion breakdown or lock state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub participant_name: String,
    pub alias: Option<String>,
    pub final_average: f64,
    pub rank: u32,
}

pub struct LoadedPublicRankingView {
    pub competition_uuid: Uuid,
    pub rankings: Vec<RankedEntry>,
}

impl LoadedPublicRankingView {
    /// Only competitions whose status is `live` are served; everything
    /// else is a [`PublicFeedError::CompetitionNotLive`] miss.
    pub async fn load<C>(db: &C, competition_uuid: Uuid) -> Result<LoadedPublicRankingView, anyhow::Error> where C: sea_orm::ConnectionTrait {
        let info = CompetitionInfo::load(db, competition_uuid).await?;
        if info.competition.status != CompetitionStatus::Live {
            return Err(PublicFeedError::CompetitionNotLive.into());
        }

        let matrix = TabulationMatrix::load_with_info(db, &info).await?;

        Ok(LoadedPublicRankingView {
            competition_uuid,
            rankings: Self::rank(&matrix),
        })
    }

    fn rank(matrix: &TabulationMatrix) -> Vec<RankedEntry> {
        matrix.rows.iter().enumerate().map(|(idx, row)| RankedEntry {
            participant_name: row.participant_name.clone(),
            alias: row.alias.clone(),
            final_average: row.final_average,
            rank: idx as u32 + 1,
        }).collect_vec()
    }
}

pub async fn list_live_competitions<C>(db: &C) -> Result<Vec<Competition>, anyhow::Error> where C: sea_orm::ConnectionTrait {
    Ok(Competition::get_all_with_status(db, CompetitionStatus::Live).await?)
}

#[async_trait]
impl LoadedView for LoadedPublicRankingView {
    async fn update_and_get_changes(&mut self, db: &DatabaseConnection, changes: &EntityChangeSummary) -> Result<Option<HashMap<String, serde_json::Value>>, anyhow::Error> {
        if changes.touches_competition(self.competition_uuid) {
            let reloaded = Self::load(db, self.competition_uuid).await?;
            self.rankings = reloaded.rankings;

            let mut out = HashMap::new();
            out.insert(".".to_string(), serde_json::to_value(&self.rankings)?);

            Ok(Some(out))
        }
        else {
            Ok(None)
        }
    }

    async fn view_string(&self) -> Result<String, anyhow::Error> {
        Ok(serde_json::to_string(&self.rankings)?)
    }
}
