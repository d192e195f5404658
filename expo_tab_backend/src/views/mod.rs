pub mod tabulation_view;
pub mod public_ranking_view;
pub mod judge_progress_view;
mod base;

pub use self::base::LoadedView;

use sea_orm::prelude::*;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};

use self::judge_progress_view::LoadedJudgeProgressView;
use self::public_ranking_view::LoadedPublicRankingView;
use self::tabulation_view::LoadedTabulationView;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type")]
pub enum View {
    Tabulation { competition_uuid: Uuid },
    PublicRanking { competition_uuid: Uuid },
    JudgeProgress { judge_uuid: Uuid },
}

impl View {
    pub async fn load_json<C>(&self, db: &C) -> Result<String, anyhow::Error> where C: ConnectionTrait {
        let view = self.load(db).await?;
        view.view_string().await
    }

    pub async fn load<C>(&self, db: &C) -> Result<Box<dyn LoadedView>, anyhow::Error> where C: ConnectionTrait {
        Ok(match self {
            View::Tabulation { competition_uuid } => {
                Box::new(LoadedTabulationView::load(db, *competition_uuid).await?)
            },
            View::PublicRanking { competition_uuid } => {
                Box::new(LoadedPublicRankingView::load(db, *competition_uuid).await?)
            },
            View::JudgeProgress { judge_uuid } => {
                Box::new(LoadedJudgeProgressView::load(db, *judge_uuid).await?)
            },
        })
    }
}
