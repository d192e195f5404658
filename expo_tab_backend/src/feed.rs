use std::time::Duration;

use sea_orm::prelude::*;
use sea_orm::DatabaseConnection;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::views::public_ranking_view::{LoadedPublicRankingView, PublicFeedError, RankedEntry};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Interval-polling republisher of one competition's public leaderboard.
/// Every poll supersedes the previous result through a watch channel, so
/// a stale in-flight fetch is simply discarded by the next one. A
/// competition that is not (or no longer) live publishes as `None`.
pub struct PublicRankingFeed {
    receiver: watch::Receiver<Option<Vec<RankedEntry>>>,
    poller: JoinHandle<()>,
}

impl PublicRankingFeed {
    pub fn spawn(db: DatabaseConnection, competition_uuid: Uuid, poll_interval: Duration) -> PublicRankingFeed {
        let (sender, receiver) = watch::channel(None);

        let poller = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match LoadedPublicRankingView::load(&db, competition_uuid).await {
                    Ok(view) => {
                        if sender.send(Some(view.rankings)).is_err() {
                            break;
                        }
                    },
                    Err(err) if err.downcast_ref::<PublicFeedError>().is_some() => {
                        if sender.send(None).is_err() {
                            break;
                        }
                    },
                    Err(err) => {
                        // Transient store failure: keep the last published
                        // ranking rather than flickering to empty.
                        tracing::warn!(competition = %competition_uuid, "public ranking fetch failed: {}", err);
                    }
                }
            }
        });

        PublicRankingFeed {
            receiver,
            poller,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Vec<RankedEntry>>> {
        self.receiver.clone()
    }

    pub fn latest(&self) -> Option<Vec<RankedEntry>> {
        self.receiver.borrow().clone()
    }
}

impl Drop for PublicRankingFeed {
    fn drop(&mut self) {
        self.poller.abort();
    }
}
