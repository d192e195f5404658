use std::sync::Arc;

use sea_orm::prelude::*;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tokio::sync::{broadcast, Notify, RwLock};
use tokio::task::JoinHandle;

use expo_tab_entities::prelude::*;

use crate::actions::{Action, ApproveUnlockAction, ClearScorecardAction};
use crate::views::tabulation_view::{CellInspection, LoadedTabulationView};

/// Store-side change notifications. Carries only a change summary, never
/// entity payloads; every consumer re-fetches from the store.
#[derive(Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<EntityChangeSummary>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self {
            sender: broadcast::Sender::new(100),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EntityChangeSummary> {
        self.sender.subscribe()
    }

    pub fn notify(&self, summary: EntityChangeSummary) {
        //We ignore the send error: no subscribers means nobody to refresh
        let _ = self.sender.send(summary);
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs an action transactionally and broadcasts what it changed. Nothing
/// reaches any view before the store has confirmed the write.
pub async fn execute_action(action: Action, db: &DatabaseConnection, notifier: &ChangeNotifier) -> Result<EntityChangeSummary, anyhow::Error> {
    let transaction = db.begin().await?;
    let changes = action.execute(&transaction).await?;
    let summary = changes.save_all(&transaction).await?;
    transaction.commit().await?;

    notifier.notify(summary.clone());
    Ok(summary)
}

/// Keeps one competition's tabulation view live. Change notifications are
/// forwarded into a [`Notify`]; bursts coalesce into a single pending
/// refresh, which is fine because aggregation is pure and re-running it
/// is idempotent (at-least-once, not exactly-once).
pub struct TabulationCoordinator {
    db: DatabaseConnection,
    competition_uuid: Uuid,
    notifier: ChangeNotifier,
    view: Arc<RwLock<LoadedTabulationView>>,
    refresh_signal: Arc<Notify>,
    forwarder: JoinHandle<()>,
    worker: JoinHandle<()>,
}

impl TabulationCoordinator {
    pub async fn new(db: DatabaseConnection, competition_uuid: Uuid, notifier: ChangeNotifier) -> Result<TabulationCoordinator, anyhow::Error> {
        let view = Arc::new(RwLock::new(LoadedTabulationView::load(&db, competition_uuid).await?));
        let refresh_signal = Arc::new(Notify::new());

        let mut receiver = notifier.subscribe();
        let signal = refresh_signal.clone();
        let forwarder = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(summary) => {
                        if summary.touches_competition(competition_uuid) {
                            signal.notify_one();
                        }
                    },
                    // Notifications carry no payload anyway; one refresh
                    // covers everything that was missed.
                    Err(broadcast::error::RecvError::Lagged(_)) => {
                        signal.notify_one();
                    },
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let worker_db = db.clone();
        let worker_view = view.clone();
        let worker_signal = refresh_signal.clone();
        let worker = tokio::spawn(async move {
            loop {
                worker_signal.notified().await;
                match TabulationMatrix::load_from_competition(&worker_db, competition_uuid).await {
                    Ok(matrix) => {
                        worker_view.write().await.matrix = matrix;
                    },
                    Err(err) => {
                        tracing::warn!(competition = %competition_uuid, "tabulation refresh failed: {}", err);
                    }
                }
            }
        });

        Ok(TabulationCoordinator {
            db,
            competition_uuid,
            notifier,
            view,
            refresh_signal,
            forwarder,
            worker,
        })
    }

    pub fn competition_uuid(&self) -> Uuid {
        self.competition_uuid
    }

    /// Re-pulls the full snapshot and replaces the view. Safe to call
    /// concurrently with the background worker; the last completed reload
    /// wins.
    pub async fn refresh(&self) -> Result<(), anyhow::Error> {
        let matrix = TabulationMatrix::load_from_competition(&self.db, self.competition_uuid).await?;
        self.view.write().await.matrix = matrix;
        Ok(())
    }

    /// Queues a coalesced background refresh, exactly as an external
    /// change notification would.
    pub fn request_refresh(&self) {
        self.refresh_signal.notify_one();
    }

    pub async fn matrix(&self) -> TabulationMatrix {
        self.view.read().await.matrix.clone()
    }

    pub async fn inspect_cell(&self, judge_uuid: Uuid, participant_uuid: Uuid) -> Result<CellInspection, anyhow::Error> {
        let view = self.view.read().await;
        view.inspect_cell(&self.db, judge_uuid, participant_uuid).await
    }

    pub async fn approve_unlock(&self, judge_uuid: Uuid, participant_uuid: Uuid) -> Result<(), anyhow::Error> {
        self.run_governance_action(Action::ApproveUnlock {
            action: ApproveUnlockAction {
                judge_id: judge_uuid,
                participant_id: participant_uuid,
            },
        }).await
    }

    pub async fn reject_and_clear(&self, judge_uuid: Uuid, participant_uuid: Uuid) -> Result<(), anyhow::Error> {
        self.run_governance_action(Action::ClearScorecard {
            action: ClearScorecardAction {
                judge_id: judge_uuid,
                participant_id: participant_uuid,
            },
        }).await
    }

    /// Whether the write succeeded or not, the displayed state is only
    /// trusted again after a re-fetch from the store.
    async fn run_governance_action(&self, action: Action) -> Result<(), anyhow::Error> {
        let result = execute_action(action, &self.db, &self.notifier).await;
        if let Err(refresh_err) = self.refresh().await {
            tracing::warn!(competition = %self.competition_uuid, "re-fetch after governance action failed: {}", refresh_err);
        }
        result.map(|_| ())
    }
}

impl Drop for TabulationCoordinator {
    fn drop(&mut self) {
        self.forwarder.abort();
        self.worker.abort();
    }
}
