use std::time::Duration;

use expo_tab_entities::mock::{make_mock_competition_with_options, MockOption};
use expo_tab_entities::prelude::*;
use migration::MigratorTrait;
use sea_orm::{prelude::*, Database, Statement};

use expo_tab_backend::actions::{Action, CriterionScore, RequestUnlockAction, SubmitScorecardAction};
use expo_tab_backend::coordinator::{execute_action, ChangeNotifier, TabulationCoordinator};
use expo_tab_backend::feed::PublicRankingFeed;

pub async fn set_up_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = Database::connect("sqlite::memory:").await?;
    migration::Migrator::up(&db, None).await.unwrap();
    let _r = db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "PRAGMA foreign_keys = ON;",
        vec![])
    ).await?;

    let entities = make_mock_competition_with_options(MockOption {
        deterministic_uuids: true,
        num_participants: 3,
        num_judges: 2,
        enter_scores: false,
        ..Default::default()
    });
    entities.save_all(&db).await?;
    Ok(db)
}

fn submit_action(judge: u128, participant: u128, values: [f64; 3], lock: bool) -> Action {
    Action::SubmitScorecard {
        action: SubmitScorecardAction {
            competition_id: Uuid::from_u128(1),
            judge_id: Uuid::from_u128(judge),
            participant_id: Uuid::from_u128(participant),
            values: values.into_iter().enumerate().map(|(i, value)| CriterionScore {
                criterion_id: Uuid::from_u128(200 + i as u128),
                value,
            }).collect(),
            lock,
        },
    }
}

/// Polls the coordinator until `predicate` holds or the deadline passes.
async fn wait_for_matrix<F>(coordinator: &TabulationCoordinator, predicate: F) -> TabulationMatrix
where F: Fn(&TabulationMatrix) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let matrix = coordinator.matrix().await;
        if predicate(&matrix) {
            return matrix;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("Coordinator did not reach the expected state in time");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}


#[tokio::test]
async fn test_execute_action_broadcasts_change_summary() -> Result<(), anyhow::Error> {
    let db = set_up_db().await?;
    let notifier = ChangeNotifier::new();
    let mut receiver = notifier.subscribe();

    execute_action(submit_action(3000, 1000, [80.0, 60.0, 70.0], false), &db, &notifier).await?;

    let summary = receiver.recv().await?;
    assert!(summary.has_changes_for_type(EntityTypeId::Score));
    assert!(summary.touches_competition(Uuid::from_u128(1)));

    Ok(())
}

#[tokio::test]
async fn test_coordinator_picks_up_score_entry_automatically() -> Result<(), anyhow::Error> {
    let db = set_up_db().await?;
    let notifier = ChangeNotifier::new();
    let coordinator = TabulationCoordinator::new(db.clone(), Uuid::from_u128(1), notifier.clone()).await?;

    let initial = coordinator.matrix().await;
    assert!(initial.rows.iter().all(|r| r.judge_totals.is_empty()));

    execute_action(submit_action(3000, 1000, [80.0, 60.0, 70.0], false), &db, &notifier).await?;

    let matrix = wait_for_matrix(&coordinator, |matrix| {
        matrix.rows.iter().any(|r| !r.judge_totals.is_empty())
    }).await;

    let row = matrix.rows.iter().find(|r| r.participant_uuid == Uuid::from_u128(1000)).unwrap();
    assert!((row.judge_totals[&Uuid::from_u128(3000)] - 70.5).abs() < 0.0001);

    Ok(())
}

#[tokio::test]
async fn test_rapid_changes_coalesce_without_losing_the_last_write() -> Result<(), anyhow::Error> {
    let db = set_up_db().await?;
    let notifier = ChangeNotifier::new();
    let coordinator = TabulationCoordinator::new(db.clone(), Uuid::from_u128(1), notifier.clone()).await?;

    for value in [10.0, 20.0, 30.0, 40.0, 50.0] {
        execute_action(submit_action(3000, 1000, [value, value, value], false), &db, &notifier).await?;
    }

    wait_for_matrix(&coordinator, |matrix| {
        matrix.rows.iter().any(|r| r.judge_totals.get(&Uuid::from_u128(3000)) == Some(&50.0))
    }).await;

    Ok(())
}

#[tokio::test]
async fn test_approve_unlock_refreshes_the_view() -> Result<(), anyhow::Error> {
    let db = set_up_db().await?;
    let notifier = ChangeNotifier::new();

    execute_action(submit_action(3000, 1000, [80.0, 60.0, 70.0], true), &db, &notifier).await?;
    execute_action(Action::RequestUnlock {
        action: RequestUnlockAction {
            judge_id: Uuid::from_u128(3000),
            participant_id: Uuid::from_u128(1000),
        },
    }, &db, &notifier).await?;

    let coordinator = TabulationCoordinator::new(db.clone(), Uuid::from_u128(1), notifier.clone()).await?;

    let matrix = coordinator.matrix().await;
    let row = matrix.rows.iter().find(|r| r.participant_uuid == Uuid::from_u128(1000)).unwrap();
    assert_eq!(row.judge_requests[&Uuid::from_u128(3000)], true);

    coordinator.approve_unlock(Uuid::from_u128(3000), Uuid::from_u128(1000)).await?;

    // The governance wrapper re-fetches synchronously on success.
    let matrix = coordinator.matrix().await;
    let row = matrix.rows.iter().find(|r| r.participant_uuid == Uuid::from_u128(1000)).unwrap();
    assert_eq!(row.judge_requests[&Uuid::from_u128(3000)], false);

    let inspection = coordinator.inspect_cell(Uuid::from_u128(3000), Uuid::from_u128(1000)).await?;
    assert!(!inspection.is_locked);
    assert!(!inspection.unlock_requested);

    Ok(())
}

#[tokio::test]
async fn test_reject_and_clear_removes_the_cell_from_the_view() -> Result<(), anyhow::Error> {
    let db = set_up_db().await?;
    let notifier = ChangeNotifier::new();

    execute_action(submit_action(3000, 1000, [80.0, 60.0, 70.0], true), &db, &notifier).await?;

    let coordinator = TabulationCoordinator::new(db.clone(), Uuid::from_u128(1), notifier.clone()).await?;
    coordinator.reject_and_clear(Uuid::from_u128(3000), Uuid::from_u128(1000)).await?;

    let matrix = coordinator.matrix().await;
    let row = matrix.rows.iter().find(|r| r.participant_uuid == Uuid::from_u128(1000)).unwrap();
    assert!(row.judge_totals.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_failed_action_leaves_view_matching_the_store() -> Result<(), anyhow::Error> {
    let db = set_up_db().await?;
    let notifier = ChangeNotifier::new();

    execute_action(submit_action(3000, 1000, [80.0, 60.0, 70.0], true), &db, &notifier).await?;
    let coordinator = TabulationCoordinator::new(db.clone(), Uuid::from_u128(1), notifier.clone()).await?;

    // A locked cell rejects the overwrite; the view must still show the
    // stored values afterwards.
    let result = execute_action(submit_action(3000, 1000, [1.0, 1.0, 1.0], false), &db, &notifier).await;
    assert!(result.is_err());
    coordinator.refresh().await?;

    let matrix = coordinator.matrix().await;
    let row = matrix.rows.iter().find(|r| r.participant_uuid == Uuid::from_u128(1000)).unwrap();
    assert!((row.judge_totals[&Uuid::from_u128(3000)] - 70.5).abs() < 0.0001);

    Ok(())
}

#[tokio::test]
async fn test_public_feed_publishes_and_supersedes() -> Result<(), anyhow::Error> {
    let db = set_up_db().await?;
    let notifier = ChangeNotifier::new();

    execute_action(submit_action(3000, 1000, [80.0, 60.0, 70.0], true), &db, &notifier).await?;

    let feed = PublicRankingFeed::spawn(db.clone(), Uuid::from_u128(1), Duration::from_millis(50));
    let mut receiver = feed.subscribe();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        tokio::time::timeout(Duration::from_secs(5), receiver.changed()).await??;
        let latest = receiver.borrow_and_update().clone();
        if let Some(rankings) = latest {
            assert_eq!(rankings[0].rank, 1);
            assert!((rankings[0].final_average - 70.5).abs() < 0.0001);
            break;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("Feed did not publish in time");
        }
    }

    Ok(())
}
