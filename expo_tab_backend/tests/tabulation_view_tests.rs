use expo_tab_entities::mock::{make_mock_competition_with_options, MockOption};
use expo_tab_entities::prelude::*;
use migration::MigratorTrait;
use sea_orm::{prelude::*, Database, Statement};

use expo_tab_backend::views::judge_progress_view::LoadedJudgeProgressView;
use expo_tab_backend::views::tabulation_view::LoadedTabulationView;
use expo_tab_backend::views::LoadedView;

const TAB_TOLERANCE: f64 = 0.0001;

pub async fn set_up_db(with_mock_env: bool) -> Result<DatabaseConnection, anyhow::Error> {
    let db = Database::connect("sqlite::memory:").await?;
    migration::Migrator::up(&db, None).await.unwrap();
    let _r = db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "PRAGMA foreign_keys = ON;",
        vec![])
    ).await?;

    if with_mock_env {
        let mut entities = make_mock_competition_with_options(MockOption {
            deterministic_uuids: true,
            num_participants: 4,
            num_judges: 3,
            enter_scores: false,
            ..Default::default()
        });

        // Criteria: Design 40, Functionality 35, Presentation 25.
        let cells: Vec<(u128, u128, [f64; 3])> = vec![
            (3000, 1000, [80.0, 60.0, 70.0]),
            (3001, 1000, [90.0, 100.0, 100.0]),
            (3000, 1001, [50.0, 50.0, 50.0]),
            (3000, 1003, [80.0, 80.0, 80.0]),
            (3001, 1003, [80.0, 80.0, 80.0]),
        ];

        let mut next_score_uuid = 10000;
        for (judge, participant, values) in cells {
            for (criterion_idx, value) in values.into_iter().enumerate() {
                entities.add(Entity::Score(Score {
                    uuid: Uuid::from_u128(next_score_uuid),
                    competition_id: Uuid::from_u128(1),
                    judge_id: Uuid::from_u128(judge),
                    participant_id: Uuid::from_u128(participant),
                    criterion_id: Uuid::from_u128(200 + criterion_idx as u128),
                    value,
                    is_locked: false,
                    unlock_requested: false,
                }));
                next_score_uuid += 1;
            }
        }

        entities.save_all(&db).await?;
    }
    Ok(db)
}


#[tokio::test]
async fn test_matrix_has_all_participants() -> Result<(), anyhow::Error> {
    let db = set_up_db(true).await?;

    let loaded_view = LoadedTabulationView::load(&db, Uuid::from_u128(1)).await?;

    assert_eq!(loaded_view.matrix.rows.len(), 4);

    Ok(())
}

#[tokio::test]
async fn test_ranking_is_descending_by_final_average() -> Result<(), anyhow::Error> {
    let db = set_up_db(true).await?;

    let loaded_view = LoadedTabulationView::load(&db, Uuid::from_u128(1)).await?;

    let order: Vec<Uuid> = loaded_view.matrix.rows.iter().map(|r| r.participant_uuid).collect();
    assert_eq!(order, vec![
        Uuid::from_u128(1000),
        Uuid::from_u128(1003),
        Uuid::from_u128(1001),
        Uuid::from_u128(1002),
    ]);

    Ok(())
}

#[tokio::test]
async fn test_judge_totals_average_and_variance() -> Result<(), anyhow::Error> {
    let db = set_up_db(true).await?;

    let loaded_view = LoadedTabulationView::load(&db, Uuid::from_u128(1)).await?;

    let row = loaded_view.matrix.rows.iter()
        .find(|r| r.participant_uuid == Uuid::from_u128(1000))
        .expect("Expected to find participant");

    // 80 * 0.4 + 60 * 0.35 + 70 * 0.25 = 70.5
    assert!((row.judge_totals[&Uuid::from_u128(3000)] - 70.5).abs() < TAB_TOLERANCE);
    // 90 * 0.4 + 100 * 0.35 + 100 * 0.25 = 96.0
    assert!((row.judge_totals[&Uuid::from_u128(3001)] - 96.0).abs() < TAB_TOLERANCE);
    assert!((row.final_average - 83.25).abs() < TAB_TOLERANCE);
    assert!((row.variance - 25.5).abs() < TAB_TOLERANCE);
    assert!(row.is_anomalous());

    Ok(())
}

#[tokio::test]
async fn test_agreeing_judges_produce_no_anomaly() -> Result<(), anyhow::Error> {
    let db = set_up_db(true).await?;

    let loaded_view = LoadedTabulationView::load(&db, Uuid::from_u128(1)).await?;

    let row = loaded_view.matrix.rows.iter()
        .find(|r| r.participant_uuid == Uuid::from_u128(1003))
        .expect("Expected to find participant");

    assert!((row.final_average - 80.0).abs() < TAB_TOLERANCE);
    assert_eq!(row.variance, 0.0);
    assert!(!row.is_anomalous());

    Ok(())
}

#[tokio::test]
async fn test_unscored_participant_is_present_at_the_bottom() -> Result<(), anyhow::Error> {
    let db = set_up_db(true).await?;

    let loaded_view = LoadedTabulationView::load(&db, Uuid::from_u128(1)).await?;

    let last = loaded_view.matrix.rows.last().expect("Expected rows");
    assert_eq!(last.participant_uuid, Uuid::from_u128(1002));
    assert_eq!(last.final_average, 0.0);
    assert_eq!(last.variance, 0.0);
    assert!(last.judge_totals.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_inspect_cell_returns_full_breakdown() -> Result<(), anyhow::Error> {
    let db = set_up_db(true).await?;

    let loaded_view = LoadedTabulationView::load(&db, Uuid::from_u128(1)).await?;
    let inspection = loaded_view.inspect_cell(&db, Uuid::from_u128(3000), Uuid::from_u128(1000)).await?;

    assert_eq!(inspection.breakdown.len(), 3);
    let design = inspection.breakdown.iter().find(|b| b.name == "Design").unwrap();
    assert_eq!(design.value, 80.0);
    assert!((inspection.weighted_total - 70.5).abs() < TAB_TOLERANCE);
    assert!(!inspection.is_locked);
    assert!(!inspection.unlock_requested);

    Ok(())
}

#[tokio::test]
async fn test_inspect_cell_zero_fills_unentered_criteria() -> Result<(), anyhow::Error> {
    let db = set_up_db(true).await?;

    let loaded_view = LoadedTabulationView::load(&db, Uuid::from_u128(1)).await?;
    // Judge 3001 never scored participant 1001.
    let inspection = loaded_view.inspect_cell(&db, Uuid::from_u128(3001), Uuid::from_u128(1001)).await?;

    assert_eq!(inspection.breakdown.len(), 3);
    assert!(inspection.breakdown.iter().all(|b| b.value == 0.0));
    assert_eq!(inspection.weighted_total, 0.0);

    Ok(())
}

#[tokio::test]
async fn test_judge_progress_tracks_scorecard_states() -> Result<(), anyhow::Error> {
    let db = set_up_db(true).await?;

    // Judge 3000 submits their card for participant 1000.
    let mut card = Scorecard::try_load(&db, Uuid::from_u128(3000), Uuid::from_u128(1000)).await?.expect("Expected scorecard");
    card.lock()?;
    EntityGroup::new_with_entities(
        card.entries.into_iter().map(Entity::Score).collect()
    ).save_all(&db).await?;

    let view = LoadedJudgeProgressView::load(&db, Uuid::from_u128(3000)).await?;
    assert_eq!(view.competition_uuid, Uuid::from_u128(1));
    assert_eq!(view.entries.len(), 4);

    let status_of = |participant: u128| view.entries.iter()
        .find(|e| e.participant_uuid == Uuid::from_u128(participant))
        .map(|e| e.status);

    assert_eq!(status_of(1000), Some(ScorecardStatus::Completed));
    assert_eq!(status_of(1001), Some(ScorecardStatus::InProgress));
    assert_eq!(status_of(1002), Some(ScorecardStatus::Pending));
    assert_eq!(status_of(1003), Some(ScorecardStatus::InProgress));

    Ok(())
}

#[tokio::test]
async fn test_view_ignores_changes_for_other_competitions() -> Result<(), anyhow::Error> {
    let db = set_up_db(true).await?;

    let mut loaded_view = LoadedTabulationView::load(&db, Uuid::from_u128(1)).await?;

    let unrelated = EntityChangeSummary {
        changed_types: [EntityTypeId::Score].into_iter().collect(),
        competition_ids: [Uuid::from_u128(99)].into_iter().collect(),
    };

    let changes = loaded_view.update_and_get_changes(&db, &unrelated).await?;
    assert!(changes.is_none());

    Ok(())
}

#[tokio::test]
async fn test_view_reloads_on_score_changes() -> Result<(), anyhow::Error> {
    let db = set_up_db(true).await?;

    let mut loaded_view = LoadedTabulationView::load(&db, Uuid::from_u128(1)).await?;

    // Judge 3002 starts scoring participant 1002 after the initial load.
    let mut card = Scorecard::load_or_new(&db, Uuid::from_u128(1), Uuid::from_u128(3002), Uuid::from_u128(1002)).await?;
    card.set_value(Uuid::from_u128(200), 90.0)?;
    let summary = EntityGroup::new_with_entities(
        card.entries.into_iter().map(Entity::Score).collect()
    ).save_all(&db).await?;

    let changes = loaded_view.update_and_get_changes(&db, &summary).await?;
    assert!(changes.is_some());

    let row = loaded_view.matrix.rows.iter()
        .find(|r| r.participant_uuid == Uuid::from_u128(1002))
        .expect("Expected to find participant");
    assert!(!row.judge_totals.is_empty());

    Ok(())
}
