use std::collections::HashMap;

use itertools::Itertools;
use ordered_float::OrderedFloat;
use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::criterion::Criterion;
use crate::domain::judge::Judge;
use crate::domain::participant::Participant;
use crate::domain::score::Score;
use crate::info::CompetitionInfo;

/// Spread between the highest and lowest judge total above which a row is
/// flagged for operator attention. Presentation signal only; never blocks
/// aggregation.
pub const ANOMALY_VARIANCE_THRESHOLD: f64 = 15.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabulationMatrix {
    pub competition_uuid: Uuid,
    pub rows: Vec<MatrixRow>,
}

/// One participant's aggregate line. Rank is the 1-based position in the
/// containing matrix and is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixRow {
    pub participant_uuid: Uuid,
    pub participant_name: String,
    pub alias: Option<String>,
    pub booth_code: String,
    pub judge_totals: HashMap<Uuid, f64>,
    pub judge_requests: HashMap<Uuid, bool>,
    pub final_average: f64,
    pub variance: f64,
}

impl MatrixRow {
    pub fn is_anomalous(&self) -> bool {
        self.variance > ANOMALY_VARIANCE_THRESHOLD
    }
}

/// Decimal rounding to 2 places, applied only when a judge total, final
/// average or variance is exposed. Intermediate weighted sums are never
/// truncated.
pub fn round_score(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl TabulationMatrix {
    /// Pure aggregation over an in-memory snapshot. Total over whatever it
    /// is given: score rows referencing a judge, participant or criterion
    /// missing from the snapshot are skipped as if they did not exist.
    pub fn compute(
        competition_uuid: Uuid,
        participants: &[Participant],
        judges: &[Judge],
        criteria: &[Criterion],
        scores: &[Score],
    ) -> TabulationMatrix {
        let mut rows = participants.iter().map(|participant| {
            let participant_scores = scores.iter()
                .filter(|s| s.participant_id == participant.uuid)
                .collect_vec();

            let mut judge_totals = HashMap::new();
            let mut judge_requests = HashMap::new();
            let mut contributing_totals = vec![];

            for judge in judges {
                let mut weighted_total = 0.0;
                let mut criteria_answered = 0;
                let mut has_pending_request = false;

                for criterion in criteria {
                    let entry = participant_scores.iter()
                        .find(|s| s.judge_id == judge.uuid && s.criterion_id == criterion.uuid);
                    if let Some(entry) = entry {
                        weighted_total += entry.value * criterion.weight_percentage / 100.0;
                        criteria_answered += 1;
                        if entry.unlock_requested {
                            has_pending_request = true;
                        }
                    }
                }

                // A judge who has answered nothing contributes no total;
                // they are excluded from the average, not counted as zero.
                if criteria_answered > 0 {
                    let total = round_score(weighted_total);
                    judge_totals.insert(judge.uuid, total);
                    judge_requests.insert(judge.uuid, has_pending_request);
                    contributing_totals.push(total);
                }
            }

            let final_average = if contributing_totals.is_empty() {
                0.0
            }
            else {
                contributing_totals.iter().sum::<f64>() / contributing_totals.len() as f64
            };

            let variance = if contributing_totals.len() > 1 {
                let max = contributing_totals.iter().copied().map(OrderedFloat).max().unwrap().0;
                let min = contributing_totals.iter().copied().map(OrderedFloat).min().unwrap().0;
                max - min
            }
            else {
                0.0
            };

            MatrixRow {
                participant_uuid: participant.uuid,
                participant_name: participant.real_name.clone(),
                alias: participant.alias.clone(),
                booth_code: participant.booth_code.clone(),
                judge_totals,
                judge_requests,
                final_average: round_score(final_average),
                variance: round_score(variance),
            }
        }).collect_vec();

        // Stable sort: tied rows keep their snapshot order.
        rows.sort_by_key(|row| -OrderedFloat(row.final_average));

        TabulationMatrix {
            competition_uuid,
            rows,
        }
    }

    pub async fn load_from_competition<C>(db: &C, competition_uuid: Uuid) -> Result<TabulationMatrix, anyhow::Error> where C: ConnectionTrait {
        let info = CompetitionInfo::load(db, competition_uuid).await?;
        Self::load_with_info(db, &info).await
    }

    pub async fn load_with_info<C>(db: &C, info: &CompetitionInfo) -> Result<TabulationMatrix, anyhow::Error> where C: ConnectionTrait {
        let scores = Score::get_all_in_competition(db, info.competition.uuid).await?;
        Ok(Self::compute(
            info.competition.uuid,
            &info.participants,
            &info.judges,
            &info.criteria,
            &scores,
        ))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn competition_uuid() -> Uuid {
        Uuid::from_u128(1)
    }

    fn make_participant(id: u128, booth_code: &str) -> Participant {
        Participant {
            uuid: Uuid::from_u128(id),
            competition_id: competition_uuid(),
            real_name: format!("Project {}", id),
            alias: None,
            booth_code: booth_code.into(),
        }
    }

    fn make_judge(id: u128) -> Judge {
        Judge {
            uuid: Uuid::from_u128(id),
            competition_id: competition_uuid(),
            name: format!("Judge {}", id),
        }
    }

    fn make_criterion(id: u128, name: &str, weight: f64) -> Criterion {
        Criterion {
            uuid: Uuid::from_u128(id),
            competition_id: competition_uuid(),
            name: name.into(),
            weight_percentage: weight,
        }
    }

    fn make_score(judge: u128, participant: u128, criterion: u128, value: f64) -> Score {
        Score {
            uuid: Uuid::new_v4(),
            competition_id: competition_uuid(),
            judge_id: Uuid::from_u128(judge),
            participant_id: Uuid::from_u128(participant),
            criterion_id: Uuid::from_u128(criterion),
            value,
            is_locked: false,
            unlock_requested: false,
        }
    }

    fn design_function_rubric() -> Vec<Criterion> {
        vec![
            make_criterion(200, "Design", 50.0),
            make_criterion(201, "Function", 50.0),
        ]
    }

    #[test]
    fn test_single_judge_total_and_average() {
        let participants = vec![make_participant(1000, "EXPO-01")];
        let judges = vec![make_judge(3000)];
        let criteria = design_function_rubric();
        let scores = vec![
            make_score(3000, 1000, 200, 80.0),
            make_score(3000, 1000, 201, 60.0),
        ];

        let matrix = TabulationMatrix::compute(competition_uuid(), &participants, &judges, &criteria, &scores);

        let row = &matrix.rows[0];
        assert_eq!(row.judge_totals[&Uuid::from_u128(3000)], 70.0);
        assert_eq!(row.final_average, 70.0);
        assert_eq!(row.variance, 0.0);
        assert!(!row.is_anomalous());
    }

    #[test]
    fn test_second_judge_shifts_average_and_flags_variance() {
        let participants = vec![make_participant(1000, "EXPO-01")];
        let judges = vec![make_judge(3000), make_judge(3001)];
        let criteria = design_function_rubric();
        let scores = vec![
            make_score(3000, 1000, 200, 80.0),
            make_score(3000, 1000, 201, 60.0),
            make_score(3001, 1000, 200, 90.0),
            make_score(3001, 1000, 201, 100.0),
        ];

        let matrix = TabulationMatrix::compute(competition_uuid(), &participants, &judges, &criteria, &scores);

        let row = &matrix.rows[0];
        assert_eq!(row.judge_totals[&Uuid::from_u128(3001)], 95.0);
        assert_eq!(row.final_average, 82.5);
        assert_eq!(row.variance, 25.0);
        assert!(row.is_anomalous());
    }

    #[test]
    fn test_judge_with_no_entries_is_excluded_from_average() {
        let participants = vec![make_participant(1000, "EXPO-01")];
        let judges = vec![make_judge(3000), make_judge(3001), make_judge(3002)];
        let criteria = design_function_rubric();
        let scores = vec![
            make_score(3000, 1000, 200, 80.0),
            make_score(3000, 1000, 201, 60.0),
            make_score(3001, 1000, 200, 90.0),
            make_score(3001, 1000, 201, 100.0),
        ];

        let matrix = TabulationMatrix::compute(competition_uuid(), &participants, &judges, &criteria, &scores);

        let row = &matrix.rows[0];
        assert_eq!(row.judge_totals.len(), 2);
        assert!(!row.judge_totals.contains_key(&Uuid::from_u128(3002)));
        assert_eq!(row.final_average, 82.5);
    }

    #[test]
    fn test_partial_scorecard_contributes_partial_total() {
        let participants = vec![make_participant(1000, "EXPO-01")];
        let judges = vec![make_judge(3000)];
        let criteria = design_function_rubric();
        // Torn snapshot: only one of two criteria visible yet.
        let scores = vec![make_score(3000, 1000, 200, 80.0)];

        let matrix = TabulationMatrix::compute(competition_uuid(), &participants, &judges, &criteria, &scores);

        assert_eq!(matrix.rows[0].judge_totals[&Uuid::from_u128(3000)], 40.0);
    }

    #[test]
    fn test_participant_without_scores_ranks_last() {
        let participants = vec![
            make_participant(1000, "EXPO-01"),
            make_participant(1001, "EXPO-02"),
        ];
        let judges = vec![make_judge(3000)];
        let criteria = design_function_rubric();
        let scores = vec![
            make_score(3000, 1001, 200, 75.0),
            make_score(3000, 1001, 201, 75.0),
        ];

        let matrix = TabulationMatrix::compute(competition_uuid(), &participants, &judges, &criteria, &scores);

        assert_eq!(matrix.rows.len(), 2);
        assert_eq!(matrix.rows[0].participant_uuid, Uuid::from_u128(1001));
        let last = &matrix.rows[1];
        assert_eq!(last.participant_uuid, Uuid::from_u128(1000));
        assert_eq!(last.final_average, 0.0);
        assert_eq!(last.variance, 0.0);
        assert!(last.judge_totals.is_empty());
    }

    #[test]
    fn test_ranking_is_stable_under_ties() {
        let participants = vec![
            make_participant(1000, "EXPO-01"),
            make_participant(1001, "EXPO-02"),
            make_participant(1002, "EXPO-03"),
        ];
        let judges = vec![make_judge(3000)];
        let criteria = design_function_rubric();
        let scores = vec![
            make_score(3000, 1000, 200, 80.0),
            make_score(3000, 1000, 201, 80.0),
            make_score(3000, 1001, 200, 90.0),
            make_score(3000, 1001, 201, 90.0),
            make_score(3000, 1002, 200, 80.0),
            make_score(3000, 1002, 201, 80.0),
        ];

        let matrix = TabulationMatrix::compute(competition_uuid(), &participants, &judges, &criteria, &scores);

        let order = matrix.rows.iter().map(|r| r.participant_uuid).collect_vec();
        assert_eq!(order, vec![Uuid::from_u128(1001), Uuid::from_u128(1000), Uuid::from_u128(1002)]);
    }

    #[test]
    fn test_stale_scores_are_skipped() {
        let participants = vec![make_participant(1000, "EXPO-01")];
        let judges = vec![make_judge(3000)];
        let criteria = design_function_rubric();
        let scores = vec![
            make_score(3000, 1000, 200, 80.0),
            make_score(3000, 1000, 201, 60.0),
            // Deleted criterion, deleted judge, deleted participant.
            make_score(3000, 1000, 999, 100.0),
            make_score(3999, 1000, 200, 100.0),
            make_score(3000, 1999, 200, 100.0),
        ];

        let matrix = TabulationMatrix::compute(competition_uuid(), &participants, &judges, &criteria, &scores);

        assert_eq!(matrix.rows.len(), 1);
        assert_eq!(matrix.rows[0].judge_totals[&Uuid::from_u128(3000)], 70.0);
    }

    #[test]
    fn test_pending_request_is_surfaced_per_judge() {
        let participants = vec![make_participant(1000, "EXPO-01")];
        let judges = vec![make_judge(3000), make_judge(3001)];
        let criteria = design_function_rubric();
        let mut requested = make_score(3000, 1000, 200, 80.0);
        requested.is_locked = true;
        requested.unlock_requested = true;
        let scores = vec![
            requested,
            make_score(3000, 1000, 201, 60.0),
            make_score(3001, 1000, 200, 90.0),
        ];

        let matrix = TabulationMatrix::compute(competition_uuid(), &participants, &judges, &criteria, &scores);

        let row = &matrix.rows[0];
        assert_eq!(row.judge_requests[&Uuid::from_u128(3000)], true);
        assert_eq!(row.judge_requests[&Uuid::from_u128(3001)], false);
    }

    #[test]
    fn test_totals_are_exposed_rounded() {
        let participants = vec![make_participant(1000, "EXPO-01")];
        let judges = vec![make_judge(3000)];
        let criteria = vec![make_criterion(200, "Overall", 100.0)];
        let scores = vec![make_score(3000, 1000, 200, 66.666)];

        let matrix = TabulationMatrix::compute(competition_uuid(), &participants, &judges, &criteria, &scores);

        let row = &matrix.rows[0];
        assert_eq!(row.judge_totals[&Uuid::from_u128(3000)], 66.67);
        assert_eq!(row.final_average, 66.67);
    }

    #[test]
    fn test_rounding_is_idempotent() {
        for value in [0.0, 0.005, 70.004999, 82.5, 99.999] {
            assert_eq!(round_score(round_score(value)), round_score(value));
        }
    }

    #[test]
    fn test_total_stays_in_range_for_full_rubric() {
        let participants = vec![make_participant(1000, "EXPO-01")];
        let judges = vec![make_judge(3000)];
        let criteria = vec![
            make_criterion(200, "Design", 40.0),
            make_criterion(201, "Function", 35.0),
            make_criterion(202, "Presentation", 25.0),
        ];
        let scores = vec![
            make_score(3000, 1000, 200, 100.0),
            make_score(3000, 1000, 201, 100.0),
            make_score(3000, 1000, 202, 100.0),
        ];

        let matrix = TabulationMatrix::compute(competition_uuid(), &participants, &judges, &criteria, &scores);

        let total = matrix.rows[0].judge_totals[&Uuid::from_u128(3000)];
        assert!(total >= 0.0 && total <= 100.0);
        assert_eq!(total, 100.0);
    }
}
