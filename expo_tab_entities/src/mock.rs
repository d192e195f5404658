use itertools::Itertools;
use sea_orm::prelude::*;

use faker_rand::en_us::company::CompanyName;
use faker_rand::en_us::names::FullName;

use crate::domain::competition::{Competition, CompetitionStatus};
use crate::domain::criterion::Criterion;
use crate::domain::judge::Judge;
use crate::domain::participant::{random_alias, Participant};
use crate::domain::score::Score;
use crate::group::{Entity, EntityGroup};

#[derive(Debug)]
pub struct MockOption {
    pub deterministic_uuids: bool,
    pub num_participants: u32,
    pub num_judges: u32,
    pub use_random_names: bool,
    pub enter_scores: bool,
}

impl Default for MockOption {
    fn default() -> Self {
        Self {
            deterministic_uuids: false,
            num_participants: 9,
            num_judges: 3,
            use_random_names: false,
            enter_scores: true,
        }
    }
}

pub fn make_mock_competition() -> EntityGroup {
    make_mock_competition_with_options(Default::default())
}

pub fn make_mock_competition_with_options(options: MockOption) -> EntityGroup {
    /*
    Competition: 1
    Criteria: 200
    Participants: 1000
    Judges: 3000
    Scores: 10000 + judge * 1000 + participant * 10 + criterion
    */

    let mut groups = EntityGroup::new();

    let competition_uuid = if options.deterministic_uuids { Uuid::from_u128(1) } else { Uuid::new_v4() };
    groups.add(Entity::Competition(Competition {
        uuid: competition_uuid,
        name: "Innovation Expo".into(),
        status: CompetitionStatus::Live,
    }));

    let criteria = [("Design", 40.0), ("Functionality", 35.0), ("Presentation", 25.0)]
        .into_iter()
        .enumerate()
        .map(|(i, (name, weight))| {
            let uuid = if options.deterministic_uuids { Uuid::from_u128(200 + i as u128) } else { Uuid::new_v4() };
            Criterion {
                uuid,
                competition_id: competition_uuid,
                name: name.into(),
                weight_percentage: weight,
            }
        })
        .collect_vec();

    let participants = (0..options.num_participants).map(|i| {
        let uuid = if options.deterministic_uuids { Uuid::from_u128(1000 + i as u128) } else { Uuid::new_v4() };

        let real_name = if options.use_random_names {
            rand::random::<CompanyName>().to_string()
        }
        else {
            format!("Project {}", uuid)
        };
        let alias = if options.use_random_names {
            Some(random_alias())
        }
        else {
            Some(format!("Team {}", i))
        };
        Participant {
            uuid,
            competition_id: competition_uuid,
            real_name,
            alias,
            booth_code: format!("EXPO-{:02}", i + 1),
        }
    }).collect_vec();

    let judges = (0..options.num_judges).map(|i| {
        let uuid = if options.deterministic_uuids { Uuid::from_u128(3000 + i as u128) } else { Uuid::new_v4() };

        let name = if options.use_random_names {
            rand::random::<FullName>().to_string()
        }
        else {
            format!("Judge {}", uuid)
        };
        Judge {
            uuid,
            competition_id: competition_uuid,
            name,
        }
    }).collect_vec();

    if options.enter_scores {
        for (judge_idx, judge) in judges.iter().enumerate() {
            for (participant_idx, participant) in participants.iter().enumerate() {
                for (criterion_idx, criterion) in criteria.iter().enumerate() {
                    let uuid = if options.deterministic_uuids {
                        Uuid::from_u128(10000 + (judge_idx as u128) * 1000 + (participant_idx as u128) * 10 + criterion_idx as u128)
                    }
                    else {
                        Uuid::new_v4()
                    };
                    let value = 60.0 + ((judge_idx + participant_idx * 2 + criterion_idx * 3) % 8) as f64 * 5.0;
                    groups.add(Entity::Score(Score {
                        uuid,
                        competition_id: competition_uuid,
                        judge_id: judge.uuid,
                        participant_id: participant.uuid,
                        criterion_id: criterion.uuid,
                        value,
                        is_locked: false,
                        unlock_requested: false,
                    }));
                }
            }
        }
    }

    criteria.into_iter().for_each(|c| groups.add(Entity::Criterion(c)));
    participants.into_iter().for_each(|p| groups.add(Entity::Participant(p)));
    judges.into_iter().for_each(|j| groups.add(Entity::Judge(j)));

    groups
}
