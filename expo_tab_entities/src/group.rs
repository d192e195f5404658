use std::collections::{HashMap, HashSet};

use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{competition::Competition, criterion::Criterion, entity::CompetitionEntity, judge::Judge, participant::Participant, score::Score};
use crate::schema;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
pub enum EntityTypeId {
    Competition,
    Criterion,
    Participant,
    Judge,
    Score,
}

impl EntityTypeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityTypeId::Competition => "Competition",
            EntityTypeId::Criterion => "Criterion",
            EntityTypeId::Participant => "Participant",
            EntityTypeId::Judge => "Judge",
            EntityTypeId::Score => "Score",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub enum Entity {
    Competition(Competition),
    Criterion(Criterion),
    Participant(Participant),
    Judge(Judge),
    Score(Score),
}

impl Entity {
    pub fn get_uuid(&self) -> Uuid {
        match self {
            Entity::Competition(c) => c.uuid,
            Entity::Criterion(c) => c.uuid,
            Entity::Participant(p) => p.uuid,
            Entity::Judge(j) => j.uuid,
            Entity::Score(s) => s.uuid,
        }
    }

    pub fn get_type(&self) -> EntityTypeId {
        match self {
            Entity::Competition(_) => EntityTypeId::Competition,
            Entity::Criterion(_) => EntityTypeId::Criterion,
            Entity::Participant(_) => EntityTypeId::Participant,
            Entity::Judge(_) => EntityTypeId::Judge,
            Entity::Score(_) => EntityTypeId::Score,
        }
    }
}

/// What a saved [`EntityGroup`] touched: which entity types changed and
/// which competitions were affected. This is all a change notification
/// carries; consumers re-fetch rather than trusting a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityChangeSummary {
    pub changed_types: HashSet<EntityTypeId>,
    pub competition_ids: HashSet<Uuid>,
}

impl EntityChangeSummary {
    pub fn has_changes_for_type(&self, type_: EntityTypeId) -> bool {
        self.changed_types.contains(&type_)
    }

    pub fn touches_competition(&self, competition_id: Uuid) -> bool {
        self.competition_ids.contains(&competition_id)
    }
}

/// The single write funnel of the system. Every mutation is expressed as
/// a batch of entity upserts and deletes, saved in one call so that one
/// change summary can be produced for the notification path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityGroup {
    pub competitions: Vec<Competition>,
    pub criteria: Vec<Criterion>,
    pub participants: Vec<Participant>,
    pub judges: Vec<Judge>,
    pub scores: Vec<Score>,
    pub deletes: Vec<(EntityTypeId, Uuid)>,
}

impl EntityGroup {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn new_with_entities(entities: Vec<Entity>) -> Self {
        let mut group = Self::new();
        entities.into_iter().for_each(|e| group.add(e));
        group
    }

    pub fn add(&mut self, e: Entity) {
        match e {
            Entity::Competition(c) => self.competitions.push(c),
            Entity::Criterion(c) => self.criteria.push(c),
            Entity::Participant(p) => self.participants.push(p),
            Entity::Judge(j) => self.judges.push(j),
            Entity::Score(s) => self.scores.push(s),
        }
    }

    pub fn delete(&mut self, type_: EntityTypeId, uuid: Uuid) {
        self.deletes.push((type_, uuid));
    }

    pub fn has_changes_for_type(&self, type_: EntityTypeId) -> bool {
        let has_upserts = match type_ {
            EntityTypeId::Competition => !self.competitions.is_empty(),
            EntityTypeId::Criterion => !self.criteria.is_empty(),
            EntityTypeId::Participant => !self.participants.is_empty(),
            EntityTypeId::Judge => !self.judges.is_empty(),
            EntityTypeId::Score => !self.scores.is_empty(),
        };
        has_upserts || self.deletes.iter().any(|(t, _)| *t == type_)
    }

    fn changed_types(&self) -> HashSet<EntityTypeId> {
        [
            EntityTypeId::Competition,
            EntityTypeId::Criterion,
            EntityTypeId::Participant,
            EntityTypeId::Judge,
            EntityTypeId::Score,
        ]
        .into_iter()
        .filter(|t| self.has_changes_for_type(*t))
        .collect()
    }

    fn deletes_by_type(&self) -> HashMap<EntityTypeId, Vec<Uuid>> {
        let mut out: HashMap<EntityTypeId, Vec<Uuid>> = HashMap::new();
        for (type_, uuid) in &self.deletes {
            out.entry(*type_).or_default().push(*uuid);
        }
        out
    }

    /// All competitions this group touches. Deleted rows are resolved
    /// against the store, so this must run before the deletes are
    /// executed; rows already gone are skipped.
    pub async fn get_all_competitions<C>(&self, db: &C) -> Result<HashSet<Uuid>, anyhow::Error> where C: ConnectionTrait {
        let mut out: HashSet<Uuid> = HashSet::new();

        out.extend(self.competitions.iter().map(|c| c.uuid));
        out.extend(self.criteria.iter().map(|c| c.competition_id));
        out.extend(self.participants.iter().map(|p| p.competition_id));
        out.extend(self.judges.iter().map(|j| j.competition_id));
        out.extend(self.scores.iter().map(|s| s.competition_id));

        for (type_, uuids) in self.deletes_by_type() {
            match type_ {
                EntityTypeId::Competition => {
                    out.extend(uuids);
                },
                EntityTypeId::Criterion => {
                    let rows = schema::criterion::Entity::find()
                        .filter(schema::criterion::Column::Uuid.is_in(uuids))
                        .all(db).await?;
                    out.extend(rows.into_iter().map(|r| r.competition_id));
                },
                EntityTypeId::Participant => {
                    let rows = schema::participant::Entity::find()
                        .filter(schema::participant::Column::Uuid.is_in(uuids))
                        .all(db).await?;
                    out.extend(rows.into_iter().map(|r| r.competition_id));
                },
                EntityTypeId::Judge => {
                    let rows = schema::judge::Entity::find()
                        .filter(schema::judge::Column::Uuid.is_in(uuids))
                        .all(db).await?;
                    out.extend(rows.into_iter().map(|r| r.competition_id));
                },
                EntityTypeId::Score => {
                    let rows = schema::score::Entity::find()
                        .filter(schema::score::Column::Uuid.is_in(uuids))
                        .all(db).await?;
                    out.extend(rows.into_iter().map(|r| r.competition_id));
                },
            }
        }

        Ok(out)
    }

    pub async fn save_all<C>(&self, db: &C) -> Result<EntityChangeSummary, anyhow::Error> where C: ConnectionTrait {
        self.save_all_with_options(db, false).await
    }

    pub async fn save_all_with_options<C>(&self, db: &C, guarantee_insert: bool) -> Result<EntityChangeSummary, anyhow::Error> where C: ConnectionTrait {
        let competition_ids = self.get_all_competitions(db).await?;

        // Referential dependency order: competitions first, scores last.
        for competition in &self.competitions {
            competition.save(db, guarantee_insert).await?;
        }
        for criterion in &self.criteria {
            criterion.save(db, guarantee_insert).await?;
        }
        for participant in &self.participants {
            participant.save(db, guarantee_insert).await?;
        }
        for judge in &self.judges {
            judge.save(db, guarantee_insert).await?;
        }
        for score in &self.scores {
            score.save(db, guarantee_insert).await?;
        }

        for (type_, uuids) in self.deletes_by_type() {
            match type_ {
                EntityTypeId::Competition => {
                    schema::competition::Entity::delete_many()
                        .filter(schema::competition::Column::Uuid.is_in(uuids))
                        .exec(db).await?;
                },
                EntityTypeId::Criterion => {
                    schema::criterion::Entity::delete_many()
                        .filter(schema::criterion::Column::Uuid.is_in(uuids))
                        .exec(db).await?;
                },
                EntityTypeId::Participant => {
                    schema::participant::Entity::delete_many()
                        .filter(schema::participant::Column::Uuid.is_in(uuids))
                        .exec(db).await?;
                },
                EntityTypeId::Judge => {
                    schema::judge::Entity::delete_many()
                        .filter(schema::judge::Column::Uuid.is_in(uuids))
                        .exec(db).await?;
                },
                EntityTypeId::Score => {
                    schema::score::Entity::delete_many()
                        .filter(schema::score::Column::Uuid.is_in(uuids))
                        .exec(db).await?;
                },
            }
        }

        Ok(EntityChangeSummary {
            changed_types: self.changed_types(),
            competition_ids,
        })
    }
}
