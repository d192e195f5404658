pub use crate::domain::competition::{Competition, CompetitionStatus};
pub use crate::domain::criterion::Criterion;
pub use crate::domain::entity::{CompetitionEntity, LoadEntity};
pub use crate::domain::judge::Judge;
pub use crate::domain::participant::Participant;
pub use crate::domain::score::{Score, Scorecard, ScorecardStatus, ScoreLedgerError};
pub use crate::group::{Entity, EntityChangeSummary, EntityGroup, EntityTypeId};
pub use crate::matrix::{MatrixRow, TabulationMatrix, ANOMALY_VARIANCE_THRESHOLD};
