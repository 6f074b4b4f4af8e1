use serde::{Deserialize, Serialize};

use crate::tournament::{Bracket, MatchRef, ValidationError};

/// Input for building a bracket. `size` defaults to the roster size.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildBracketInput {
    #[serde(default)]
    pub size: Option<usize>,
}

/// Input for seeding one first-round slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignSlotInput {
    pub slot: usize,
    pub name: String,
}

/// A round given either by index (`0` = first round) or by label
/// (`"quarterfinal"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoundSelector {
    Index(usize),
    Label(String),
}

impl RoundSelector {
    pub fn resolve(&self, bracket: &Bracket) -> Result<usize, ValidationError> {
        match self {
            Self::Index(round) => Ok(*round),
            Self::Label(label) => bracket.round_index(label),
        }
    }
}

/// Input for recording a match winner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordWinnerInput {
    pub round: RoundSelector,
    pub position: usize,
    pub winner: String,
}

/// Input for withdrawing a recorded winner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoWinnerInput {
    pub round: RoundSelector,
    pub position: usize,
}

impl RecordWinnerInput {
    pub fn match_ref(&self, bracket: &Bracket) -> Result<MatchRef, ValidationError> {
        Ok(MatchRef::new(self.round.resolve(bracket)?, self.position))
    }
}

impl UndoWinnerInput {
    pub fn match_ref(&self, bracket: &Bracket) -> Result<MatchRef, ValidationError> {
        Ok(MatchRef::new(self.round.resolve(bracket)?, self.position))
    }
}

/// Cheap polling handle: compare against the last seen value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionResponse {
    pub version: u64,
}

/// Query for conditional snapshot polling.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotQuery {
    pub since: Option<u64>,
}
