use thiserror::Error;

use super::bracket::MAX_BRACKET_SIZE;

/// Errors surfaced by tournament operations.
///
/// Every failure is recoverable: the operation is rejected before any state
/// is touched, so the caller can report it and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TournamentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conflict(#[from] StateConflict),
}

/// The request itself is malformed, independent of the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Contestant name must not be empty")]
    EmptyName,

    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Contestant \"{0}\" is already on the roster")]
    DuplicateName(String),

    #[error("Contestant \"{0}\" not found")]
    NotFound(String),

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("Bracket size must be a power of two from 2 to {max}, got {0}", max = MAX_BRACKET_SIZE)]
    InvalidSize(usize),

    #[error("Slot {slot} does not exist in a bracket with {slots} leaf slots")]
    InvalidSlot { slot: usize, slots: usize },

    #[error("Contestant \"{0}\" is not on the roster")]
    UnknownContestant(String),

    #[error("Match {round}/{position} not found")]
    NoSuchMatch { round: usize, position: usize },

    #[error("Round \"{0}\" not found")]
    UnknownRound(String),

    #[error("Match {round}/{position} does not agree with the matches feeding it")]
    InconsistentMatch { round: usize, position: usize },

    #[error("\"{winner}\" is not playing in match {round}/{position}")]
    InvalidWinner {
        round: usize,
        position: usize,
        winner: String,
    },
}

/// The request is well formed but not valid in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateConflict {
    #[error("No bracket has been built yet")]
    NoBracket,

    #[error("Bracket is locked while the tournament is running")]
    BracketLocked,

    #[error("Contestant \"{name}\" is already assigned to slot {slot}; clear it first")]
    AlreadyAssigned { name: String, slot: usize },

    #[error("Roster has {roster} contestants but the bracket needs exactly {slots}")]
    InsufficientContestants { roster: usize, slots: usize },

    #[error("Every bracket slot must be filled before the tournament can start")]
    SeedingIncomplete,

    #[error("Match {round}/{position} is still waiting for contestants")]
    NotReady { round: usize, position: usize },

    #[error("Match {round}/{position} has no winner to undo")]
    NotDecided { round: usize, position: usize },

    #[error("Contestant \"{0}\" is seeded in the bracket; clear the slot or reset the bracket first")]
    ContestantSeeded(String),
}

pub type Result<T> = std::result::Result<T, TournamentError>;
