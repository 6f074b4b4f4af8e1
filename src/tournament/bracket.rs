use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::ValidationError;

/// Address of a match: round index (0 = first round played) and position
/// within that round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchRef {
    pub round: usize,
    pub position: usize,
}

impl MatchRef {
    pub fn new(round: usize, position: usize) -> Self {
        Self { round, position }
    }
}

impl fmt::Display for MatchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.round, self.position)
    }
}

/// Lifecycle of a single match.
///
/// - `Pending`: at least one slot is still empty
/// - `Ready`: both contestants known, no winner yet
/// - `Decided`: a winner has been recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    Pending,
    Ready,
    Decided,
}

/// Display name of a round, derived from its distance to the final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundLabel {
    Preliminary,
    /// Intermediate round of a large bracket, carrying the number of
    /// contestants that enter it.
    RoundOf(usize),
    Quarterfinal,
    Semifinal,
    Final,
}

impl RoundLabel {
    pub fn for_round(round: usize, round_count: usize) -> Self {
        let from_final = round_count.saturating_sub(round + 1);
        match from_final {
            0 => Self::Final,
            1 => Self::Semifinal,
            2 => Self::Quarterfinal,
            _ if round == 0 => Self::Preliminary,
            n => Self::RoundOf(2usize << n),
        }
    }
}

impl fmt::Display for RoundLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preliminary => f.write_str("preliminary"),
            Self::RoundOf(n) => write!(f, "round_of_{n}"),
            Self::Quarterfinal => f.write_str("quarterfinal"),
            Self::Semifinal => f.write_str("semifinal"),
            Self::Final => f.write_str("final"),
        }
    }
}

impl FromStr for RoundLabel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preliminary" => Ok(Self::Preliminary),
            "quarterfinal" => Ok(Self::Quarterfinal),
            "semifinal" => Ok(Self::Semifinal),
            "final" => Ok(Self::Final),
            other => other
                .strip_prefix("round_of_")
                .and_then(|n| n.parse().ok())
                .map(Self::RoundOf)
                .ok_or_else(|| ValidationError::UnknownRound(other.to_string())),
        }
    }
}

impl Serialize for RoundLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RoundLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Two slots and, once played, the winner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub(crate) slots: [Option<String>; 2],
    pub(crate) winner: Option<String>,
}

impl Match {
    pub fn slots(&self) -> [Option<&str>; 2] {
        [self.slots[0].as_deref(), self.slots[1].as_deref()]
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn state(&self) -> MatchState {
        if self.winner.is_some() {
            MatchState::Decided
        } else if self.slots.iter().all(Option::is_some) {
            MatchState::Ready
        } else {
            MatchState::Pending
        }
    }

    /// The other contestant, if `name` occupies one of the slots.
    pub fn opponent_of(&self, name: &str) -> Option<&str> {
        match self.slots() {
            [Some(a), b] if a == name => b,
            [a, Some(b)] if b == name => a,
            _ => None,
        }
    }
}

/// Largest bracket the server will build.
pub const MAX_BRACKET_SIZE: usize = 256;

/// Single-elimination bracket.
///
/// `rounds[0]` holds the seeded matches; every later round has half as many
/// matches, ending in the one-match final. Slot `side` of match `(r, p)` for
/// `r > 0` is fed by the winner of match `(r - 1, 2p + side)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub(crate) rounds: Vec<Vec<Match>>,
    /// Set once the tournament starts; seeding is frozen while locked.
    #[serde(default)]
    pub(crate) locked: bool,
}

impl Bracket {
    /// Build an empty bracket for `size` contestants.
    pub fn build(size: usize) -> Result<Self, ValidationError> {
        if !(2..=MAX_BRACKET_SIZE).contains(&size) || !size.is_power_of_two() {
            return Err(ValidationError::InvalidSize(size));
        }
        let round_count = size.trailing_zeros() as usize;
        let rounds = (0..round_count)
            .map(|round| vec![Match::default(); size >> (round + 1)])
            .collect();
        Ok(Self {
            rounds,
            locked: false,
        })
    }

    /// Check the structural invariants of a bracket restored from storage.
    pub fn validate_shape(&self) -> Result<(), ValidationError> {
        let first = self.rounds.first().map(Vec::len).unwrap_or(0);
        let size = first * 2;
        if !(2..=MAX_BRACKET_SIZE).contains(&size) || !size.is_power_of_two() {
            return Err(ValidationError::InvalidSize(size));
        }
        if self.rounds.len() != size.trailing_zeros() as usize {
            return Err(ValidationError::InvalidSize(size));
        }
        for (round, matches) in self.rounds.iter().enumerate() {
            if matches.len() != size >> (round + 1) {
                return Err(ValidationError::InvalidSize(size));
            }
        }
        Ok(())
    }

    /// Number of contestants the bracket seats.
    pub fn size(&self) -> usize {
        self.rounds[0].len() * 2
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn match_count(&self) -> usize {
        self.rounds.iter().map(Vec::len).sum()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn round(&self, round: usize) -> Option<&[Match]> {
        self.rounds.get(round).map(Vec::as_slice)
    }

    pub fn round_label(&self, round: usize) -> RoundLabel {
        RoundLabel::for_round(round, self.rounds.len())
    }

    /// Index of the round carrying `label` in this bracket.
    pub fn round_index(&self, label: &str) -> Result<usize, ValidationError> {
        let wanted: RoundLabel = label.parse()?;
        (0..self.rounds.len())
            .find(|&round| self.round_label(round) == wanted)
            .ok_or_else(|| ValidationError::UnknownRound(label.to_string()))
    }

    pub fn get(&self, at: MatchRef) -> Option<&Match> {
        self.rounds.get(at.round)?.get(at.position)
    }

    pub(crate) fn get_mut(&mut self, at: MatchRef) -> Option<&mut Match> {
        self.rounds.get_mut(at.round)?.get_mut(at.position)
    }

    pub(crate) fn require(&self, at: MatchRef) -> Result<&Match, ValidationError> {
        self.get(at).ok_or(ValidationError::NoSuchMatch {
            round: at.round,
            position: at.position,
        })
    }

    /// Match whose winner feeds slot `side` of `at`; `None` for seeded slots.
    pub fn feeder(&self, at: MatchRef, side: usize) -> Option<MatchRef> {
        (at.round > 0).then(|| MatchRef::new(at.round - 1, at.position * 2 + side))
    }

    /// The next-round match and slot the winner of `at` moves into.
    pub fn parent(&self, at: MatchRef) -> Option<(MatchRef, usize)> {
        (at.round + 1 < self.rounds.len())
            .then(|| (MatchRef::new(at.round + 1, at.position / 2), at.position % 2))
    }

    pub fn final_match(&self) -> &Match {
        &self.rounds[self.rounds.len() - 1][0]
    }

    /// All match references in play order: earliest round first, then by
    /// position.
    pub fn play_order(&self) -> impl Iterator<Item = MatchRef> + '_ {
        self.rounds.iter().enumerate().flat_map(|(round, matches)| {
            (0..matches.len()).map(move |position| MatchRef::new(round, position))
        })
    }
}
