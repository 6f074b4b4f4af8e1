//! Read-only projections shared by the control panel and the overlay.
//!
//! Everything here is derived from a [`Tournament`](super::Tournament) without
//! touching it, so the same state always projects to the same output.

use serde::{Deserialize, Serialize};

use super::bracket::{Bracket, MatchRef, MatchState, RoundLabel};
use super::progression::{MatchResult, TournamentStatus};
use crate::models::OverlayMode;

/// The match on stage right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentMatch {
    pub round: usize,
    pub round_label: RoundLabel,
    pub position: usize,
    pub contestant1: String,
    pub contestant2: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotView {
    pub occupant: Option<String>,
    /// The earlier match whose winner fills this slot; `None` for seeded slots.
    pub source: Option<MatchRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchView {
    pub position: usize,
    pub state: MatchState,
    pub slots: [SlotView; 2],
    pub winner: Option<String>,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundView {
    pub index: usize,
    pub label: RoundLabel,
    pub matches: Vec<MatchView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketView {
    pub size: usize,
    pub locked: bool,
    pub seeding_complete: bool,
    pub rounds: Vec<RoundView>,
}

/// A match with the two matches feeding it, recursively. The root is the
/// final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchNode {
    pub round: usize,
    pub position: usize,
    pub label: RoundLabel,
    pub state: MatchState,
    pub slots: [Option<String>; 2],
    pub winner: Option<String>,
    pub children: Vec<MatchNode>,
}

/// Point-in-time view of the whole tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentSnapshot {
    pub version: u64,
    pub title: String,
    pub overlay_mode: OverlayMode,
    pub status: TournamentStatus,
    pub current_match: Option<CurrentMatch>,
    pub grand_winner: Option<String>,
    pub last_result: Option<MatchResult>,
    pub roster: Vec<String>,
    pub bracket: Option<BracketView>,
}

impl Bracket {
    pub fn current_match_view(&self) -> Option<CurrentMatch> {
        let at = self.current_match()?;
        let [first, second] = self.get(at)?.slots();
        Some(CurrentMatch {
            round: at.round,
            round_label: self.round_label(at.round),
            position: at.position,
            contestant1: first?.to_string(),
            contestant2: second?.to_string(),
        })
    }

    pub fn view(&self) -> BracketView {
        let current = self.current_match();
        let rounds = self
            .rounds
            .iter()
            .enumerate()
            .map(|(index, matches)| RoundView {
                index,
                label: self.round_label(index),
                matches: matches
                    .iter()
                    .enumerate()
                    .map(|(position, m)| {
                        let at = MatchRef::new(index, position);
                        let slot = |side: usize| SlotView {
                            occupant: m.slots[side].clone(),
                            source: self.feeder(at, side),
                        };
                        MatchView {
                            position,
                            state: m.state(),
                            slots: [slot(0), slot(1)],
                            winner: m.winner.clone(),
                            is_current: current == Some(at),
                        }
                    })
                    .collect(),
            })
            .collect();

        BracketView {
            size: self.size(),
            locked: self.locked,
            seeding_complete: self.is_complete(),
            rounds,
        }
    }

    /// The bracket as a tree rooted at the final.
    pub fn tree(&self) -> MatchNode {
        self.node(MatchRef::new(self.round_count() - 1, 0))
    }

    fn node(&self, at: MatchRef) -> MatchNode {
        let m = &self.rounds[at.round][at.position];
        let children = (0..2)
            .filter_map(|side| self.feeder(at, side))
            .map(|child| self.node(child))
            .collect();
        MatchNode {
            round: at.round,
            position: at.position,
            label: self.round_label(at.round),
            state: m.state(),
            slots: m.slots.clone(),
            winner: m.winner.clone(),
            children,
        }
    }
}
