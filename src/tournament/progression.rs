//! Match progression: recording winners and keeping later rounds consistent.
//!
//! A winner is copied into the slot its match feeds. When a recorded result
//! changes (re-decision or undo), every later match that was decided on the
//! old pairing is reverted: the directly affected match goes back to `Ready`
//! with its new occupant, and each match above it that had consumed a
//! now-withdrawn winner loses that slot and becomes `Pending`.

use serde::{Deserialize, Serialize};

use super::bracket::{Bracket, Match, MatchRef, MatchState, RoundLabel};
use super::error::{Result, StateConflict, ValidationError};

/// Overall tournament progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    NotStarted,
    InProgress,
    Complete,
}

/// A recorded match decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub round: usize,
    pub position: usize,
    pub round_label: RoundLabel,
    pub winner: String,
    pub loser: String,
}

impl Bracket {
    pub fn state_of(&self, at: MatchRef) -> Option<MatchState> {
        self.get(at).map(|m| m.state())
    }

    /// The next match to play: the first `Ready` match in play order.
    ///
    /// Nothing is playable until seeding is complete.
    pub fn current_match(&self) -> Option<MatchRef> {
        if !self.locked && !self.is_complete() {
            return None;
        }
        self.play_order()
            .find(|&at| self.state_of(at) == Some(MatchState::Ready))
    }

    pub fn status(&self) -> TournamentStatus {
        if self.final_match().winner.is_some() {
            TournamentStatus::Complete
        } else if self.locked {
            TournamentStatus::InProgress
        } else {
            TournamentStatus::NotStarted
        }
    }

    pub fn grand_winner(&self) -> Option<&str> {
        self.final_match().winner()
    }

    /// Record `winner` for the match at `at` and move them on.
    ///
    /// The first result on an unlocked bracket starts the tournament, which
    /// requires complete seeding.
    pub fn record_winner(&mut self, at: MatchRef, winner: &str) -> Result<MatchResult> {
        let current = self.require(at)?;
        if current.state() == MatchState::Pending {
            return Err(StateConflict::NotReady {
                round: at.round,
                position: at.position,
            }
            .into());
        }
        let loser = current
            .opponent_of(winner)
            .ok_or_else(|| ValidationError::InvalidWinner {
                round: at.round,
                position: at.position,
                winner: winner.to_string(),
            })?
            .to_string();
        if !self.locked {
            self.lock()?;
        }

        let decided = self.match_at(at);
        if decided.winner.as_deref() != Some(winner) {
            decided.winner = Some(winner.to_string());
            self.advance(at, Some(winner.to_string()));
        }

        Ok(MatchResult {
            round: at.round,
            position: at.position,
            round_label: self.round_label(at.round),
            winner: winner.to_string(),
            loser,
        })
    }

    /// Withdraw the recorded winner of `at`, returning it to `Ready`.
    pub fn undo_winner(&mut self, at: MatchRef) -> Result<String> {
        let current = self.require(at)?;
        if current.winner.is_none() {
            return Err(StateConflict::NotDecided {
                round: at.round,
                position: at.position,
            }
            .into());
        }
        let previous = self.match_at(at).winner.take().unwrap_or_default();
        self.advance(at, None);
        Ok(previous)
    }

    /// Write `occupant` into the slot fed by `from`, reverting every later
    /// match that was decided on what the slot held before.
    fn advance(&mut self, from: MatchRef, occupant: Option<String>) {
        let mut from = from;
        let mut occupant = occupant;
        while let Some((parent, side)) = self.parent(from) {
            let target = self.match_at(parent);
            if target.slots[side] == occupant {
                break;
            }
            target.slots[side] = occupant;
            if target.winner.take().is_none() {
                break;
            }
            tracing::debug!(%parent, "reverted decided match after upstream change");
            from = parent;
            occupant = None;
        }
    }

    fn match_at(&mut self, at: MatchRef) -> &mut Match {
        // Callers have already resolved `at` through `require` or `parent`.
        &mut self.rounds[at.round][at.position]
    }

    /// Clear every occupant and winner, seeds included, and unlock.
    pub fn reset(&mut self) {
        for m in self.rounds.iter_mut().flatten() {
            m.slots = [None, None];
            m.winner = None;
        }
        self.locked = false;
    }

    /// Clear results but keep the seeding, so the same draw can be replayed.
    pub fn clear_results(&mut self) {
        for (round, matches) in self.rounds.iter_mut().enumerate() {
            for m in matches {
                if round > 0 {
                    m.slots = [None, None];
                }
                m.winner = None;
            }
        }
        self.locked = false;
    }

    /// Check that results agree with the slots they were decided on: every
    /// winner plays in its own match, and every later-round slot holds its
    /// feeder's winner.
    pub fn validate_progress(&self) -> std::result::Result<(), ValidationError> {
        for at in self.play_order() {
            let m = &self.rounds[at.round][at.position];
            let inconsistent = ValidationError::InconsistentMatch {
                round: at.round,
                position: at.position,
            };
            if let Some(winner) = m.winner() {
                if m.opponent_of(winner).is_none() {
                    return Err(inconsistent);
                }
            }
            for side in 0..2 {
                let Some(feeder) = self.feeder(at, side) else {
                    continue;
                };
                let fed = self.get(feeder).and_then(Match::winner);
                if m.slots[side].as_deref() != fed {
                    return Err(inconsistent);
                }
            }
        }
        Ok(())
    }
}
