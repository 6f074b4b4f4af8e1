//! Tournament state machine.
//!
//! [`Tournament`] is the single versioned value that the control panel
//! mutates and the overlay reads: roster, bracket, display settings and the
//! last decision. Every successful mutation bumps [`Tournament::version`];
//! failed operations are rejected before anything changes.
//!
//! # Lifecycle
//!
//! roster → [`build_bracket`](Tournament::build_bracket) → seeding
//! ([`assign`](Tournament::assign) / [`assign_random`](Tournament::assign_random))
//! → [`start`](Tournament::start) → [`record_winner`](Tournament::record_winner)
//! until the final is decided. [`reset_bracket`](Tournament::reset_bracket)
//! empties the bracket in place; building again discards it.

mod bracket;
mod error;
mod progression;
mod roster;
mod seeding;
mod snapshot;

pub use bracket::{Bracket, Match, MatchRef, MatchState, RoundLabel, MAX_BRACKET_SIZE};
pub use error::{Result, StateConflict, TournamentError, ValidationError};
pub use progression::{MatchResult, TournamentStatus};
pub use roster::Roster;
pub use snapshot::{
    BracketView, CurrentMatch, MatchNode, MatchView, RoundView, SlotView, TournamentSnapshot,
};

use rand::Rng;
use serde::Serialize;

use crate::models::{OverlayMode, TournamentSettings};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tournament {
    roster: Roster,
    bracket: Option<Bracket>,
    settings: TournamentSettings,
    last_result: Option<MatchResult>,
    version: u64,
}

impl Tournament {
    /// Reassemble a tournament from persisted parts, checking the bracket
    /// shape, that every seeded contestant is still on the roster, and that
    /// recorded results agree with the slots.
    pub fn restore(
        roster: Roster,
        bracket: Option<Bracket>,
        settings: TournamentSettings,
        last_result: Option<MatchResult>,
        version: u64,
    ) -> std::result::Result<Self, ValidationError> {
        if let Some(bracket) = &bracket {
            bracket.validate_shape()?;
            bracket.validate_progress()?;
            for slot in 0..bracket.leaf_slot_count() {
                if let Some(name) = bracket.leaf_occupant(slot) {
                    if !roster.contains(name) {
                        return Err(ValidationError::UnknownContestant(name.to_string()));
                    }
                }
            }
        }
        Ok(Self {
            roster,
            bracket,
            settings,
            last_result,
            version,
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn bracket(&self) -> Option<&Bracket> {
        self.bracket.as_ref()
    }

    pub fn settings(&self) -> &TournamentSettings {
        &self.settings
    }

    pub fn last_result(&self) -> Option<&MatchResult> {
        self.last_result.as_ref()
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    fn bracket_ref(&self) -> Result<&Bracket> {
        self.bracket.as_ref().ok_or(StateConflict::NoBracket.into())
    }

    fn bracket_mut(&mut self) -> Result<&mut Bracket> {
        self.bracket.as_mut().ok_or(StateConflict::NoBracket.into())
    }

    // ============================================================
    // Roster
    // ============================================================

    pub fn add_contestant(&mut self, name: &str) -> Result<String> {
        let name = self.roster.add(name)?;
        self.touch();
        Ok(name)
    }

    /// Remove a contestant. Seeded contestants must be cleared from the
    /// bracket first.
    pub fn remove_contestant(&mut self, name: &str) -> Result<()> {
        if !self.roster.contains(name) {
            return Err(ValidationError::NotFound(name.to_string()).into());
        }
        self.check_not_seeded(|seeded| seeded == name)?;
        self.roster.remove(name)?;
        self.touch();
        Ok(())
    }

    pub fn replace_roster<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let incoming = Roster::from_names(names)?;
        self.swap_roster(incoming)
    }

    /// Replace the roster with `count` generated demo robots.
    pub fn generate_test_roster(&mut self, count: usize) -> Result<&[String]> {
        let incoming = Roster::generate_test_roster(count)?;
        self.swap_roster(incoming)?;
        Ok(self.roster.list())
    }

    fn swap_roster(&mut self, incoming: Roster) -> Result<()> {
        self.check_not_seeded(|seeded| !incoming.contains(seeded))?;
        self.roster = incoming;
        self.touch();
        Ok(())
    }

    /// Fail with `ContestantSeeded` for the first seeded name matching
    /// `would_orphan`.
    fn check_not_seeded(&self, would_orphan: impl Fn(&str) -> bool) -> Result<()> {
        let Some(bracket) = &self.bracket else {
            return Ok(());
        };
        let orphan = (0..bracket.leaf_slot_count())
            .filter_map(|slot| bracket.leaf_occupant(slot))
            .find(|name| would_orphan(name));
        match orphan {
            Some(name) => Err(StateConflict::ContestantSeeded(name.to_string()).into()),
            None => Ok(()),
        }
    }

    // ============================================================
    // Bracket and seeding
    // ============================================================

    /// Build a fresh bracket, discarding any previous one and its results.
    pub fn build_bracket(&mut self, size: usize) -> Result<&Bracket> {
        let bracket = Bracket::build(size)?;
        self.last_result = None;
        self.touch();
        Ok(self.bracket.insert(bracket))
    }

    /// Empty every slot and result while keeping the bracket shape.
    pub fn reset_bracket(&mut self) -> Result<()> {
        self.bracket_mut()?.reset();
        self.last_result = None;
        self.touch();
        Ok(())
    }

    /// Clear results but keep the seeding.
    pub fn clear_results(&mut self) -> Result<()> {
        self.bracket_mut()?.clear_results();
        self.last_result = None;
        self.touch();
        Ok(())
    }

    pub fn assign(&mut self, slot: usize, name: &str) -> Result<()> {
        let bracket = self.bracket.as_mut().ok_or(StateConflict::NoBracket)?;
        bracket.assign(slot, name, &self.roster)?;
        self.touch();
        Ok(())
    }

    pub fn unassign(&mut self, slot: usize) -> Result<Option<String>> {
        let previous = self.bracket_mut()?.unassign(slot)?;
        self.touch();
        Ok(previous)
    }

    pub fn assign_random(&mut self) -> Result<()> {
        self.assign_random_with(&mut rand::thread_rng())
    }

    pub fn assign_random_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let bracket = self.bracket.as_mut().ok_or(StateConflict::NoBracket)?;
        bracket.assign_random(&self.roster, rng)?;
        self.touch();
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.bracket.as_ref().is_some_and(Bracket::is_complete)
    }

    /// Lock the seeding and open play. Starting twice is harmless.
    pub fn start(&mut self) -> Result<()> {
        let bracket = self.bracket_mut()?;
        if bracket.is_locked() {
            return Ok(());
        }
        bracket.lock()?;
        self.touch();
        Ok(())
    }

    // ============================================================
    // Progression
    // ============================================================

    pub fn record_winner(&mut self, at: MatchRef, winner: &str) -> Result<MatchResult> {
        let result = self.bracket_mut()?.record_winner(at, winner)?;
        self.last_result = Some(result.clone());
        self.touch();
        Ok(result)
    }

    pub fn undo_winner(&mut self, at: MatchRef) -> Result<String> {
        let previous = self.bracket_mut()?.undo_winner(at)?;
        self.drop_stale_result();
        self.touch();
        Ok(previous)
    }

    /// Forget the last result once the match it names no longer holds it.
    fn drop_stale_result(&mut self) {
        let still_holds = match (&self.last_result, &self.bracket) {
            (Some(last), Some(bracket)) => bracket
                .get(MatchRef::new(last.round, last.position))
                .and_then(Match::winner)
                == Some(last.winner.as_str()),
            _ => false,
        };
        if !still_holds {
            self.last_result = None;
        }
    }

    pub fn current_match(&self) -> Option<CurrentMatch> {
        self.bracket.as_ref()?.current_match_view()
    }

    pub fn status(&self) -> TournamentStatus {
        self.bracket
            .as_ref()
            .map_or(TournamentStatus::NotStarted, Bracket::status)
    }

    pub fn grand_winner(&self) -> Option<&str> {
        self.bracket.as_ref()?.grand_winner()
    }

    // ============================================================
    // Settings
    // ============================================================

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        self.settings.title = title.to_string();
        self.touch();
        Ok(())
    }

    pub fn set_overlay_mode(&mut self, mode: OverlayMode) -> Result<()> {
        self.settings.overlay_mode = mode;
        self.touch();
        Ok(())
    }

    /// Wipe roster, bracket and settings. The version keeps counting up so
    /// pollers notice the wipe.
    pub fn reset_all(&mut self) {
        *self = Self {
            version: self.version + 1,
            ..Self::default()
        };
    }

    // ============================================================
    // Projection
    // ============================================================

    pub fn snapshot(&self) -> TournamentSnapshot {
        TournamentSnapshot {
            version: self.version,
            title: self.settings.title.clone(),
            overlay_mode: self.settings.overlay_mode,
            status: self.status(),
            current_match: self.current_match(),
            grand_winner: self.grand_winner().map(str::to_string),
            last_result: self.last_result.clone(),
            roster: self.roster.list().to_vec(),
            bracket: self.bracket.as_ref().map(Bracket::view),
        }
    }

    pub fn tree(&self) -> Result<MatchNode> {
        Ok(self.bracket_ref()?.tree())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn ready_tournament(size: usize) -> Tournament {
        let mut t = Tournament::default();
        t.generate_test_roster(size).unwrap();
        t.build_bracket(size).unwrap();
        t.assign_random_with(&mut StdRng::seed_from_u64(3)).unwrap();
        t
    }

    #[test]
    fn failed_operations_leave_version_untouched() {
        let mut t = Tournament::default();
        t.add_contestant("Bumm-Bot").unwrap();
        let version = t.version();

        assert!(t.add_contestant("Bumm-Bot").is_err());
        assert!(t.remove_contestant("Ghost").is_err());
        assert!(t.build_bracket(3).is_err());
        assert!(t.assign(0, "Bumm-Bot").is_err());
        assert!(t.set_title("  ").is_err());
        assert_eq!(t.version(), version);
    }

    #[test]
    fn seeding_without_a_bracket_is_a_conflict() {
        let mut t = Tournament::default();
        assert_eq!(
            t.assign_random(),
            Err(TournamentError::Conflict(StateConflict::NoBracket))
        );
        assert_eq!(
            t.start(),
            Err(TournamentError::Conflict(StateConflict::NoBracket))
        );
    }

    #[test]
    fn seeded_contestants_cannot_leave_the_roster() {
        let mut t = ready_tournament(4);
        let seeded = t.bracket().unwrap().leaf_occupant(2).unwrap().to_string();

        assert_eq!(
            t.remove_contestant(&seeded),
            Err(TournamentError::Conflict(StateConflict::ContestantSeeded(
                seeded.clone()
            )))
        );
        assert!(matches!(
            t.replace_roster(["Dosen-Drache", "Klebeband-Koloss"]),
            Err(TournamentError::Conflict(StateConflict::ContestantSeeded(_)))
        ));
        assert_eq!(t.roster().len(), 4);

        t.reset_bracket().unwrap();
        t.remove_contestant(&seeded).unwrap();
        assert!(!t.roster().contains(&seeded));
    }

    #[test]
    fn start_requires_complete_seeding() {
        let mut t = Tournament::default();
        t.generate_test_roster(4).unwrap();
        t.build_bracket(4).unwrap();
        t.assign(0, "Crash-Dummy").unwrap();
        assert_eq!(
            t.start(),
            Err(TournamentError::Conflict(StateConflict::SeedingIncomplete))
        );
        assert_eq!(t.status(), TournamentStatus::NotStarted);
    }

    #[test]
    fn record_winner_sets_last_result_and_undo_clears_it() {
        let mut t = ready_tournament(4);
        let current = t.current_match().unwrap();
        let at = MatchRef::new(current.round, current.position);

        let result = t.record_winner(at, &current.contestant2).unwrap();
        assert_eq!(result.loser, current.contestant1);
        assert_eq!(t.last_result(), Some(&result));

        t.undo_winner(at).unwrap();
        assert_eq!(t.last_result(), None);
    }

    #[test]
    fn snapshot_is_stable_without_mutation() {
        let mut t = ready_tournament(8);
        let current = t.current_match().unwrap();
        t.record_winner(MatchRef::new(0, 0), &current.contestant1)
            .unwrap();

        let first = t.snapshot();
        let second = t.snapshot();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first.version, t.version());
    }

    #[test]
    fn reset_all_keeps_version_monotonic() {
        let mut t = ready_tournament(4);
        t.set_title("Hebocon Berlin").unwrap();
        let before = t.version();
        t.reset_all();

        assert!(t.version() > before);
        assert!(t.roster().is_empty());
        assert!(t.bracket().is_none());
        assert_eq!(t.settings(), &TournamentSettings::default());
    }

    #[test]
    fn restore_rejects_seeds_missing_from_roster() {
        let t = ready_tournament(4);
        let err = Tournament::restore(
            Roster::default(),
            t.bracket().cloned(),
            TournamentSettings::default(),
            None,
            t.version(),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::UnknownContestant(_)));
    }

    #[test]
    fn restore_rejects_results_that_disagree_with_slots() {
        let t = ready_tournament(4);
        let mut bracket = t.bracket().cloned().unwrap();
        bracket.rounds[1][0].winner = Some(t.roster().list()[0].clone());

        let err = Tournament::restore(
            t.roster().clone(),
            Some(bracket),
            TournamentSettings::default(),
            None,
            t.version(),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::InconsistentMatch { round: 1, position: 0 });
    }

    #[test]
    fn invalid_replacement_keeps_the_old_roster() {
        let mut t = Tournament::default();
        t.replace_roster(["Alu-Adler", "Blech-Bär"]).unwrap();
        let version = t.version();

        let err = t.replace_roster(["Chrom-Chamäleon", "Draht-Dachs", "Chrom-Chamäleon"]).unwrap_err();
        assert!(matches!(err, TournamentError::Validation(ValidationError::InvalidRoster(_))));
        assert_eq!(t.roster().list(), ["Alu-Adler", "Blech-Bär"]);
        assert_eq!(t.version(), version);
    }
}
