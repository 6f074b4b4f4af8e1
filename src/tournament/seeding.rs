//! Placing contestants into the first-round slots.
//!
//! Leaf slots are numbered `0..size`: slot `i` is side `i % 2` of first-round
//! match `i / 2`. Manual placement never moves a contestant implicitly; a
//! contestant already seeded elsewhere must be cleared from that slot first.

use rand::seq::SliceRandom;
use rand::Rng;

use super::bracket::Bracket;
use super::error::{Result, StateConflict, ValidationError};
use super::roster::Roster;

impl Bracket {
    pub fn leaf_slot_count(&self) -> usize {
        self.size()
    }

    /// Contestant currently seeded in leaf `slot`.
    pub fn leaf_occupant(&self, slot: usize) -> Option<&str> {
        self.rounds[0]
            .get(slot / 2)
            .and_then(|m| m.slots[slot % 2].as_deref())
    }

    /// Leaf slot holding `name`, if any.
    pub fn seeded_slot_of(&self, name: &str) -> Option<usize> {
        (0..self.leaf_slot_count()).find(|&slot| self.leaf_occupant(slot) == Some(name))
    }

    /// True when every leaf slot holds a distinct contestant.
    pub fn is_complete(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        (0..self.leaf_slot_count()).all(|slot| match self.leaf_occupant(slot) {
            Some(name) => seen.insert(name),
            None => false,
        })
    }

    fn check_unlocked(&self) -> Result<()> {
        if self.locked {
            return Err(StateConflict::BracketLocked.into());
        }
        Ok(())
    }

    fn check_slot(&self, slot: usize) -> Result<()> {
        let slots = self.leaf_slot_count();
        if slot >= slots {
            return Err(ValidationError::InvalidSlot { slot, slots }.into());
        }
        Ok(())
    }

    fn leaf_mut(&mut self, slot: usize) -> &mut Option<String> {
        &mut self.rounds[0][slot / 2].slots[slot % 2]
    }

    /// Seed `name` into leaf `slot`, overwriting whatever the slot held.
    pub fn assign(&mut self, slot: usize, name: &str, roster: &Roster) -> Result<()> {
        self.check_unlocked()?;
        self.check_slot(slot)?;
        if !roster.contains(name) {
            return Err(ValidationError::UnknownContestant(name.to_string()).into());
        }
        if let Some(existing) = self.seeded_slot_of(name) {
            if existing != slot {
                return Err(StateConflict::AlreadyAssigned {
                    name: name.to_string(),
                    slot: existing,
                }
                .into());
            }
        }
        *self.leaf_mut(slot) = Some(name.to_string());
        Ok(())
    }

    /// Empty leaf `slot`, returning its previous occupant.
    pub fn unassign(&mut self, slot: usize) -> Result<Option<String>> {
        self.check_unlocked()?;
        self.check_slot(slot)?;
        Ok(self.leaf_mut(slot).take())
    }

    /// Fill every leaf slot with a uniformly random permutation of the roster.
    ///
    /// The roster must match the number of leaf slots exactly.
    pub fn assign_random<R: Rng + ?Sized>(&mut self, roster: &Roster, rng: &mut R) -> Result<()> {
        self.check_unlocked()?;
        let slots = self.leaf_slot_count();
        if roster.len() != slots {
            return Err(StateConflict::InsufficientContestants {
                roster: roster.len(),
                slots,
            }
            .into());
        }
        let mut draw = roster.list().to_vec();
        draw.shuffle(rng);
        for (slot, name) in draw.into_iter().enumerate() {
            *self.leaf_mut(slot) = Some(name);
        }
        Ok(())
    }

    /// Freeze seeding and open play.
    pub fn lock(&mut self) -> Result<()> {
        if !self.is_complete() {
            return Err(StateConflict::SeedingIncomplete.into());
        }
        self.locked = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::tournament::TournamentError;

    fn roster(n: usize) -> Roster {
        Roster::generate_test_roster(n).unwrap()
    }

    #[test]
    fn assign_rejects_unknown_contestant() {
        let mut bracket = Bracket::build(4).unwrap();
        let err = bracket.assign(0, "Nobody", &roster(4)).unwrap_err();
        assert_eq!(
            err,
            TournamentError::Validation(ValidationError::UnknownContestant("Nobody".into()))
        );
    }

    #[test]
    fn assign_requires_explicit_clear_before_moving() {
        let roster = roster(4);
        let mut bracket = Bracket::build(4).unwrap();
        bracket.assign(0, "Crash-Dummy", &roster).unwrap();

        let err = bracket.assign(3, "Crash-Dummy", &roster).unwrap_err();
        assert_eq!(
            err,
            TournamentError::Conflict(StateConflict::AlreadyAssigned {
                name: "Crash-Dummy".into(),
                slot: 0,
            })
        );
        assert_eq!(bracket.leaf_occupant(3), None);

        bracket.unassign(0).unwrap();
        bracket.assign(3, "Crash-Dummy", &roster).unwrap();
        assert_eq!(bracket.leaf_occupant(3), Some("Crash-Dummy"));
        assert_eq!(bracket.leaf_occupant(0), None);
    }

    #[test]
    fn reassigning_a_slot_overwrites_it() {
        let roster = roster(4);
        let mut bracket = Bracket::build(4).unwrap();
        bracket.assign(1, "Crash-Dummy", &roster).unwrap();
        bracket.assign(1, "Chaos-Maschine", &roster).unwrap();
        assert_eq!(bracket.leaf_occupant(1), Some("Chaos-Maschine"));
        assert_eq!(bracket.seeded_slot_of("Crash-Dummy"), None);

        // Same name into the same slot is a no-op.
        bracket.assign(1, "Chaos-Maschine", &roster).unwrap();
        assert_eq!(bracket.leaf_occupant(1), Some("Chaos-Maschine"));
    }

    #[test]
    fn assign_rejects_out_of_range_slot() {
        let mut bracket = Bracket::build(4).unwrap();
        let err = bracket.assign(4, "Crash-Dummy", &roster(4)).unwrap_err();
        assert_eq!(
            err,
            TournamentError::Validation(ValidationError::InvalidSlot { slot: 4, slots: 4 })
        );
    }

    #[test]
    fn random_assignment_fills_every_slot_with_distinct_names() {
        let roster = roster(16);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut bracket = Bracket::build(16).unwrap();
            bracket.assign(0, "Kipp-Bot", &roster).unwrap();
            bracket.assign_random(&roster, &mut rng).unwrap();

            assert!(bracket.is_complete());
            let mut seeded: Vec<_> = (0..16)
                .map(|slot| bracket.leaf_occupant(slot).unwrap().to_string())
                .collect();
            seeded.sort();
            let mut expected = roster.list().to_vec();
            expected.sort();
            assert_eq!(seeded, expected);
        }
    }

    #[test]
    fn random_assignment_requires_exact_roster_size() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut bracket = Bracket::build(8).unwrap();
        for n in [5, 9] {
            let err = bracket.assign_random(&roster(n), &mut rng).unwrap_err();
            assert_eq!(
                err,
                TournamentError::Conflict(StateConflict::InsufficientContestants {
                    roster: n,
                    slots: 8,
                })
            );
        }
        assert!((0..8).all(|slot| bracket.leaf_occupant(slot).is_none()));
    }

    #[test]
    fn lock_requires_complete_seeding_and_freezes_it() {
        let roster = roster(2);
        let mut bracket = Bracket::build(2).unwrap();
        bracket.assign(0, "Wackel-Bot 3000", &roster).unwrap();
        assert_eq!(
            bracket.lock(),
            Err(TournamentError::Conflict(StateConflict::SeedingIncomplete))
        );

        bracket.assign(1, "Chaos-Maschine", &roster).unwrap();
        bracket.lock().unwrap();
        assert_eq!(
            bracket.unassign(0),
            Err(TournamentError::Conflict(StateConflict::BracketLocked))
        );
    }
}
