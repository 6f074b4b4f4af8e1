//! Shared access to the one running tournament.
//!
//! The control panel and the overlay poll independently, so every operation
//! goes through a [`TournamentService`] handle: mutations run one at a time
//! under a single lock and are persisted before the lock is released, and
//! readers never see a half-applied change.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::timer::{TimerSource, TimerStatus};
use crate::tournament::{Result, Tournament, TournamentSnapshot};

/// Where the tournament is saved between runs.
pub trait StateStore: Send + Sync {
    /// Last saved state, or `None` if nothing has been saved yet.
    fn load(&self) -> anyhow::Result<Option<Tournament>>;

    fn save(&self, tournament: &Tournament) -> anyhow::Result<()>;
}

/// Everything the overlay needs in one poll: the tournament snapshot plus the
/// live timer reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayView {
    #[serde(flatten)]
    pub snapshot: TournamentSnapshot,
    pub timer: TimerStatus,
}

#[derive(Clone)]
pub struct TournamentService {
    state: Arc<Mutex<Tournament>>,
    store: Arc<dyn StateStore>,
    timer: Arc<dyn TimerSource>,
}

impl TournamentService {
    /// Resume from the store, or start empty on first run.
    pub fn open(store: Arc<dyn StateStore>, timer: Arc<dyn TimerSource>) -> anyhow::Result<Self> {
        let tournament = match store.load()? {
            Some(saved) => {
                tracing::info!(version = saved.version(), "Restored tournament state");
                saved
            }
            None => {
                tracing::info!("No saved tournament, starting fresh");
                Tournament::default()
            }
        };
        Ok(Self {
            state: Arc::new(Mutex::new(tournament)),
            store,
            timer,
        })
    }

    /// Run a read-only closure against the current state.
    pub fn read<T>(&self, f: impl FnOnce(&Tournament) -> T) -> T {
        let guard = self.state.lock().expect("tournament lock poisoned");
        f(&guard)
    }

    /// Apply one mutation atomically and persist the result.
    ///
    /// A rejected operation leaves the state (and its version) untouched and
    /// nothing is written. A failed save is logged; the in-memory state stays
    /// authoritative and the next mutation writes the full state again.
    pub fn mutate<T>(
        &self,
        action: &'static str,
        f: impl FnOnce(&mut Tournament) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.state.lock().expect("tournament lock poisoned");
        let out = match f(&mut guard) {
            Ok(out) => out,
            Err(e) => {
                tracing::warn!(action, error = %e, "Rejected tournament operation");
                return Err(e);
            }
        };
        tracing::debug!(action, version = guard.version(), "Applied tournament operation");
        if let Err(e) = self.store.save(&guard) {
            tracing::error!(action, error = %e, "Failed to persist tournament state");
        }
        Ok(out)
    }

    /// Wipe everything back to an empty tournament.
    pub fn reset_all(&self) -> u64 {
        self.mutate("reset_all", |t| {
            t.reset_all();
            Ok(t.version())
        })
        .unwrap_or_default()
    }

    pub fn version(&self) -> u64 {
        self.read(Tournament::version)
    }

    pub fn snapshot(&self) -> TournamentSnapshot {
        self.read(Tournament::snapshot)
    }

    /// Snapshot plus timer. The timer is read outside the tournament lock.
    pub fn overlay(&self) -> OverlayView {
        let snapshot = self.snapshot();
        OverlayView {
            snapshot,
            timer: self.timer.status(),
        }
    }

    pub fn timer_status(&self) -> TimerStatus {
        self.timer.status()
    }
}
