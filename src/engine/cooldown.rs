use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::models::notify::{NotifyState, WorkerNotifyStatus};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CooldownError {
    #[error("notify already in flight for worker {0}")]
    InFlight(Uuid),

    #[error("worker {worker_id} in cooldown: retry in {remaining_secs}s")]
    CoolingDown { worker_id: Uuid, remaining_secs: i64 },
}

#[derive(Debug, Clone)]
struct CooldownEntry {
    state: NotifyState,
    last_notified_at: Option<DateTime<Utc>>,
}

impl CooldownEntry {
    fn ready() -> Self {
        Self {
            state: NotifyState::Ready,
            last_notified_at: None,
        }
    }
}

/// Per-worker notify rate limiter. Remaining cooldown is derived from the
/// stored timestamp and the injected clock on every query, never ticked by a
/// running timer.
pub struct CooldownTracker {
    entries: DashMap<Uuid, CooldownEntry>,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl CooldownTracker {
    pub fn new(window_secs: i64) -> Self {
        Self::with_clock(window_secs, Arc::new(SystemClock))
    }

    pub fn with_clock(window_secs: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            window: Duration::seconds(window_secs),
            clock,
        }
    }

    /// Ready -> Notifying. The check-and-set runs under the map entry guard,
    /// so concurrent begins for the same worker admit exactly one.
    pub fn begin(&self, worker_id: Uuid) -> Result<(), CooldownError> {
        let now = self.clock.now();
        let mut entry = self
            .entries
            .entry(worker_id)
            .or_insert_with(CooldownEntry::ready);

        match entry.state {
            NotifyState::Notifying => Err(CooldownError::InFlight(worker_id)),
            NotifyState::Ready => {
                entry.state = NotifyState::Notifying;
                Ok(())
            }
            NotifyState::Notified | NotifyState::Cooldown => {
                let remaining = self.remaining_secs(entry.last_notified_at, now);
                if remaining > 0 {
                    Err(CooldownError::CoolingDown {
                        worker_id,
                        remaining_secs: remaining,
                    })
                } else {
                    entry.state = NotifyState::Notifying;
                    Ok(())
                }
            }
        }
    }

    /// Notifying -> Notified, which reads as an immediately started cooldown.
    /// Returns the recorded delivery instant.
    pub fn settle_delivered(&self, worker_id: Uuid) -> DateTime<Utc> {
        let now = self.clock.now();
        let mut entry = self
            .entries
            .entry(worker_id)
            .or_insert_with(CooldownEntry::ready);

        entry.state = NotifyState::Notified;
        entry.last_notified_at = Some(now);
        now
    }

    /// Notifying -> Ready. A failed delivery charges no cooldown.
    pub fn settle_failed(&self, worker_id: Uuid) {
        if let Some(mut entry) = self.entries.get_mut(&worker_id) {
            entry.state = NotifyState::Ready;
        }
    }

    /// Seed a previously persisted delivery timestamp. No-op when the worker
    /// already has live session state.
    pub fn seed(&self, worker_id: Uuid, last_notified_at: DateTime<Utc>) {
        self.entries.entry(worker_id).or_insert(CooldownEntry {
            state: NotifyState::Notified,
            last_notified_at: Some(last_notified_at),
        });
    }

    pub fn contains(&self, worker_id: Uuid) -> bool {
        self.entries.contains_key(&worker_id)
    }

    pub fn status(&self, worker_id: Uuid) -> WorkerNotifyStatus {
        let now = self.clock.now();
        let entry = self
            .entries
            .get(&worker_id)
            .map(|e| e.value().clone())
            .unwrap_or_else(CooldownEntry::ready);

        let (status, remaining) = match entry.state {
            NotifyState::Notifying => (NotifyState::Notifying, 0),
            NotifyState::Ready => (NotifyState::Ready, 0),
            NotifyState::Notified | NotifyState::Cooldown => {
                let remaining = self.remaining_secs(entry.last_notified_at, now);
                if remaining > 0 {
                    (NotifyState::Cooldown, remaining)
                } else {
                    (NotifyState::Ready, 0)
                }
            }
        };

        WorkerNotifyStatus {
            worker_id,
            status,
            cooldown_seconds_remaining: remaining,
        }
    }

    fn remaining_secs(&self, last_notified_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
        match last_notified_at {
            Some(at) => {
                // Whole elapsed seconds, so a just-delivered notify reports the
                // full window rather than window - 1.
                let elapsed_secs = now.signed_duration_since(at).num_seconds();
                (self.window.num_seconds() - elapsed_secs).max(0)
            }
            None => 0,
        }
    }
}
