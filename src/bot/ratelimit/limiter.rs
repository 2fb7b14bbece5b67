//! Per-user command cooldowns.
//!
//! Every user gets one accepted command per interval. The check and the
//! timestamp update happen while holding the user's map entry, so two
//! messages from the same user racing each other cannot both get through.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    Allowed,
    /// Rejected; carries the time left until the user may try again.
    Denied(Duration),
}

#[derive(Debug)]
pub struct RateLimiter {
    last_accepted: DashMap<String, DateTime<Utc>>,
    interval_secs: AtomicU64,
}

impl RateLimiter {
    pub fn new(interval_secs: u64) -> Self {
        Self {
            last_accepted: DashMap::new(),
            interval_secs: AtomicU64::new(interval_secs),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.load(Ordering::Acquire))
    }

    /// Takes effect on the next check. Cooldowns already recorded are
    /// measured against the new interval from then on.
    pub fn set_interval(&self, seconds: u64) {
        self.interval_secs.store(seconds, Ordering::Release);
    }

    pub fn try_acquire(&self, username: &str, now: DateTime<Utc>) -> Acquire {
        let interval = self.interval();

        match self.last_accepted.entry(username.to_owned()) {
            Entry::Vacant(entry) => {
                entry.insert(now);
                Acquire::Allowed
            }
            Entry::Occupied(mut entry) => {
                let elapsed = elapsed_since(*entry.get(), now);
                if elapsed >= interval {
                    entry.insert(now);
                    Acquire::Allowed
                } else {
                    let remaining = interval - elapsed;
                    debug!(user = %username, remaining_ms = remaining.as_millis() as u64, "cooldown active");
                    Acquire::Denied(remaining)
                }
            }
        }
    }

    #[cfg(test)]
    pub fn remaining(&self, username: &str, now: DateTime<Utc>) -> Duration {
        let interval = self.interval();
        self.last_accepted
            .get(username)
            .map(|last| interval.saturating_sub(elapsed_since(*last, now)))
            .unwrap_or(Duration::ZERO)
    }

    /// Users still cooling down, ordered by name. Users whose cooldown has
    /// run out are left out.
    pub fn dump_all(&self, now: DateTime<Utc>) -> Vec<(String, Duration)> {
        let interval = self.interval();
        let mut entries: Vec<(String, Duration)> = self
            .last_accepted
            .iter()
            .map(|entry| (entry.key().clone(), interval.saturating_sub(elapsed_since(*entry.value(), now))))
            .filter(|(_, remaining)| !remaining.is_zero())
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    #[cfg(test)]
    pub fn tracked_users(&self) -> usize {
        self.last_accepted.len()
    }
}

// A clock that stepped backwards counts as no time passed.
fn elapsed_since(earlier: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - earlier).to_std().unwrap_or(Duration::ZERO)
}
