use super::clock::{Clock, MonotonicClock};
use super::policy::{Eviction, FlowMatching, SessionPolicy};
use crate::packet::FlowKey;
use core::fmt;
use core::time::Duration;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tracing::debug;

/// State kept for a flow that carried an HTTP signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowRecord {
    pub first_seen: Duration,
    pub last_seen: Duration,
    /// Frames attributed to this flow, signature frames included.
    pub hits: u64,
}

impl FlowRecord {
    fn new(now: Duration) -> Self {
        Self {
            first_seen: now,
            last_seen: now,
            hits: 1,
        }
    }

    fn touch(&mut self, now: Duration) {
        self.last_seen = self.last_seen.max(now);
        self.hits = self.hits.saturating_add(1);
    }
}

/// Outcome of [`SessionTable::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Refreshed,
    /// The table was full and the policy is [`Eviction::RejectNew`].
    Rejected,
}

/// Concurrent, bounded map from flow keys to session records.
///
/// All operations take `&self` and are safe to call from any number of threads. The
/// capacity bound holds once concurrent inserts have settled; a burst of simultaneous
/// inserts may overshoot it briefly before the inserters evict back down.
///
/// Lookups, refreshes and inserts into a table with room are single map operations.
/// A new flow arriving at a full table under [`Eviction::LeastRecentlySeen`] also scans
/// every record to find the oldest, so that case costs O(capacity). The cost is fixed by
/// the policy and does not depend on frame size.
pub struct SessionTable {
    records: DashMap<FlowKey, FlowRecord>,
    policy: SessionPolicy,
    clock: Arc<dyn Clock>,
}

impl SessionTable {
    pub fn new(policy: SessionPolicy) -> Self {
        Self::with_clock(policy, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(policy: SessionPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::with_capacity(policy.capacity()),
            policy,
            clock,
        }
    }

    pub const fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record that `key` carried a signature: insert a fresh record or refresh the existing one.
    pub fn upsert(&self, key: FlowKey) -> Upsert {
        let now = self.clock.now();

        if let Some(mut record) = self.records.get_mut(&key) {
            if self.is_expired(&record, now) {
                *record = FlowRecord::new(now);
                return Upsert::Inserted;
            }
            record.touch(now);
            return Upsert::Refreshed;
        }

        let capacity = self.policy.capacity();
        if self.records.len() >= capacity {
            self.purge_expired_at(now);
        }
        if self.records.len() >= capacity {
            match self.policy.eviction() {
                Eviction::RejectNew => {
                    debug!(flow = %key, capacity, "Session table full, not tracking flow");
                    return Upsert::Rejected;
                }
                Eviction::LeastRecentlySeen => {
                    self.evict_least_recent(None);
                }
            }
        }

        let outcome = match self.records.entry(key) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().touch(now);
                Upsert::Refreshed
            }
            Entry::Vacant(entry) => {
                entry.insert(FlowRecord::new(now));
                Upsert::Inserted
            }
        };

        if outcome == Upsert::Inserted && self.records.len() > capacity {
            // Lost a race with other inserters
            match self.policy.eviction() {
                Eviction::RejectNew => {
                    self.records.remove(&key);
                    return Upsert::Rejected;
                }
                Eviction::LeastRecentlySeen => {
                    while self.records.len() > capacity && self.evict_least_recent(Some(&key)) {}
                }
            }
        }

        outcome
    }

    /// Whether a live record exists for `key`. Does not refresh it.
    pub fn contains(&self, key: &FlowKey) -> bool {
        self.find_live(key, self.clock.now(), false)
    }

    /// Refresh the live record for `key`, returning whether one existed.
    pub fn touch(&self, key: &FlowKey) -> bool {
        self.find_live(key, self.clock.now(), true)
    }

    pub fn get(&self, key: &FlowKey) -> Option<FlowRecord> {
        let now = self.clock.now();
        let record = *self.records.get(key)?;
        if self.is_expired(&record, now) {
            self.expire(key, now);
            return None;
        }
        Some(record)
    }

    pub fn remove(&self, key: &FlowKey) -> Option<FlowRecord> {
        self.records.remove(key).map(|(_, record)| record)
    }

    pub fn clear(&self) {
        self.records.clear();
    }

    /// Remove every record idle past the policy's timeout, returning how many went.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(self.clock.now())
    }

    /// Look up the session a non-signature frame may belong to, honouring the matching policy.
    pub(crate) fn continue_flow(&self, key: &FlowKey) -> bool {
        let now = self.clock.now();
        let touch = self.policy.touch_on_continuation();

        if self.find_live(key, now, touch) {
            return true;
        }
        self.policy.matching() == FlowMatching::EitherDirection
            && self.find_live(&key.reversed(), now, touch)
    }

    fn find_live(&self, key: &FlowKey, now: Duration, touch: bool) -> bool {
        let expired = if touch {
            let Some(mut record) = self.records.get_mut(key) else {
                return false;
            };
            let expired = self.is_expired(&record, now);
            if !expired {
                record.touch(now);
            }
            expired
        } else {
            let Some(record) = self.records.get(key) else {
                return false;
            };
            self.is_expired(&record, now)
        };

        if expired {
            self.expire(key, now);
        }
        !expired
    }

    fn is_expired(&self, record: &FlowRecord, now: Duration) -> bool {
        self.policy
            .idle_timeout()
            .is_some_and(|timeout| now.saturating_sub(record.last_seen) > timeout)
    }

    fn expire(&self, key: &FlowKey, now: Duration) {
        // Another thread may have refreshed the record since we looked
        if self
            .records
            .remove_if(key, |_, record| self.is_expired(record, now))
            .is_some()
        {
            debug!(flow = %key, "Session expired");
        }
    }

    fn purge_expired_at(&self, now: Duration) -> usize {
        if self.policy.idle_timeout().is_none() {
            return 0;
        }
        let mut purged = 0;
        self.records.retain(|_, record| {
            let keep = !self.is_expired(record, now);
            if !keep {
                purged += 1;
            }
            keep
        });
        if purged > 0 {
            debug!(purged, "Purged idle sessions");
        }
        purged
    }

    /// Evict the record with the oldest `last_seen`, never `spare`. Returns whether one went.
    fn evict_least_recent(&self, spare: Option<&FlowKey>) -> bool {
        let oldest = self
            .records
            .iter()
            .filter(|entry| Some(entry.key()) != spare)
            .min_by_key(|entry| (entry.value().last_seen, *entry.key()))
            .map(|entry| *entry.key());

        let Some(oldest) = oldest else {
            return false;
        };
        if self.records.remove(&oldest).is_some() {
            debug!(flow = %oldest, "Evicted least recently seen session");
        }
        true
    }
}

impl Default for SessionTable {
    fn default() -> Self {
        Self::new(SessionPolicy::default())
    }
}

impl fmt::Debug for SessionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTable")
            .field("len", &self.records.len())
            .field("policy", &self.policy)
            .field("clock", &self.clock)
            .finish()
    }
}
