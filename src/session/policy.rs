use crate::error::Error;
use core::num::NonZeroUsize;
use core::time::Duration;

/// Number of sessions tracked when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 1024;

/// What happens when a new flow arrives at a full table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Eviction {
    /// Drop the record that was seen least recently to make room.
    #[default]
    LeastRecentlySeen,
    /// Leave the table as it is. The frame is still kept, the flow is simply not tracked.
    RejectNew,
}

/// How non-signature frames are matched against tracked sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowMatching {
    /// Only the exact 4-tuple that carried the signature.
    #[default]
    Exact,
    /// The exact 4-tuple or its mirror, so replies on the same connection are kept too.
    EitherDirection,
}

/// Capacity and lifetime rules for the session table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    capacity: NonZeroUsize,
    idle_timeout: Option<Duration>,
    eviction: Eviction,
    matching: FlowMatching,
    touch_on_continuation: bool,
}

impl SessionPolicy {
    pub fn new(capacity: usize) -> Result<Self, Error> {
        let capacity = NonZeroUsize::new(capacity).ok_or(Error::ZeroCapacity)?;
        Ok(Self {
            capacity,
            ..Self::default()
        })
    }

    /// Records idle for longer than `timeout` are treated as gone.
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_eviction(mut self, eviction: Eviction) -> Self {
        self.eviction = eviction;
        self
    }

    #[must_use]
    pub fn with_matching(mut self, matching: FlowMatching) -> Self {
        self.matching = matching;
        self
    }

    /// Whether frames kept as session continuations refresh the record's `last_seen`.
    #[must_use]
    pub fn with_touch_on_continuation(mut self, touch: bool) -> Self {
        self.touch_on_continuation = touch;
        self
    }

    pub const fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub const fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    pub const fn eviction(&self) -> Eviction {
        self.eviction
    }

    pub const fn matching(&self) -> FlowMatching {
        self.matching
    }

    pub const fn touch_on_continuation(&self) -> bool {
        self.touch_on_continuation
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::MIN.saturating_add(DEFAULT_CAPACITY - 1),
            idle_timeout: None,
            eviction: Eviction::default(),
            matching: FlowMatching::default(),
            touch_on_continuation: true,
        }
    }
}
