//! Classification counters.

use crate::filter::{Classification, Reason};
use crate::packet::DropReason;
use core::sync::atomic::{AtomicU64, Ordering};
use serde::Serialize;

/// Per-outcome frame counters. Updated with relaxed atomics, so a snapshot taken while
/// frames are being classified may be a few frames out of step between fields.
#[derive(Debug, Default)]
pub struct FilterStats {
    frames: AtomicU64,
    kept_signature: AtomicU64,
    kept_continuation: AtomicU64,
    dropped_not_ipv4: AtomicU64,
    dropped_not_tcp: AtomicU64,
    dropped_truncated: AtomicU64,
    dropped_malformed: AtomicU64,
    dropped_short_payload: AtomicU64,
    dropped_no_session: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub frames: u64,
    pub kept: u64,
    pub dropped: u64,
    pub kept_signature: u64,
    pub kept_continuation: u64,
    pub dropped_not_ipv4: u64,
    pub dropped_not_tcp: u64,
    pub dropped_truncated: u64,
    pub dropped_malformed: u64,
    pub dropped_short_payload: u64,
    pub dropped_no_session: u64,
}

impl FilterStats {
    pub(crate) fn record(&self, classification: &Classification) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        let counter = match classification.reason {
            Reason::Signature(_) => &self.kept_signature,
            Reason::Continuation => &self.kept_continuation,
            Reason::Dropped(DropReason::NotIpv4) => &self.dropped_not_ipv4,
            Reason::Dropped(DropReason::NotTcp) => &self.dropped_not_tcp,
            Reason::Dropped(DropReason::Truncated) => &self.dropped_truncated,
            Reason::Dropped(DropReason::Malformed) => &self.dropped_malformed,
            Reason::Dropped(DropReason::ShortPayload) => &self.dropped_short_payload,
            Reason::Dropped(DropReason::NoSession) => &self.dropped_no_session,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);

        let kept_signature = load(&self.kept_signature);
        let kept_continuation = load(&self.kept_continuation);
        let dropped_not_ipv4 = load(&self.dropped_not_ipv4);
        let dropped_not_tcp = load(&self.dropped_not_tcp);
        let dropped_truncated = load(&self.dropped_truncated);
        let dropped_malformed = load(&self.dropped_malformed);
        let dropped_short_payload = load(&self.dropped_short_payload);
        let dropped_no_session = load(&self.dropped_no_session);

        StatsSnapshot {
            frames: load(&self.frames),
            kept: kept_signature + kept_continuation,
            dropped: dropped_not_ipv4
                + dropped_not_tcp
                + dropped_truncated
                + dropped_malformed
                + dropped_short_payload
                + dropped_no_session,
            kept_signature,
            kept_continuation,
            dropped_not_ipv4,
            dropped_not_tcp,
            dropped_truncated,
            dropped_malformed,
            dropped_short_payload,
            dropped_no_session,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::filter::HttpFilter;
    use crate::testing::FrameBuilder;

    #[test]
    fn test_stats_follow_classifications() {
        let filter = HttpFilter::default();

        filter.classify(&FrameBuilder::new().payload(b"GET / HTTP/1.1\r\n").build());
        filter.classify(&FrameBuilder::new().payload(b"Host: example.com\r\n").build());
        filter.classify(&FrameBuilder::new().protocol(17).payload(b"GET / HTTP/1.1").build());
        filter.classify(&FrameBuilder::new().ethertype(0x0806).build());
        filter.classify(&FrameBuilder::new().payload(b"GET").build());
        filter.classify(&[0u8; 3]);

        let stats = filter.stats().snapshot();
        assert_eq!(stats.frames, 6);
        assert_eq!(stats.kept, 2);
        assert_eq!(stats.dropped, 4);
        assert_eq!(stats.kept_signature, 1);
        assert_eq!(stats.kept_continuation, 1);
        assert_eq!(stats.dropped_not_tcp, 1);
        assert_eq!(stats.dropped_not_ipv4, 1);
        assert_eq!(stats.dropped_short_payload, 1);
        assert_eq!(stats.dropped_truncated, 1);
        assert_eq!(stats.dropped_no_session, 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let filter = HttpFilter::default();
        filter.classify(&FrameBuilder::new().payload(b"abcdefg").build());

        let json = serde_json::to_value(filter.stats().snapshot()).unwrap();
        assert_eq!(json["frames"], 1);
        assert_eq!(json["dropped_no_session"], 1);
    }
}
