//! Per-frame classification.
//!
//! [`HttpFilter::classify`] is the entry point: one call per frame, returning whether the
//! frame is delivered upstream. The work per frame is fixed: one header walk, one
//! 7-byte signature window, at most one or two session table operations. It does not
//! depend on frame size.

use crate::http::{SIGNATURE_WINDOW, Signature, match_signature};
use crate::packet::{Cursor, DropReason, FlowKey, ParsedHeaders, walk_headers};
use crate::session::{Clock, SessionPolicy, SessionTable, Upsert};
use crate::stats::FilterStats;
use core::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Socket-filter return value for a dropped frame.
pub const SOCKET_DROP: i32 = 0;
/// Socket-filter return value for a kept frame: deliver all of it.
pub const SOCKET_KEEP: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Keep,
    Drop,
}

impl Verdict {
    pub const fn is_keep(self) -> bool {
        matches!(self, Self::Keep)
    }
}

impl From<Verdict> for i32 {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Keep => SOCKET_KEEP,
            Verdict::Drop => SOCKET_DROP,
        }
    }
}

/// Why a frame got its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// The payload opened with an HTTP signature.
    Signature(&'static Signature),
    /// No signature, but the flow has a live session.
    Continuation,
    Dropped(DropReason),
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Signature(signature) => write!(f, "signature {signature}"),
            Reason::Continuation => write!(f, "continuation"),
            Reason::Dropped(reason) => write!(f, "dropped: {reason}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub verdict: Verdict,
    pub reason: Reason,
    /// Present once the headers were walked far enough to derive it.
    pub flow: Option<FlowKey>,
}

impl Classification {
    const fn keep(reason: Reason, flow: FlowKey) -> Self {
        Self {
            verdict: Verdict::Keep,
            reason,
            flow: Some(flow),
        }
    }

    const fn dropped(reason: DropReason, flow: Option<FlowKey>) -> Self {
        Self {
            verdict: Verdict::Drop,
            reason: Reason::Dropped(reason),
            flow,
        }
    }
}

/// HTTP traffic filter: header walker, signature matcher and session table.
///
/// Share it between threads by reference or `Arc`; every method takes `&self`.
#[derive(Debug, Default)]
pub struct HttpFilter {
    sessions: SessionTable,
    stats: FilterStats,
}

impl HttpFilter {
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            sessions: SessionTable::new(policy),
            stats: FilterStats::default(),
        }
    }

    pub fn with_clock(policy: SessionPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: SessionTable::with_clock(policy, clock),
            stats: FilterStats::default(),
        }
    }

    /// Decide whether `frame` is kept.
    pub fn classify(&self, frame: &[u8]) -> Verdict {
        self.classify_detailed(frame).verdict
    }

    /// Like [`HttpFilter::classify`], also reporting the reason and the flow.
    pub fn classify_detailed(&self, frame: &[u8]) -> Classification {
        let classification = match walk_headers(frame) {
            Ok((headers, cursor)) => self.classify_payload(&headers, cursor),
            Err(reason) => Classification::dropped(reason, None),
        };

        self.stats.record(&classification);
        trace!(
            verdict = ?classification.verdict,
            reason = %classification.reason,
            flow = ?classification.flow,
            "Classified frame"
        );
        classification
    }

    fn classify_payload(
        &self,
        headers: &ParsedHeaders,
        mut cursor: Cursor<'_>,
    ) -> Classification {
        let key = headers.flow_key;
        // The IP total length may promise more than the frame holds
        let Some(window) = cursor.advance::<SIGNATURE_WINDOW>() else {
            return Classification::dropped(DropReason::Truncated, Some(key));
        };

        if let Some(signature) = match_signature(window) {
            if self.sessions.upsert(key) == Upsert::Inserted {
                let opened_by = if signature.is_response() {
                    "response"
                } else {
                    "request"
                };
                debug!(flow = %key, signature = signature.name, opened_by, "Tracking HTTP session");
            }
            return Classification::keep(Reason::Signature(signature), key);
        }

        if self.sessions.continue_flow(&key) {
            Classification::keep(Reason::Continuation, key)
        } else {
            Classification::dropped(DropReason::NoSession, Some(key))
        }
    }

    pub const fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    pub const fn stats(&self) -> &FilterStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{FlowMatching, ManualClock};
    use crate::testing::FrameBuilder;
    use core::net::Ipv4Addr;
    use core::time::Duration;

    fn client() -> FlowKey {
        FlowKey::new(
            Ipv4Addr::new(192, 168, 1, 100),
            Ipv4Addr::new(93, 184, 216, 34),
            51000,
            80,
        )
    }

    #[test]
    fn test_verdict_socket_encoding() {
        assert_eq!(i32::from(Verdict::Keep), -1);
        assert_eq!(i32::from(Verdict::Drop), 0);
        assert!(Verdict::Keep.is_keep());
        assert!(!Verdict::Drop.is_keep());
    }

    #[test]
    fn test_signature_frame_opens_session() {
        let filter = HttpFilter::default();
        let frame = FrameBuilder::new()
            .key(client())
            .payload(b"GET /index.html HTTP/1.1\r\n")
            .build();

        let classification = filter.classify_detailed(&frame);

        assert_eq!(classification.verdict, Verdict::Keep);
        assert!(matches!(classification.reason, Reason::Signature(s) if s.name == "GET"));
        assert_eq!(classification.flow, Some(client()));
        assert!(filter.sessions().contains(&client()));
    }

    #[test]
    fn test_status_line_opens_response_session() {
        let filter = HttpFilter::default();
        let server = client().reversed();
        let frame = FrameBuilder::new()
            .key(server)
            .payload(b"HTTP/1.1 200 OK\r\n")
            .build();

        let classification = filter.classify_detailed(&frame);

        assert!(matches!(classification.reason, Reason::Signature(s) if s.is_response()));
        assert!(filter.sessions().contains(&server));
        assert!(!filter.sessions().contains(&client()));
    }

    #[test]
    fn test_continuation_and_unknown_flows() {
        let filter = HttpFilter::default();
        filter.classify(
            &FrameBuilder::new()
                .key(client())
                .payload(b"POST /upload HTTP/1.1\r\n")
                .build(),
        );

        let continuation = FrameBuilder::new()
            .key(client())
            .payload(b"Content-Length: 42\r\n")
            .build();
        let stranger = FrameBuilder::new()
            .key(client().reversed())
            .payload(b"Content-Length: 42\r\n")
            .build();

        assert_eq!(
            filter.classify_detailed(&continuation).reason,
            Reason::Continuation
        );
        assert_eq!(
            filter.classify_detailed(&stranger).reason,
            Reason::Dropped(DropReason::NoSession)
        );
    }

    #[test]
    fn test_either_direction_keeps_replies() {
        let policy = SessionPolicy::default().with_matching(FlowMatching::EitherDirection);
        let filter = HttpFilter::new(policy);
        filter.classify(
            &FrameBuilder::new()
                .key(client())
                .payload(b"GET / HTTP/1.1\r\n")
                .build(),
        );

        let reply_body = FrameBuilder::new()
            .key(client().reversed())
            .payload(b"<html><body>")
            .build();
        assert_eq!(filter.classify(&reply_body), Verdict::Keep);
        // The reply did not get a record of its own
        assert!(!filter.sessions().contains(&client().reversed()));
    }

    #[test]
    fn test_truncated_payload_window_drops() {
        let filter = HttpFilter::default();
        let frame = FrameBuilder::new()
            .key(client())
            .payload(b"GET /index.html HTTP/1.1\r\n")
            .build();

        // Headers claim 26 payload bytes but the capture stops after 4
        let classification = filter.classify_detailed(&frame[..58]);

        assert_eq!(
            classification.reason,
            Reason::Dropped(DropReason::Truncated)
        );
        assert_eq!(classification.flow, Some(client()));
        assert!(filter.sessions().is_empty());
    }

    #[test]
    fn test_idle_session_stops_matching() {
        let clock = Arc::new(ManualClock::default());
        let policy = SessionPolicy::default().with_idle_timeout(Duration::from_secs(30));
        let filter = HttpFilter::with_clock(policy, clock.clone());

        filter.classify(
            &FrameBuilder::new()
                .key(client())
                .payload(b"GET / HTTP/1.1\r\n")
                .build(),
        );
        let continuation = FrameBuilder::new()
            .key(client())
            .payload(b"Accept: */*\r\n")
            .build();

        clock.advance(Duration::from_secs(20));
        assert_eq!(filter.classify(&continuation), Verdict::Keep);
        // The continuation refreshed the session, so 20 more seconds are still within the timeout
        clock.advance(Duration::from_secs(20));
        assert_eq!(filter.classify(&continuation), Verdict::Keep);

        clock.advance(Duration::from_secs(31));
        assert_eq!(filter.classify(&continuation), Verdict::Drop);
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(Reason::Continuation.to_string(), "continuation");
        assert_eq!(
            Reason::Dropped(DropReason::NotTcp).to_string(),
            "dropped: not-tcp"
        );
        let get = match_signature(b"GET / H").unwrap();
        assert_eq!(Reason::Signature(get).to_string(), "signature GET");
    }
}
