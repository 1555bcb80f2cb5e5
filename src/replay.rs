//! Offline capture replay.
//!
//! Feeds recorded frames through an [`HttpFilter`] so its decisions can be checked against
//! real traffic, for example whether replies on a connection survive under
//! [`FlowMatching::Exact`](crate::session::FlowMatching::Exact).

use anyhow::Context;
use crate::error::Error;
use crate::filter::HttpFilter;
use crate::session::ManualClock;
use crate::stats::StatsSnapshot;
use core::time::Duration;
use pcap::{Capture, Linktype, Offline};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One frame as recorded by a capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    /// Capture timestamp, relative to the epoch the capture uses.
    pub timestamp: Duration,
    pub data: Vec<u8>,
}

/// Frames in arrival order. A read error ends the sequence.
pub type Frames<'a> = Box<dyn Iterator<Item = anyhow::Result<CapturedFrame>> + 'a>;

/// Anything that can produce link-layer frames in arrival order.
pub trait FrameSource {
    /// Return an iterator over the source's frames.
    /// Implementations may return an error if the source cannot be opened, and yield one
    /// if a frame cannot be read.
    fn frames(&mut self) -> anyhow::Result<Frames<'_>>;
}

/// Ethernet frames from a pcap savefile.
pub struct PcapFileSource {
    capture: Capture<Offline>,
    path: PathBuf,
}

impl PcapFileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let capture = Capture::from_file(&path)?;

        let linktype = capture.get_datalink();
        if linktype != Linktype::ETHERNET {
            return Err(Error::UnsupportedLinkType(linktype.0));
        }

        Ok(Self { capture, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for PcapFileSource {
    fn frames(&mut self) -> anyhow::Result<Frames<'_>> {
        info!("Replaying capture: {}", self.path.display());

        let capture = &mut self.capture;
        let mut failed = false;
        // A savefile that stops mid-record is damaged, so the read error ends the iterator
        let iter = core::iter::from_fn(move || {
            if failed {
                return None;
            }
            match capture.next_packet() {
                Ok(packet) => Some(Ok(CapturedFrame {
                    timestamp: timestamp(packet.header.ts.tv_sec, packet.header.ts.tv_usec),
                    data: packet.data.to_vec(),
                })),
                Err(pcap::Error::NoMorePackets) => None,
                Err(e) => {
                    failed = true;
                    Some(Err(Error::from(e).into()))
                }
            }
        });

        Ok(Box::new(iter))
    }
}

/// `timeval` field widths differ between platforms.
fn timestamp<S, M>(secs: S, micros: M) -> Duration
where
    u64: TryFrom<S> + TryFrom<M>,
{
    let secs = Duration::from_secs(u64::try_from(secs).unwrap_or(0));
    let micros = Duration::from_micros(u64::try_from(micros).unwrap_or(0));
    secs.saturating_add(micros)
}

/// Summary of a replay run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    /// Filter counters after the run. They include anything classified before it.
    pub stats: StatsSnapshot,
    pub sessions: usize,
}

/// Run every frame of `source` through `filter`.
///
/// When `clock` is given it is set to each frame's capture timestamp before the frame is
/// classified, so idle expiry follows recorded rather than wall time. It should be the
/// clock the filter was built with.
pub fn replay<S>(
    source: &mut S,
    filter: &HttpFilter,
    clock: Option<&ManualClock>,
) -> anyhow::Result<ReplayReport>
where
    S: FrameSource + ?Sized,
{
    for (index, frame) in source.frames()?.enumerate() {
        let frame = frame.with_context(|| format!("Failed to read capture at frame {index}"))?;
        if let Some(clock) = clock {
            clock.set(frame.timestamp);
        }
        let classification = filter.classify_detailed(&frame.data);
        if classification.verdict.is_keep() {
            debug!(
                reason = %classification.reason,
                flow = ?classification.flow,
                len = frame.data.len(),
                "Kept frame"
            );
        }
    }

    let report = ReplayReport {
        stats: filter.stats().snapshot(),
        sessions: filter.sessions().len(),
    };
    info!(
        frames = report.stats.frames,
        kept = report.stats.kept,
        sessions = report.sessions,
        "Replay finished"
    );
    Ok(report)
}
