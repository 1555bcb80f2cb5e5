//! Per-frame HTTP traffic classification.
//!
//! Every Ethernet frame is walked down to its TCP payload. A frame is kept when its payload
//! opens with an HTTP signature, or when it belongs to a flow that already did. Anything
//! else is dropped.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod filter;
pub mod http;
pub mod packet;
#[cfg(feature = "capture")]
pub mod replay;
pub mod session;
pub mod stats;
#[cfg(test)]
pub(crate) mod testing;

pub use error::Error;
pub use filter::{Classification, HttpFilter, Reason, SOCKET_DROP, SOCKET_KEEP, Verdict};
pub use packet::{DropReason, FlowKey, ParsedHeaders};
pub use session::{Eviction, FlowMatching, SessionPolicy, SessionTable};
pub use stats::{FilterStats, StatsSnapshot};
