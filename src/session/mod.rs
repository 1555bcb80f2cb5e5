//! Flow-keyed HTTP session tracking.
//!
//! A session is created when a frame of a flow carries an HTTP signature. Later frames of
//! the same flow are kept while the session lives. Capacity, idle expiry, eviction and
//! direction matching are set by a `SessionPolicy`.

mod clock;
mod policy;
mod table;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use policy::{DEFAULT_CAPACITY, Eviction, FlowMatching, SessionPolicy};
pub use table::{FlowRecord, SessionTable, Upsert};
