//! Frame header walking and flow identification.
//!
//! This module walks the Ethernet, IPv4 and TCP headers of a raw frame, validating the
//! protocol fields and locating the TCP payload. It also derives the 4-tuple `FlowKey`
//! used to track sessions.

mod cursor;
mod flow_key;
mod walker;

pub(crate) use cursor::Cursor;
pub use flow_key::FlowKey;
pub(crate) use walker::walk_headers;
pub use walker::{
    DropReason, ETH_HLEN, ETHERTYPE_IPV4, IPPROTO_TCP, MIN_PAYLOAD_LEN, ParsedHeaders, walk,
};
