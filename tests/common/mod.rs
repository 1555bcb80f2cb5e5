//! Frame construction helpers shared by the integration tests.
#![allow(dead_code)]

use http_session_filter::FlowKey;

#[path = "../../src/testing.rs"]
mod testing;

pub(crate) use testing::FrameBuilder;
