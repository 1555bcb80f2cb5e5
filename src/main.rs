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

use anyhow::{Context, bail};
use http_session_filter::replay::{PcapFileSource, replay};
use http_session_filter::session::ManualClock;
use http_session_filter::{FlowMatching, HttpFilter, SessionPolicy};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const USAGE: &str = "usage: http-session-filter <capture.pcap> [--either-direction]";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut path = None;
    let mut matching = FlowMatching::Exact;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--either-direction" => matching = FlowMatching::EitherDirection,
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ if path.is_none() => path = Some(arg),
            _ => bail!("Unexpected argument: {arg}\n{USAGE}"),
        }
    }
    let path = path.context(USAGE)?;

    let clock = Arc::new(ManualClock::default());
    let policy = SessionPolicy::default().with_matching(matching);
    let filter = HttpFilter::with_clock(policy, clock.clone());
    let mut source =
        PcapFileSource::open(&path).with_context(|| format!("Failed to open capture {path}"))?;

    let report = replay(&mut source, &filter, Some(&*clock))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
