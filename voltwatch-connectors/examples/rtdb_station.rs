//! Host-side station publishing a replayed voltage trace
//!
//! With `VOLTWATCH_DATABASE_URL` set, signs up anonymously and writes to the
//! realtime database. Without it, runs a dry run against an in-memory store.
//!
//! ```text
//! RUST_LOG=debug VOLTWATCH_DATABASE_URL=https://... VOLTWATCH_API_KEY=... \
//!     cargo run -p voltwatch-connectors --example rtdb_station
//! ```

use std::time::Duration;

use voltwatch_connectors::{RtdbConfig, RtdbStore, StdDelay, SystemWallClock, TcpProbeLink};
use voltwatch_core::time::MonotonicTime;
use voltwatch_core::{
    MemoryStore, Publisher, RemoteStore, ReplaySource, RetryPolicy, Sampler, SamplerConfig,
    Station,
};

/// Settles around 1.0 V, then a noisy stretch with one dropped read
static TRACE_MV: [Option<u32>; 15] = [
    Some(1000), Some(1010), Some(990), Some(1000), Some(1000),
    Some(500), Some(1500), Some(200), Some(1800), Some(900),
    Some(1200), None, Some(1190), Some(1210), Some(1200),
];

fn run<S: RemoteStore>(store: S, namespace: &str, link: Option<TcpProbeLink>) -> Result<(), Box<dyn std::error::Error>> {
    let config = SamplerConfig::default();
    let sampler: Sampler<_, _, 5> = Sampler::new(ReplaySource::new(&TRACE_MV), StdDelay, config)?;
    let publisher = Publisher::new(store, namespace)?;
    let mut station = Station::new(sampler, SystemWallClock::default(), publisher);

    if let Some(mut link) = link {
        let attempts = station.bring_up(&mut link, &RetryPolicy::default())?;
        log::info!("{} reachable after {} attempt(s)", link.target(), attempts);
    }

    station.run(&MonotonicTime::new())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match RtdbConfig::from_env() {
        Ok(config) => {
            let link = TcpProbeLink::for_url(&config.database_url, Duration::from_secs(5))?;
            let namespace = config.namespace.clone();
            let mut store = RtdbStore::new(config)?;
            if store.config().api_key.is_some() {
                store.sign_up_anonymous()?;
            }
            run(store, &namespace, Some(link))
        }
        Err(err) => {
            log::warn!("{}; dry run against an in-memory store", err);
            run(MemoryStore::new(), voltwatch_core::constants::DEFAULT_NAMESPACE, None)
        }
    }
}
