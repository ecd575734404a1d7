//! Host-side collaborators for the VoltWatch sampling core
//!
//! ## Overview
//!
//! The core only knows capability traits. This crate supplies the `std`
//! implementations a gateway or a bench machine needs:
//!
//! | Capability    | Implementation        | Backing                         |
//! |---------------|-----------------------|---------------------------------|
//! | `RemoteStore` | [`rtdb::RtdbStore`]   | Realtime database REST API      |
//! | `WallClock`   | [`clock::SystemWallClock`] | Host clock via `chrono`    |
//! | `Link`        | [`link::TcpProbeLink`] | TCP connect to the database host |
//! | `Delay`       | [`delay::StdDelay`]   | `std::thread::sleep`            |
//!
//! ## Realtime database
//!
//! Values are written with one `PUT {url}/{path}.json` per key and read back
//! with `GET`. Sessions come from anonymous sign-up and are refreshed
//! shortly before the ID token expires. Writes are attempted once; the
//! sampling loop publishes a fresh sample next cycle instead of retrying.
//!
//! Credentials are read from the environment, never compiled in:
//!
//! ```text
//! VOLTWATCH_DATABASE_URL   https://<project>-default-rtdb.firebaseio.com
//! VOLTWATCH_API_KEY        web API key (needed for anonymous sign-up)
//! VOLTWATCH_NAMESPACE      defaults to "SensorTest"
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use voltwatch_connectors::rtdb::{RtdbConfig, RtdbStore};
//! use voltwatch_core::{RemoteStore, StoreValue};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RtdbConfig::new("https://example-default-rtdb.firebaseio.com")
//!     .api_key("web-api-key")
//!     .timeout_secs(10);
//!
//! let mut store = RtdbStore::new(config)?;
//! store.sign_up_anonymous()?;
//! store.set_value("SensorTest/voltage", &StoreValue::Float(1.0))?;
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod delay;
pub mod link;
#[cfg(feature = "http")]
pub mod rtdb;

pub use clock::SystemWallClock;
pub use delay::StdDelay;
pub use link::TcpProbeLink;
#[cfg(feature = "http")]
pub use rtdb::{RtdbConfig, RtdbError, RtdbStore};
