//! Network Constants
//!
//! Store layout and link budgets. The path names are a wire contract with
//! whatever already reads the database; do not rename them.

// ===== STORE LAYOUT =====

/// Default top-level node under which samples are written.
pub const DEFAULT_NAMESPACE: &str = "SensorTest";

/// Child key holding the latest voltage (float).
pub const VOLTAGE_KEY: &str = "voltage";

/// Child key holding the latest wall-clock time string.
pub const REAL_TIME_KEY: &str = "real_time";

/// Capacity of a namespace string.
pub const NAMESPACE_CAPACITY: usize = 32;

/// Capacity of a full `<namespace>/<key>` path.
pub const PATH_CAPACITY: usize = 64;

/// Capacity of a remote failure reason. Longer reasons are truncated.
pub const REASON_CAPACITY: usize = 96;

// ===== LINK =====

/// Connection attempts before giving up at startup.
pub const LINK_MAX_ATTEMPTS: u32 = 100;

/// Delay between connection attempts (milliseconds).
pub const LINK_RETRY_DELAY_MS: u32 = 300;

/// Upper bound for a single backoff delay (milliseconds).
pub const LINK_MAX_BACKOFF_MS: u32 = 5000;

// ===== HTTP =====

/// Default request timeout for store writes (seconds).
pub const HTTP_TIMEOUT_S: u64 = 30;
