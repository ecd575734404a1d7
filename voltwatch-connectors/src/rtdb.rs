//! Realtime database connector - REST access to a hosted JSON tree
//!
//! ## Overview
//!
//! Every path in the database is a node of one JSON document. A node is
//! written with `PUT {url}/{path}.json` and read with `GET` on the same URL.
//! The sampling core writes two nodes per cycle:
//!
//! ```text
//! PUT {url}/SensorTest/voltage.json?auth={token}     1.0
//! PUT {url}/SensorTest/real_time.json?auth={token}   "07:00:00"
//! ```
//!
//! ## Authentication
//!
//! Anonymous sign-up exchanges the web API key for an ID token and a refresh
//! token. The ID token is attached as `?auth=` on every request and renewed
//! through the secure-token endpoint once it is within a minute of expiry.
//! Without an API key requests go out unauthenticated, which only works on
//! databases with open rules.
//!
//! ## Failure handling
//!
//! Each request is made once. A failed write is reported to the caller and
//! the next cycle writes a fresh value, so a retry here would only delay the
//! loop.

use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use voltwatch_core::constants::network::{DEFAULT_NAMESPACE, HTTP_TIMEOUT_S};
use voltwatch_core::{RemoteStore, StoreError, StoreValue};

/// Identity toolkit endpoint for anonymous sign-up
pub const SIGN_UP_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1/accounts:signUp";

/// Secure-token endpoint for refreshing an ID token
pub const TOKEN_ENDPOINT: &str = "https://securetoken.googleapis.com/v1/token";

/// Renew the ID token when it has less than this left
pub const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Environment variable holding the database URL
pub const ENV_DATABASE_URL: &str = "VOLTWATCH_DATABASE_URL";
/// Environment variable holding the web API key
pub const ENV_API_KEY: &str = "VOLTWATCH_API_KEY";
/// Environment variable overriding the namespace
pub const ENV_NAMESPACE: &str = "VOLTWATCH_NAMESPACE";

/// Realtime database errors
#[derive(Debug, Error)]
pub enum RtdbError {
    /// Network or transport error
    #[error("Request failed: {0}")]
    Request(String),

    /// Sign-up or token refresh refused, or the rules denied access
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Database returned an error status
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Body could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Bad or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<RtdbError> for StoreError {
    fn from(err: RtdbError) -> Self {
        StoreError::new(&err.to_string())
    }
}

impl From<ureq::Error> for RtdbError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let message = response.into_string().unwrap_or_default();
                if status == 401 || status == 403 {
                    RtdbError::Auth(format!("{} {}", status, message))
                } else {
                    RtdbError::Server { status, message }
                }
            }
            ureq::Error::Transport(transport) => RtdbError::Request(transport.to_string()),
        }
    }
}

/// Connection settings
#[derive(Clone)]
pub struct RtdbConfig {
    /// Database root URL
    pub database_url: String,
    /// Web API key for anonymous sign-up
    pub api_key: Option<String>,
    /// Namespace the station writes under
    pub namespace: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl std::fmt::Debug for RtdbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtdbConfig")
            .field("database_url", &self.database_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("namespace", &self.namespace)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RtdbConfig {
    /// Configuration for the database at `database_url`
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            api_key: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            timeout: Duration::from_secs(HTTP_TIMEOUT_S),
            user_agent: format!("VoltWatch/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Read settings from `VOLTWATCH_*` environment variables
    pub fn from_env() -> Result<Self, RtdbError> {
        let url = std::env::var(ENV_DATABASE_URL)
            .map_err(|_| RtdbError::Config(format!("{} is not set", ENV_DATABASE_URL)))?;

        let mut config = Self::new(url);
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            config = config.api_key(key);
        }
        if let Ok(namespace) = std::env::var(ENV_NAMESPACE) {
            config = config.namespace(namespace);
        }
        Ok(config)
    }

    /// Set the web API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Check the URL scheme
    pub fn validate(&self) -> Result<(), RtdbError> {
        if !self.database_url.starts_with("http://") && !self.database_url.starts_with("https://") {
            return Err(RtdbError::Config(
                "Database URL must start with http:// or https://".into(),
            ));
        }
        Ok(())
    }
}

/// Tokens from sign-up or refresh
#[derive(Debug, Clone)]
struct Session {
    id_token: String,
    refresh_token: String,
    expires_at: Instant,
}

impl Session {
    fn needs_refresh(&self, now: Instant) -> bool {
        now + TOKEN_REFRESH_MARGIN >= self.expires_at
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
}

fn parse_expiry(expires_in: &str) -> Result<Duration, RtdbError> {
    expires_in
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| RtdbError::Serialization(format!("bad expiresIn: {}", expires_in)))
}

/// Encode a tagged value as the JSON the database stores
pub fn to_json(value: &StoreValue) -> Value {
    match value {
        StoreValue::Null => Value::Null,
        StoreValue::Bool(b) => Value::Bool(*b),
        StoreValue::Int(i) => Value::from(*i),
        StoreValue::Float(f) => serde_json::Number::from_f64(f64::from(*f))
            .map(Value::Number)
            .unwrap_or(Value::Null),
        StoreValue::Text(s) => Value::String(s.as_str().to_string()),
    }
}

/// Decode a JSON node into a tagged value
///
/// Integral numbers map to `Int`, other numbers to `Float`. Objects and
/// arrays have no scalar equivalent and are rejected.
pub fn from_json(value: &Value) -> Result<StoreValue, RtdbError> {
    match value {
        Value::Null => Ok(StoreValue::Null),
        Value::Bool(b) => Ok(StoreValue::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(StoreValue::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(StoreValue::Float(f as f32))
            } else {
                Err(RtdbError::Serialization(format!("number out of range: {}", n)))
            }
        }
        Value::String(s) => Ok(StoreValue::text(s)),
        Value::Array(_) | Value::Object(_) => Err(RtdbError::Serialization(
            "node is not a scalar value".into(),
        )),
    }
}

/// [`RemoteStore`] over the realtime database REST API
pub struct RtdbStore {
    config: RtdbConfig,
    agent: ureq::Agent,
    session: Option<Session>,
}

impl RtdbStore {
    /// Create a store; no request is made until the first sign-up or write
    pub fn new(config: RtdbConfig) -> Result<Self, RtdbError> {
        config.validate()?;

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self {
            config,
            agent,
            session: None,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &RtdbConfig {
        &self.config
    }

    /// Whether a session token is held
    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    fn require_api_key(&self) -> Result<&str, RtdbError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| RtdbError::Config(format!("{} is required for sign-up", ENV_API_KEY)))
    }

    /// Create an anonymous account and keep its tokens
    pub fn sign_up_anonymous(&mut self) -> Result<(), RtdbError> {
        let url = format!("{}?key={}", SIGN_UP_ENDPOINT, self.require_api_key()?);

        let response: SignUpResponse = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(r#"{"returnSecureToken":true}"#)
            .map_err(|err| match RtdbError::from(err) {
                RtdbError::Server { status, message } => {
                    RtdbError::Auth(format!("sign-up refused ({}): {}", status, message))
                }
                other => other,
            })?
            .into_json()
            .map_err(|err| RtdbError::Serialization(err.to_string()))?;

        self.session = Some(Session {
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at: Instant::now() + parse_expiry(&response.expires_in)?,
        });
        log::info!("Anonymous sign-up ok");
        Ok(())
    }

    fn refresh_if_needed(&mut self) -> Result<(), RtdbError> {
        let refresh_token = match &self.session {
            Some(session) if session.needs_refresh(Instant::now()) => session.refresh_token.clone(),
            _ => return Ok(()),
        };

        let url = format!("{}?key={}", TOKEN_ENDPOINT, self.require_api_key()?);
        let response: RefreshResponse = self
            .agent
            .post(&url)
            .send_form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .map_err(RtdbError::from)?
            .into_json()
            .map_err(|err| RtdbError::Serialization(err.to_string()))?;

        self.session = Some(Session {
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_at: Instant::now() + parse_expiry(&response.expires_in)?,
        });
        log::debug!("ID token refreshed");
        Ok(())
    }

    /// REST URL for the node at `path`
    pub fn node_url(&self, path: &str) -> String {
        let base = self.config.database_url.trim_end_matches('/');
        let path = path.trim_matches('/');
        match &self.session {
            Some(session) => format!("{}/{}.json?auth={}", base, path, session.id_token),
            None => format!("{}/{}.json", base, path),
        }
    }

    /// Write `value` at `path`
    pub fn put(&mut self, path: &str, value: &StoreValue) -> Result<(), RtdbError> {
        self.refresh_if_needed()?;
        let body = serde_json::to_string(&to_json(value))
            .map_err(|err| RtdbError::Serialization(err.to_string()))?;

        self.agent
            .put(&self.node_url(path))
            .set("Content-Type", "application/json")
            .send_string(&body)?;
        Ok(())
    }

    /// Read the value at `path`; a missing node reads as `Null`
    pub fn get(&mut self, path: &str) -> Result<StoreValue, RtdbError> {
        self.refresh_if_needed()?;
        let text = self
            .agent
            .get(&self.node_url(path))
            .call()?
            .into_string()
            .map_err(|err| RtdbError::Request(err.to_string()))?;

        let value: Value =
            serde_json::from_str(&text).map_err(|err| RtdbError::Serialization(err.to_string()))?;
        from_json(&value)
    }
}

impl RemoteStore for RtdbStore {
    fn set_value(&mut self, path: &str, value: &StoreValue) -> Result<(), StoreError> {
        self.put(path, value).map_err(StoreError::from)
    }

    fn get_value(&mut self, path: &str) -> Result<StoreValue, StoreError> {
        self.get(path).map_err(StoreError::from)
    }
}
