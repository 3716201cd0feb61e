//! Datastore configuration
//!
//! Loaded from a JSON file. Every key except `identity` has a default.
//!
//! ```json
//! {
//!   "identity": {
//!     "owner_app_id": "<64 hex chars>",
//!     "app_instance_id": "<64 hex chars>"
//!   },
//!   "lookback_days": 91,
//!   "max_chain_depth": 4,
//!   "max_page_limit": 1000,
//!   "request_timeout_ms": 2000,
//!   "retry_queue_capacity": 10000,
//!   "log_level": "info"
//! }
//! ```

mod errors;

pub use errors::{ConfigError, ConfigResult};

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::identity::AppIdentity;
use crate::observability::{log_event, Event, Logger, Severity};

/// Deepest chain a lookup may follow, whatever the config says
pub const MAX_CHAIN_DEPTH_LIMIT: usize = 16;

/// Application identity as hex strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// 32-byte owner application id, hex
    pub owner_app_id: String,
    /// 32-byte application instance id, hex
    pub app_instance_id: String,
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatastoreConfig {
    /// Writer identity (required)
    pub identity: IdentityConfig,

    /// Day buckets a daily lookup inspects, today included (default 91)
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Index hops a lookup may follow (default 4)
    #[serde(default = "default_max_chain_depth")]
    pub max_chain_depth: usize,

    /// Largest page `find` returns (default 1000)
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: u64,

    /// Deadline for each datastore operation, covering all of its store
    /// calls; none by default
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    /// Failed index writes kept for replay (default 10000)
    #[serde(default = "default_retry_queue_capacity")]
    pub retry_queue_capacity: usize,

    /// Minimum log severity (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_lookback_days() -> u32 {
    91
}
fn default_max_chain_depth() -> usize {
    4
}
fn default_max_page_limit() -> u64 {
    1000
}
fn default_retry_queue_capacity() -> usize {
    10_000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl DatastoreConfig {
    /// Defaults around an identity, for embedders that do not read a file
    pub fn for_identity(identity: &AppIdentity) -> Self {
        Self {
            identity: IdentityConfig {
                owner_app_id: hex::encode(identity.owner_app_id),
                app_instance_id: hex::encode(identity.app_instance_id),
            },
            lookback_days: default_lookback_days(),
            max_chain_depth: default_max_chain_depth(),
            max_page_limit: default_max_page_limit(),
            request_timeout_ms: None,
            retry_queue_capacity: default_retry_queue_capacity(),
            log_level: default_log_level(),
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&content)?;

        let path = path.display().to_string();
        log_event(
            Event::ConfigLoaded,
            &[("path", path.as_str()), ("log_level", config.log_level.as_str())],
        );
        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: DatastoreConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks ranges and formats.
    pub fn validate(&self) -> ConfigResult<()> {
        self.identity()?;

        if self.lookback_days == 0 {
            return Err(ConfigError::invalid("lookback_days", "must be > 0"));
        }
        if self.max_chain_depth == 0 || self.max_chain_depth > MAX_CHAIN_DEPTH_LIMIT {
            return Err(ConfigError::invalid(
                "max_chain_depth",
                format!("must be between 1 and {MAX_CHAIN_DEPTH_LIMIT}"),
            ));
        }
        if self.max_page_limit == 0 {
            return Err(ConfigError::invalid("max_page_limit", "must be > 0"));
        }
        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::invalid("request_timeout_ms", "must be > 0 when set"));
        }
        if self.retry_queue_capacity == 0 {
            return Err(ConfigError::invalid("retry_queue_capacity", "must be > 0"));
        }
        self.severity()?;
        Ok(())
    }

    /// Decoded writer identity
    pub fn identity(&self) -> ConfigResult<AppIdentity> {
        Ok(AppIdentity::new(
            decode_id("identity.owner_app_id", &self.identity.owner_app_id)?,
            decode_id("identity.app_instance_id", &self.identity.app_instance_id)?,
        ))
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> ConfigResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            ConfigError::invalid(
                "log_level",
                format!(
                    "unknown level '{}', expected trace, info, warn, error or fatal",
                    self.log_level
                ),
            )
        })
    }

    /// Deadline of one datastore operation, shared by every store call it
    /// makes
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Sets the process log threshold from `log_level`.
    pub fn apply_logging(&self) -> ConfigResult<()> {
        Logger::set_min_severity(self.severity()?);
        Ok(())
    }
}

fn decode_id(field: &'static str, value: &str) -> ConfigResult<[u8; 32]> {
    let mut out = [0u8; 32];
    hex::decode_to_slice(value, &mut out)
        .map_err(|e| ConfigError::invalid(field, format!("expected 64 hex characters: {e}")))?;
    Ok(out)
}
