//! Runtime settings for the container manager.
//!
//! Settings are read from YAML. Every field has a default, so an empty
//! document is a valid configuration:
//!
//! ```yaml
//! agent:
//!   api_context: /jonas-api
//!   request_timeout: 30s
//! polling:
//!   interval: 1s
//!   deadline: 10m     # null waits without bound
//! expected_configuration:
//!   type: container
//!   sub_type: jonas
//! log_filter: info
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_API_CONTEXT: &str = "/jonas-api";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_POLL_DEADLINE: Duration = Duration::from_secs(600);

/// Errors returned while loading settings.
#[derive(Debug, Clone, Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings file '{path}': {source}")]
    Io {
        /// Settings path.
        path: String,
        /// Underlying failure.
        source: Arc<std::io::Error>,
    },

    /// The settings document is not valid YAML for this schema.
    #[error("invalid settings: {0}")]
    Parse(Arc<serde_yaml::Error>),
}

/// Top-level container manager settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerManagerSettings {
    /// Agent HTTP client settings.
    pub agent: AgentSettings,
    /// Remote task polling settings.
    pub polling: PollingSettings,
    /// Catalog kind accepted at container creation.
    pub expected_configuration: ExpectedConfiguration,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: LogFilter,
}

impl ContainerManagerSettings {
    /// Parses settings from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] when the document does not match the
    /// schema.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SettingsError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|error| SettingsError::Parse(Arc::new(error)))
    }

    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Io`] when the file cannot be read, or
    /// [`SettingsError::Parse`] when it does not match the schema.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref).map_err(|error| SettingsError::Io {
            path: path_ref.display().to_string(),
            source: Arc::new(error),
        })?;
        Self::from_yaml_str(&content)
    }
}

/// Agent HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentSettings {
    /// Path prefix of the agent API below each agent's base URL.
    pub api_context: String,
    /// Timeout applied to each HTTP request.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            api_context: DEFAULT_API_CONTEXT.to_owned(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Remote task polling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollingSettings {
    /// Fixed delay between two task status reads.
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Overall bound on waiting for one task; `None` waits indefinitely.
    #[serde(with = "humantime_serde")]
    pub deadline: Option<Duration>,
}

impl PollingSettings {
    /// Creates polling settings.
    #[must_use]
    pub const fn new(interval: Duration, deadline: Option<Duration>) -> Self {
        Self { interval, deadline }
    }
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            deadline: Some(DEFAULT_POLL_DEADLINE),
        }
    }
}

/// Catalog `type` and `sub-type` a configuration must carry to create a
/// container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpectedConfiguration {
    /// Required configuration type.
    #[serde(rename = "type")]
    pub config_type: String,
    /// Required configuration sub-type.
    pub sub_type: String,
}

impl Default for ExpectedConfiguration {
    fn default() -> Self {
        Self {
            config_type: "container".to_owned(),
            sub_type: "jonas".to_owned(),
        }
    }
}

/// `tracing` filter directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogFilter(pub String);

impl Default for LogFilter {
    fn default() -> Self {
        Self("info".to_owned())
    }
}

impl LogFilter {
    /// Returns the directive string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
