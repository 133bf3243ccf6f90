//! Container lifecycle state as mirrored from the owning agent.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a container record.
///
/// Only the transitional markers are owned by the manager. Every settled
/// state is whatever status string the agent last reported for the server,
/// so the value is kept as an opaque string rather than a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerState(String);

impl ContainerState {
    /// State written when a container record is first created.
    pub const INIT: &'static str = "Init";
    /// State written before a start request is sent to the agent.
    pub const STARTING: &'static str = "STARTING";
    /// State written before a stop request is sent to the agent.
    pub const STOPPING: &'static str = "STOPPING";
    /// State written before a delete request is sent to the agent.
    pub const DELETING: &'static str = "DELETING";

    /// Returns the initial state.
    #[must_use]
    pub fn init() -> Self {
        Self(Self::INIT.to_owned())
    }

    /// Returns the start-in-progress marker.
    #[must_use]
    pub fn starting() -> Self {
        Self(Self::STARTING.to_owned())
    }

    /// Returns the stop-in-progress marker.
    #[must_use]
    pub fn stopping() -> Self {
        Self(Self::STOPPING.to_owned())
    }

    /// Returns the delete-in-progress marker.
    #[must_use]
    pub fn deleting() -> Self {
        Self(Self::DELETING.to_owned())
    }

    /// Wraps a status string reported by the agent.
    #[must_use]
    pub fn reported(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    /// Returns the state string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns whether an operation was in flight when this state was written.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self.as_str(),
            Self::INIT | Self::STARTING | Self::STOPPING | Self::DELETING
        )
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
