//! Resource representations observed on the agent.
//!
//! These types are owned by the agent. The manager only reads them: tasks
//! while polling, servers and applications when confirming an operation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Agent-side asynchronous task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// Wraps a raw task identifier.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Resolution of a remote task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// The task has not finished.
    Pending,
    /// The task completed successfully.
    Success,
    /// The task failed.
    Error,
}

impl TaskStatus {
    /// Classifies a status string reported by the agent.
    ///
    /// Anything other than `SUCCESS` or `ERROR` (case-insensitive) is still
    /// in flight.
    #[must_use]
    pub fn from_reported(status: &str) -> Self {
        let normalized = status.trim();
        if normalized.eq_ignore_ascii_case("success") {
            Self::Success
        } else if normalized.eq_ignore_ascii_case("error") {
            Self::Error
        } else {
            Self::Pending
        }
    }
}

/// Handle for an operation the agent completes asynchronously.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTask {
    id: TaskId,
    status: String,
}

impl RemoteTask {
    /// Creates a task handle.
    #[must_use]
    pub fn new(id: TaskId, status: impl Into<String>) -> Self {
        Self {
            id,
            status: status.into(),
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the raw status string.
    #[must_use]
    pub fn reported_status(&self) -> &str {
        &self.status
    }

    /// Returns the classified status.
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        TaskStatus::from_reported(&self.status)
    }
}

/// Server resource as reported by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerResource {
    name: String,
    status: String,
}

impl ServerResource {
    /// Creates a server representation.
    #[must_use]
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }

    /// Returns the server name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the server status string.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }
}

/// Deployment status of an artifact on a server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArtifactStatus {
    /// The artifact is deployed.
    Deployed,
    /// The artifact is known but not deployed.
    NotDeployed,
    /// Any other status string.
    Other(String),
}

impl ArtifactStatus {
    /// Wire value for [`Self::Deployed`].
    pub const DEPLOYED: &'static str = "DEPLOYED";
    /// Wire value for [`Self::NotDeployed`].
    pub const NOT_DEPLOYED: &'static str = "NOT_DEPLOYED";

    /// Classifies a status string reported by the agent.
    #[must_use]
    pub fn from_reported(status: &str) -> Self {
        match status.trim() {
            Self::DEPLOYED => Self::Deployed,
            Self::NOT_DEPLOYED => Self::NotDeployed,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Deployed => Self::DEPLOYED,
            Self::NotDeployed => Self::NOT_DEPLOYED,
            Self::Other(value) => value,
        }
    }
}

impl fmt::Display for ArtifactStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Application or descriptor artifact as reported by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationResource {
    name: String,
    status: String,
}

impl ApplicationResource {
    /// Creates an application representation.
    #[must_use]
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }

    /// Returns the artifact name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the classified deployment status.
    #[must_use]
    pub fn status(&self) -> ArtifactStatus {
        ArtifactStatus::from_reported(&self.status)
    }
}
