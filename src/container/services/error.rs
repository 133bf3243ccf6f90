//! Service-level error taxonomy for container orchestration.

use super::poller::TaskPollError;
use crate::container::{
    domain::{AgentName, ArtifactStatus, ContainerDomainError, ContainerName, TaskId},
    ports::{
        AgentClientError, AgentLinkRegistryError, CatalogError, ContainerRegistryError,
        TemplateSourceError,
    },
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by container lifecycle operations.
///
/// Every error ends the current operation. The registry keeps whatever
/// state was last written, so callers re-query or retry rather than assume
/// a rollback.
#[derive(Debug, Clone, Error)]
pub enum ContainerManagerError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ContainerDomainError),

    /// No agent is registered under the requested name.
    #[error("unknown agent: {0}")]
    UnknownAgent(AgentName),

    /// The catalog has no configuration with the requested name.
    #[error("unknown configuration: {0}")]
    UnknownConfiguration(String),

    /// A container with the requested name already exists.
    #[error("container '{0}' already exists")]
    AlreadyExists(ContainerName),

    /// No container exists with the requested name.
    #[error("container '{0}' not found")]
    NotFound(ContainerName),

    /// The container has no owning agent.
    #[error("no agent owns container '{0}'")]
    NoAgent(ContainerName),

    /// The agent reported the task as failed.
    #[error("agent task {task_id} failed")]
    RemoteTask {
        /// Failed task.
        task_id: TaskId,
    },

    /// The agent task did not resolve before the polling deadline.
    #[error("agent task {task_id} still pending after {waited:?}")]
    TaskTimeout {
        /// Pending task.
        task_id: TaskId,
        /// Time spent waiting.
        waited: Duration,
    },

    /// An agent request or response was rejected.
    #[error(transparent)]
    Agent(#[from] AgentClientError),

    /// The confirmation read reported an unexpected artifact status.
    #[error("artifact '{artifact}' is {actual}, expected {expected}")]
    UnexpectedArtifactStatus {
        /// Artifact name.
        artifact: String,
        /// Status the operation should have produced.
        expected: ArtifactStatus,
        /// Status reported by the agent.
        actual: ArtifactStatus,
    },

    /// Another operation updated the container first.
    #[error("container '{container}' was modified concurrently (read version {expected})")]
    ConcurrentModification {
        /// Container name.
        container: ContainerName,
        /// Version this operation read.
        expected: u64,
    },

    /// Container registry failure.
    #[error(transparent)]
    Registry(ContainerRegistryError),

    /// Agent link registry failure.
    #[error(transparent)]
    Links(#[from] AgentLinkRegistryError),

    /// Catalog lookup failure.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Template loading failure.
    #[error(transparent)]
    Template(#[from] TemplateSourceError),

    /// A local deployable could not be read.
    #[error("failed to read deployable '{path}': {source}")]
    ArtifactRead {
        /// Local path.
        path: String,
        /// Underlying failure.
        source: Arc<std::io::Error>,
    },
}

impl ContainerManagerError {
    /// Returns whether the error was raised before any remote call or
    /// registry mutation.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Domain(_)
                | Self::UnknownAgent(_)
                | Self::UnknownConfiguration(_)
                | Self::AlreadyExists(_)
        )
    }
}

impl From<ContainerRegistryError> for ContainerManagerError {
    fn from(error: ContainerRegistryError) -> Self {
        match error {
            ContainerRegistryError::VersionConflict {
                container,
                expected,
                ..
            } => Self::ConcurrentModification {
                container,
                expected,
            },
            other => Self::Registry(other),
        }
    }
}

impl From<TaskPollError> for ContainerManagerError {
    fn from(error: TaskPollError) -> Self {
        match error {
            TaskPollError::Failed { task_id } => Self::RemoteTask { task_id },
            TaskPollError::TimedOut { task_id, waited } => Self::TaskTimeout { task_id, waited },
            TaskPollError::Agent(agent_error) => Self::Agent(agent_error),
        }
    }
}

/// Result type for container lifecycle operations.
pub type ContainerManagerResult<T> = Result<T, ContainerManagerError>;
