//! Agent API port for remote server and artifact operations.

use crate::container::domain::{
    AgentRecord, ApplicationResource, ContainerName, RemoteTask, ServerResource, TaskId,
};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for agent API operations.
pub type AgentClientResult<T> = Result<T, AgentClientError>;

/// Lifecycle action posted to a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerAction {
    /// Start the server.
    Start,
    /// Stop the server.
    Stop,
}

impl ServerAction {
    /// Returns the path segment used by the agent API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for ServerAction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Remote operations exposed by an execution agent.
///
/// Submitting operations return `Some(task)` when the agent completes them
/// asynchronously and `None` when the agent answered without a task.
#[async_trait]
pub trait AgentApi: Send + Sync {
    /// Creates a server from a rendered topology (`PUT /server/{name}`).
    async fn create_server(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        topology: &str,
    ) -> AgentClientResult<Option<RemoteTask>>;

    /// Deletes a server (`DELETE /server/{name}`).
    async fn delete_server(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
    ) -> AgentClientResult<Option<RemoteTask>>;

    /// Posts a lifecycle action (`POST /server/{name}/action/{action}`).
    async fn server_action(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        action: ServerAction,
    ) -> AgentClientResult<Option<RemoteTask>>;

    /// Reads the current server representation (`GET /server/{name}`).
    async fn server_status(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
    ) -> AgentClientResult<ServerResource>;

    /// Reads the current task representation (`GET /task/{id}`).
    async fn task_status(
        &self,
        agent: &AgentRecord,
        task_id: TaskId,
    ) -> AgentClientResult<RemoteTask>;

    /// Uploads and deploys an artifact
    /// (`POST /server/{name}/app/{artifact}/action/deploy`).
    async fn deploy_artifact(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        artifact: &str,
        content: Vec<u8>,
    ) -> AgentClientResult<Option<RemoteTask>>;

    /// Undeploys an artifact
    /// (`POST /server/{name}/app/{artifact}/action/undeploy`).
    async fn undeploy_artifact(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        artifact: &str,
    ) -> AgentClientResult<Option<RemoteTask>>;

    /// Reads an artifact's deployment status
    /// (`GET /server/{name}/app/{artifact}`).
    async fn artifact_status(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        artifact: &str,
    ) -> AgentClientResult<ApplicationResource>;
}

/// Errors returned by agent API adapters.
#[derive(Debug, Clone, Error)]
pub enum AgentClientError {
    /// The agent answered with a status other than 200, 202, or 204.
    #[error("agent request {url} failed with HTTP status {status}")]
    Request {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The agent answered with an unexpected content type.
    #[error("agent response from {url} has unexpected content type '{content_type}'")]
    Response {
        /// Request URL.
        url: String,
        /// Content type received.
        content_type: String,
    },

    /// The response body could not be decoded.
    #[error("agent response from {url} could not be decoded: {reason}")]
    Decode {
        /// Request URL.
        url: String,
        /// Decoder diagnostic.
        reason: String,
    },

    /// Connection-level failure.
    #[error("agent transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl AgentClientError {
    /// Wraps a connection-level failure.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }

    /// Returns whether the agent reported the addressed resource as absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Request { status: 404, .. })
    }
}
