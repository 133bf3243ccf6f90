//! Scripted in-memory agent for orchestration tests and local runs.

use crate::container::{
    domain::{
        AgentRecord, ApplicationResource, ArtifactStatus, ContainerName, RemoteTask,
        ServerResource, TaskId,
    },
    ports::{AgentApi, AgentClientError, AgentClientResult, ServerAction},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

const TASK_PENDING: &str = "PENDING";
const TASK_RUNNING: &str = "RUNNING";
const TASK_SUCCESS: &str = "SUCCESS";
const TASK_ERROR: &str = "ERROR";

/// Status reported for a server after a start action.
pub const STARTED: &str = "Started";
/// Status reported for a server after a stop action.
pub const STOPPED: &str = "Stopped";

/// Agent API call observed by [`InMemoryAgent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentCall {
    /// `PUT /server/{name}`.
    CreateServer {
        /// Server name.
        server: String,
        /// Rendered topology.
        topology: String,
    },
    /// `DELETE /server/{name}`.
    DeleteServer {
        /// Server name.
        server: String,
    },
    /// `POST /server/{name}/action/{action}`.
    ServerAction {
        /// Server name.
        server: String,
        /// Posted action.
        action: ServerAction,
    },
    /// `GET /server/{name}`.
    ServerStatus {
        /// Server name.
        server: String,
    },
    /// `GET /task/{id}`.
    TaskStatus {
        /// Polled task.
        task_id: TaskId,
    },
    /// `POST /server/{name}/app/{artifact}/action/deploy`.
    DeployArtifact {
        /// Server name.
        server: String,
        /// Artifact name.
        artifact: String,
        /// Uploaded bytes.
        content: Vec<u8>,
    },
    /// `POST /server/{name}/app/{artifact}/action/undeploy`.
    UndeployArtifact {
        /// Server name.
        server: String,
        /// Artifact name.
        artifact: String,
    },
    /// `GET /server/{name}/app/{artifact}`.
    ArtifactStatus {
        /// Server name.
        server: String,
        /// Artifact name.
        artifact: String,
    },
}

impl AgentCall {
    /// Returns whether the call submitted work to the agent.
    #[must_use]
    pub const fn is_submission(&self) -> bool {
        matches!(
            self,
            Self::CreateServer { .. }
                | Self::DeleteServer { .. }
                | Self::ServerAction { .. }
                | Self::DeployArtifact { .. }
                | Self::UndeployArtifact { .. }
        )
    }
}

/// In-memory agent adapter.
///
/// Every submission returns a task that resolves after a configurable number
/// of polls. Unknown servers, artifacts, and tasks answer HTTP 404.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAgent {
    state: Arc<RwLock<InMemoryAgentState>>,
}

#[derive(Debug)]
struct InMemoryAgentState {
    servers: HashMap<String, String>,
    artifacts: HashMap<(String, String), String>,
    tasks: HashMap<TaskId, ScriptedTask>,
    next_task_id: u64,
    polls_before_resolution: u32,
    fail_next_task: bool,
    created_status: String,
    calls: Vec<AgentCall>,
}

impl Default for InMemoryAgentState {
    fn default() -> Self {
        Self {
            servers: HashMap::new(),
            artifacts: HashMap::new(),
            tasks: HashMap::new(),
            next_task_id: 1,
            polls_before_resolution: 0,
            fail_next_task: false,
            created_status: STARTED.to_owned(),
            calls: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct ScriptedTask {
    remaining_polls: u32,
    outcome: &'static str,
}

fn lock_error(err: impl ToString) -> AgentClientError {
    AgentClientError::transport(std::io::Error::other(err.to_string()))
}

fn not_found(agent: &AgentRecord, path: &str) -> AgentClientError {
    AgentClientError::Request {
        url: format!("{}{path}", agent.api_url()),
        status: 404,
    }
}

impl InMemoryAgentState {
    /// Allocates the task answering a submission. The flag tells whether the
    /// submission takes effect.
    fn submit(&mut self) -> (RemoteTask, bool) {
        let task_id = TaskId::new(self.next_task_id);
        self.next_task_id += 1;
        let succeeds = !std::mem::take(&mut self.fail_next_task);
        let outcome = if succeeds { TASK_SUCCESS } else { TASK_ERROR };
        let initial = if self.polls_before_resolution == 0 {
            outcome
        } else {
            TASK_PENDING
        };
        self.tasks.insert(
            task_id,
            ScriptedTask {
                remaining_polls: self.polls_before_resolution,
                outcome,
            },
        );
        (RemoteTask::new(task_id, initial), succeeds)
    }

    fn server_exists(&self, server: &str) -> bool {
        self.servers.contains_key(server)
    }
}

impl InMemoryAgent {
    /// Creates an agent with no servers whose tasks resolve immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many status polls a task stays pending for.
    ///
    /// # Errors
    ///
    /// Returns [`AgentClientError::Transport`] when lock acquisition fails.
    pub fn set_polls_before_resolution(&self, polls: u32) -> AgentClientResult<()> {
        self.state.write().map_err(lock_error)?.polls_before_resolution = polls;
        Ok(())
    }

    /// Makes the next submitted task resolve to an error without effect.
    ///
    /// # Errors
    ///
    /// Returns [`AgentClientError::Transport`] when lock acquisition fails.
    pub fn fail_next_task(&self) -> AgentClientResult<()> {
        self.state.write().map_err(lock_error)?.fail_next_task = true;
        Ok(())
    }

    /// Sets the status reported for newly created servers.
    ///
    /// # Errors
    ///
    /// Returns [`AgentClientError::Transport`] when lock acquisition fails.
    pub fn set_created_status(&self, status: impl Into<String>) -> AgentClientResult<()> {
        self.state.write().map_err(lock_error)?.created_status = status.into();
        Ok(())
    }

    /// Seeds a server with a status.
    ///
    /// # Errors
    ///
    /// Returns [`AgentClientError::Transport`] when lock acquisition fails.
    pub fn insert_server(
        &self,
        server: impl Into<String>,
        status: impl Into<String>,
    ) -> AgentClientResult<()> {
        self.state
            .write()
            .map_err(lock_error)?
            .servers
            .insert(server.into(), status.into());
        Ok(())
    }

    /// Drops a server as if it had been removed out of band.
    ///
    /// # Errors
    ///
    /// Returns [`AgentClientError::Transport`] when lock acquisition fails.
    pub fn forget_server(&self, server: &str) -> AgentClientResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.servers.remove(server);
        state.artifacts.retain(|(owner, _), _| owner != server);
        Ok(())
    }

    /// Seeds the status of an artifact on a server.
    ///
    /// # Errors
    ///
    /// Returns [`AgentClientError::Transport`] when lock acquisition fails.
    pub fn set_artifact_status(
        &self,
        server: impl Into<String>,
        artifact: impl Into<String>,
        status: impl Into<String>,
    ) -> AgentClientResult<()> {
        self.state
            .write()
            .map_err(lock_error)?
            .artifacts
            .insert((server.into(), artifact.into()), status.into());
        Ok(())
    }

    /// Returns every call observed so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AgentClientError::Transport`] when lock acquisition fails.
    pub fn calls(&self) -> AgentClientResult<Vec<AgentCall>> {
        Ok(self.state.read().map_err(lock_error)?.calls.clone())
    }

    /// Returns the artifacts deployed through this agent, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`AgentClientError::Transport`] when lock acquisition fails.
    pub fn deployed_artifacts(&self) -> AgentClientResult<Vec<String>> {
        Ok(self
            .calls()?
            .into_iter()
            .filter_map(|call| match call {
                AgentCall::DeployArtifact { artifact, .. } => Some(artifact),
                _ => None,
            })
            .collect())
    }
}

#[async_trait]
impl AgentApi for InMemoryAgent {
    async fn create_server(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        topology: &str,
    ) -> AgentClientResult<Option<RemoteTask>> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.calls.push(AgentCall::CreateServer {
            server: server.to_string(),
            topology: topology.to_owned(),
        });
        if state.server_exists(server.as_str()) {
            return Err(AgentClientError::Request {
                url: format!("{}/server/{server}", agent.api_url()),
                status: 409,
            });
        }
        let (task, succeeds) = state.submit();
        if succeeds {
            let status = state.created_status.clone();
            state.servers.insert(server.to_string(), status);
        }
        Ok(Some(task))
    }

    async fn delete_server(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
    ) -> AgentClientResult<Option<RemoteTask>> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.calls.push(AgentCall::DeleteServer {
            server: server.to_string(),
        });
        if !state.server_exists(server.as_str()) {
            return Err(not_found(agent, &format!("/server/{server}")));
        }
        let (task, succeeds) = state.submit();
        if succeeds {
            state.servers.remove(server.as_str());
            state
                .artifacts
                .retain(|(owner, _), _| owner != server.as_str());
        }
        Ok(Some(task))
    }

    async fn server_action(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        action: ServerAction,
    ) -> AgentClientResult<Option<RemoteTask>> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.calls.push(AgentCall::ServerAction {
            server: server.to_string(),
            action,
        });
        if !state.server_exists(server.as_str()) {
            return Err(not_found(agent, &format!("/server/{server}")));
        }
        let (task, succeeds) = state.submit();
        if succeeds {
            let status = match action {
                ServerAction::Start => STARTED,
                ServerAction::Stop => STOPPED,
            };
            state.servers.insert(server.to_string(), status.to_owned());
        }
        Ok(Some(task))
    }

    async fn server_status(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
    ) -> AgentClientResult<ServerResource> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.calls.push(AgentCall::ServerStatus {
            server: server.to_string(),
        });
        state
            .servers
            .get(server.as_str())
            .map(|status| ServerResource::new(server.as_str(), status.as_str()))
            .ok_or_else(|| not_found(agent, &format!("/server/{server}")))
    }

    async fn task_status(
        &self,
        agent: &AgentRecord,
        task_id: TaskId,
    ) -> AgentClientResult<RemoteTask> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.calls.push(AgentCall::TaskStatus { task_id });
        let task = state
            .tasks
            .get_mut(&task_id)
            .ok_or_else(|| not_found(agent, &format!("/task/{task_id}")))?;
        task.remaining_polls = task.remaining_polls.saturating_sub(1);
        let status = if task.remaining_polls == 0 {
            task.outcome
        } else {
            TASK_RUNNING
        };
        Ok(RemoteTask::new(task_id, status))
    }

    async fn deploy_artifact(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        artifact: &str,
        content: Vec<u8>,
    ) -> AgentClientResult<Option<RemoteTask>> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.calls.push(AgentCall::DeployArtifact {
            server: server.to_string(),
            artifact: artifact.to_owned(),
            content,
        });
        if !state.server_exists(server.as_str()) {
            return Err(not_found(agent, &format!("/server/{server}")));
        }
        let (task, succeeds) = state.submit();
        if succeeds {
            state.artifacts.insert(
                (server.to_string(), artifact.to_owned()),
                ArtifactStatus::DEPLOYED.to_owned(),
            );
        }
        Ok(Some(task))
    }

    async fn undeploy_artifact(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        artifact: &str,
    ) -> AgentClientResult<Option<RemoteTask>> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.calls.push(AgentCall::UndeployArtifact {
            server: server.to_string(),
            artifact: artifact.to_owned(),
        });
        let key = (server.to_string(), artifact.to_owned());
        if !state.artifacts.contains_key(&key) {
            return Err(not_found(agent, &format!("/server/{server}/app/{artifact}")));
        }
        let (task, succeeds) = state.submit();
        if succeeds {
            state
                .artifacts
                .insert(key, ArtifactStatus::NOT_DEPLOYED.to_owned());
        }
        Ok(Some(task))
    }

    async fn artifact_status(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        artifact: &str,
    ) -> AgentClientResult<ApplicationResource> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.calls.push(AgentCall::ArtifactStatus {
            server: server.to_string(),
            artifact: artifact.to_owned(),
        });
        state
            .artifacts
            .get(&(server.to_string(), artifact.to_owned()))
            .map(|status| ApplicationResource::new(artifact, status.as_str()))
            .ok_or_else(|| not_found(agent, &format!("/server/{server}/app/{artifact}")))
    }
}
