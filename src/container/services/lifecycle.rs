//! Container lifecycle orchestration: create, start, stop, remove.
//!
//! Each transition writes its in-progress marker before contacting the
//! agent, waits for the agent task, then mirrors the server status read back
//! from the agent into the registry.

use super::error::{ContainerManagerError, ContainerManagerResult};
use super::poller::TaskPoller;
use crate::config::{ContainerManagerSettings, ExpectedConfiguration};
use crate::container::{
    domain::{
        AgentName, AgentRecord, ContainerId, ContainerName, ContainerRecord, ContainerState,
        RemoteTask, ResourceKind, ResourceLink, render_topology,
    },
    ports::{
        AgentApi, AgentLinkRegistry, ConfigurationCatalog, ContainerRegistry, ServerAction,
        TemplateSource,
    },
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request payload for creating a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateContainerRequest {
    /// Unique container name.
    pub name: String,
    /// Name of the agent that will host the container.
    pub agent: String,
    /// Catalog configuration to create the container from.
    pub configuration: String,
    /// Optional port range exposed to the topology template.
    pub port_range: Option<u16>,
}

impl CreateContainerRequest {
    /// Creates a request without a port range.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        agent: impl Into<String>,
        configuration: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            agent: agent.into(),
            configuration: configuration.into(),
            port_range: None,
        }
    }

    /// Sets the port range passed to the topology template.
    #[must_use]
    pub const fn with_port_range(mut self, port_range: u16) -> Self {
        self.port_range = Some(port_range);
        self
    }
}

/// Collaborators of [`ContainerLifecycleService`].
pub struct LifecycleCollaborators<R, L, A, G, T, C> {
    /// Container record registry.
    pub containers: Arc<R>,
    /// Agent and link registry.
    pub links: Arc<L>,
    /// Agent API client.
    pub agent: Arc<A>,
    /// Configuration catalog.
    pub catalog: Arc<G>,
    /// Topology template source.
    pub templates: Arc<T>,
    /// Clock stamping record updates.
    pub clock: Arc<C>,
}

/// Container lifecycle orchestration service.
#[derive(Clone)]
pub struct ContainerLifecycleService<R, L, A, G, T, C>
where
    R: ContainerRegistry,
    L: AgentLinkRegistry,
    A: AgentApi,
    G: ConfigurationCatalog,
    T: TemplateSource,
    C: Clock + Send + Sync,
{
    pub(super) containers: Arc<R>,
    pub(super) links: Arc<L>,
    pub(super) agent: Arc<A>,
    catalog: Arc<G>,
    templates: Arc<T>,
    pub(super) clock: Arc<C>,
    poller: TaskPoller<A>,
    expected: ExpectedConfiguration,
}

impl<R, L, A, G, T, C> ContainerLifecycleService<R, L, A, G, T, C>
where
    R: ContainerRegistry,
    L: AgentLinkRegistry,
    A: AgentApi,
    G: ConfigurationCatalog,
    T: TemplateSource,
    C: Clock + Send + Sync,
{
    /// Creates a lifecycle service.
    #[must_use]
    pub fn new(
        collaborators: LifecycleCollaborators<R, L, A, G, T, C>,
        settings: &ContainerManagerSettings,
    ) -> Self {
        let LifecycleCollaborators {
            containers,
            links,
            agent,
            catalog,
            templates,
            clock,
        } = collaborators;
        Self {
            poller: TaskPoller::new(Arc::clone(&agent), settings.polling),
            containers,
            links,
            agent,
            catalog,
            templates,
            clock,
            expected: settings.expected_configuration.clone(),
        }
    }

    /// Creates a container on an agent from a catalog configuration.
    ///
    /// Validation (agent, catalog entry, configuration kind, template) runs
    /// before anything is written or sent.
    ///
    /// # Errors
    ///
    /// Returns validation errors ([`ContainerManagerError::is_validation`])
    /// without side effects, [`ContainerManagerError::AlreadyExists`] when
    /// the name is taken, and task, agent, or registry errors afterwards. A
    /// failure after the record is written leaves it in `Init`.
    pub async fn create_container(
        &self,
        request: CreateContainerRequest,
    ) -> ContainerManagerResult<ContainerRecord> {
        let container_name = ContainerName::new(request.name)?;
        let agent_name = AgentName::new(request.agent)?;
        info!(container = %container_name, agent = %agent_name, "creating container");

        let agent = self
            .links
            .find_agent_by_name(&agent_name)
            .await?
            .ok_or(ContainerManagerError::UnknownAgent(agent_name))?;
        let configuration = self
            .catalog
            .find_configuration(&request.configuration)?
            .ok_or(ContainerManagerError::UnknownConfiguration(
                request.configuration,
            ))?;
        configuration.ensure_kind(&self.expected.config_type, &self.expected.sub_type)?;
        let template = self.templates.load(configuration.template_path())?;
        let topology = render_topology(
            configuration.template_path(),
            &template,
            &container_name,
            request.port_range,
        )?;

        if self.containers.find_by_name(&container_name).await?.is_some() {
            return Err(ContainerManagerError::AlreadyExists(container_name));
        }
        let record = ContainerRecord::new(container_name, configuration.name(), &*self.clock);
        self.containers.create(&record).await?;
        self.ensure_link(&agent, &record).await?;

        let submitted = self
            .agent
            .create_server(&agent, record.name(), &topology)
            .await?;
        self.await_submission(&agent, submitted).await?;
        let created = self.resync_state(&agent, record).await?;

        info!(container = %created.name(), state = %created.state(), "container created");
        Ok(created)
    }

    /// Starts a container.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerManagerError::NotFound`] or
    /// [`ContainerManagerError::NoAgent`] when the container cannot be
    /// addressed, and task, agent, or registry errors. A failure after the
    /// `STARTING` marker is written leaves the record in that state.
    pub async fn start_container(&self, name: &str) -> ContainerManagerResult<ContainerRecord> {
        self.transition(name, ServerAction::Start, ContainerState::starting())
            .await
    }

    /// Stops a container.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerManagerError::NotFound`] or
    /// [`ContainerManagerError::NoAgent`] when the container cannot be
    /// addressed, and task, agent, or registry errors. A failure after the
    /// `STOPPING` marker is written leaves the record in that state.
    pub async fn stop_container(&self, name: &str) -> ContainerManagerResult<ContainerRecord> {
        self.transition(name, ServerAction::Stop, ContainerState::stopping())
            .await
    }

    /// Removes a container from its agent and from the registry.
    ///
    /// A server the agent reports as absent counts as removed, so retrying a
    /// failed removal converges.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerManagerError::NotFound`] or
    /// [`ContainerManagerError::NoAgent`] when the container cannot be
    /// addressed, and task, agent, or registry errors. A failure after the
    /// `DELETING` marker is written leaves the record in that state.
    pub async fn remove_container(&self, name: &str) -> ContainerManagerResult<()> {
        let container_name = ContainerName::new(name)?;
        info!(container = %container_name, "removing container");

        let found = self.find_container_or_error(&container_name).await?;
        let record = self.write_state(found, ContainerState::deleting()).await?;
        let agent = self.owning_agent(&record).await?;

        match self.agent.delete_server(&agent, record.name()).await {
            Ok(submitted) => self.await_submission(&agent, submitted).await?,
            Err(err) if err.is_not_found() => {
                warn!(container = %container_name, "server already absent on agent");
            }
            Err(err) => return Err(err.into()),
        }

        let removed_links = self
            .links
            .remove_links_for_resource(ResourceKind::Container, record.id().into_inner())
            .await?;
        self.containers.delete(record.id()).await?;

        info!(container = %container_name, removed_links, "container removed");
        Ok(())
    }

    /// Re-reads the server status from the agent and stores it.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerManagerError::NotFound`] or
    /// [`ContainerManagerError::NoAgent`] when the container cannot be
    /// addressed, and agent or registry errors.
    pub async fn refresh_state(&self, name: &str) -> ContainerManagerResult<ContainerRecord> {
        let container_name = ContainerName::new(name)?;
        let record = self.find_container_or_error(&container_name).await?;
        let agent = self.owning_agent(&record).await?;
        self.resync_state(&agent, record).await
    }

    /// Finds a container by name.
    ///
    /// # Errors
    ///
    /// Returns domain validation errors when the name is invalid and
    /// registry errors.
    pub async fn find_container(
        &self,
        name: &str,
    ) -> ContainerManagerResult<Option<ContainerRecord>> {
        let container_name = ContainerName::new(name)?;
        Ok(self.containers.find_by_name(&container_name).await?)
    }

    /// Lists the containers owned by an agent.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerManagerError::UnknownAgent`] when no agent has the
    /// name, and registry errors.
    pub async fn containers_for_agent(
        &self,
        agent: &str,
    ) -> ContainerManagerResult<Vec<ContainerRecord>> {
        let agent_name = AgentName::new(agent)?;
        let owner = self
            .links
            .find_agent_by_name(&agent_name)
            .await?
            .ok_or(ContainerManagerError::UnknownAgent(agent_name))?;

        let resource_ids = self
            .links
            .find_resources_by_agent(owner.id(), ResourceKind::Container)
            .await?;
        let mut records = Vec::with_capacity(resource_ids.len());
        for resource_id in resource_ids {
            if let Some(record) = self
                .containers
                .find_by_id(ContainerId::from_uuid(resource_id))
                .await?
            {
                records.push(record);
            }
        }
        Ok(records)
    }

    async fn transition(
        &self,
        name: &str,
        action: ServerAction,
        marker: ContainerState,
    ) -> ContainerManagerResult<ContainerRecord> {
        let container_name = ContainerName::new(name)?;
        info!(container = %container_name, %action, "container transition requested");

        let found = self.find_container_or_error(&container_name).await?;
        let record = self.write_state(found, marker).await?;
        let agent = self.owning_agent(&record).await?;

        let submitted = self
            .agent
            .server_action(&agent, record.name(), action)
            .await?;
        self.await_submission(&agent, submitted).await?;
        let settled = self.resync_state(&agent, record).await?;

        info!(container = %container_name, %action, state = %settled.state(), "container transition done");
        Ok(settled)
    }

    async fn ensure_link(
        &self,
        agent: &AgentRecord,
        record: &ContainerRecord,
    ) -> ContainerManagerResult<()> {
        let link = ResourceLink::container(agent.id(), record.id());
        if self.links.link_exists(&link).await? {
            debug!(container = %record.name(), agent = %agent.name(), "agent link already present");
            return Ok(());
        }
        self.links.create_link(&link).await?;
        Ok(())
    }

    pub(super) async fn find_container_or_error(
        &self,
        name: &ContainerName,
    ) -> ContainerManagerResult<ContainerRecord> {
        self.containers
            .find_by_name(name)
            .await?
            .ok_or_else(|| ContainerManagerError::NotFound(name.clone()))
    }

    pub(super) async fn owning_agent(
        &self,
        record: &ContainerRecord,
    ) -> ContainerManagerResult<AgentRecord> {
        self.links
            .find_agent_by_resource(ResourceKind::Container, record.id().into_inner())
            .await?
            .ok_or_else(|| ContainerManagerError::NoAgent(record.name().clone()))
    }

    /// Waits for the task answering a submission, if the agent returned one.
    pub(super) async fn await_submission(
        &self,
        agent: &AgentRecord,
        submitted: Option<RemoteTask>,
    ) -> ContainerManagerResult<()> {
        if let Some(task) = submitted {
            self.poller.wait(agent, task).await?;
        }
        Ok(())
    }

    async fn write_state(
        &self,
        mut record: ContainerRecord,
        state: ContainerState,
    ) -> ContainerManagerResult<ContainerRecord> {
        record.set_state(state, &*self.clock);
        Ok(self.containers.update(&record).await?)
    }

    /// Mirrors the agent's current server status into `record` and stores it.
    pub(super) async fn resync_state(
        &self,
        agent: &AgentRecord,
        record: ContainerRecord,
    ) -> ContainerManagerResult<ContainerRecord> {
        let server = self.agent.server_status(agent, record.name()).await?;
        self.write_state(record, ContainerState::reported(server.status()))
            .await
    }
}
