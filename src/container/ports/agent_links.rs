//! Registry port for agents and agent-to-resource links.

use crate::container::domain::{AgentId, AgentName, AgentRecord, ResourceKind, ResourceLink};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Result type for agent link registry operations.
pub type AgentLinkRegistryResult<T> = Result<T, AgentLinkRegistryError>;

/// Persistence contract for agents and the resources they own.
///
/// A resource is owned by at most one agent and is never reassigned.
#[async_trait]
pub trait AgentLinkRegistry: Send + Sync {
    /// Stores a new agent.
    ///
    /// # Errors
    ///
    /// Returns [`AgentLinkRegistryError::DuplicateAgentName`] when the name is
    /// already registered.
    async fn register_agent(&self, agent: &AgentRecord) -> AgentLinkRegistryResult<()>;

    /// Finds an agent by name.
    async fn find_agent_by_name(
        &self,
        agent_name: &AgentName,
    ) -> AgentLinkRegistryResult<Option<AgentRecord>>;

    /// Finds the agent owning a resource.
    async fn find_agent_by_resource(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> AgentLinkRegistryResult<Option<AgentRecord>>;

    /// Returns whether exactly this link is already stored.
    async fn link_exists(&self, link: &ResourceLink) -> AgentLinkRegistryResult<bool>;

    /// Stores a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AgentLinkRegistryError::UnknownAgent`] when the agent is not
    /// registered, [`AgentLinkRegistryError::DuplicateLink`] when the link is
    /// already stored, and [`AgentLinkRegistryError::ResourceAlreadyOwned`]
    /// when another agent owns the resource.
    async fn create_link(&self, link: &ResourceLink) -> AgentLinkRegistryResult<()>;

    /// Removes every link pointing at a resource, returning how many were
    /// removed.
    async fn remove_links_for_resource(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> AgentLinkRegistryResult<usize>;

    /// Returns the identifiers of the resources of `kind` owned by an agent.
    async fn find_resources_by_agent(
        &self,
        agent_id: AgentId,
        kind: ResourceKind,
    ) -> AgentLinkRegistryResult<Vec<Uuid>>;
}

/// Errors returned by agent link registry implementations.
#[derive(Debug, Clone, Error)]
pub enum AgentLinkRegistryError {
    /// An agent with the same name already exists.
    #[error("duplicate agent name: {0}")]
    DuplicateAgentName(AgentName),

    /// The agent referenced by a link is not registered.
    #[error("agent not registered: {0}")]
    UnknownAgent(AgentId),

    /// The link is already stored.
    #[error("{kind} {resource_id} is already linked to agent {agent_id}")]
    DuplicateLink {
        /// Owning agent.
        agent_id: AgentId,
        /// Linked resource.
        resource_id: Uuid,
        /// Linked resource kind.
        kind: ResourceKind,
    },

    /// The resource is owned by a different agent.
    #[error("{kind} {resource_id} is already owned by agent {owner}")]
    ResourceAlreadyOwned {
        /// Current owner.
        owner: AgentId,
        /// Linked resource.
        resource_id: Uuid,
        /// Linked resource kind.
        kind: ResourceKind,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AgentLinkRegistryError {
    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
