//! Agent records and agent-to-resource association links.

use super::{AgentId, AgentName, ContainerDomainError, ContainerId};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;
use uuid::Uuid;

/// Remote execution agent responsible for a set of resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    id: AgentId,
    name: AgentName,
    api_url: String,
}

impl AgentRecord {
    /// Creates an agent record.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerDomainError::InvalidAgentUrl`] when `api_url` is not
    /// an absolute `http` or `https` URL.
    pub fn new(name: AgentName, api_url: impl Into<String>) -> Result<Self, ContainerDomainError> {
        let raw_url = api_url.into().trim().to_owned();
        let is_http = Url::parse(&raw_url)
            .map(|parsed| matches!(parsed.scheme(), "http" | "https") && parsed.has_host())
            .unwrap_or(false);
        if !is_http {
            return Err(ContainerDomainError::InvalidAgentUrl(raw_url));
        }

        Ok(Self {
            id: AgentId::new(),
            name,
            api_url: raw_url,
        })
    }

    /// Returns the agent identifier.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Returns the agent name.
    #[must_use]
    pub const fn name(&self) -> &AgentName {
        &self.name
    }

    /// Returns the base URL of the agent API.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// Kind of resource an agent link points at.
///
/// Links are queried by this discriminator instead of by inspecting the
/// linked resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Application-server container.
    Container,
}

impl ResourceKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Container => "container",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Association between an agent and a resource it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceLink {
    agent_id: AgentId,
    resource_id: Uuid,
    kind: ResourceKind,
}

impl ResourceLink {
    /// Creates a link between an agent and a container.
    #[must_use]
    pub const fn container(agent_id: AgentId, container_id: ContainerId) -> Self {
        Self {
            agent_id,
            resource_id: container_id.into_inner(),
            kind: ResourceKind::Container,
        }
    }

    /// Returns the owning agent.
    #[must_use]
    pub const fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    /// Returns the linked resource identifier.
    #[must_use]
    pub const fn resource_id(&self) -> Uuid {
        self.resource_id
    }

    /// Returns the linked resource kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }
}
