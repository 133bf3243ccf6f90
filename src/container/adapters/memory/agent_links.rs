//! In-memory registry for agents and their resource links.

use crate::container::{
    domain::{AgentId, AgentName, AgentRecord, ResourceKind, ResourceLink},
    ports::{AgentLinkRegistry, AgentLinkRegistryError, AgentLinkRegistryResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Thread-safe in-memory agent link registry.
///
/// Ownership is indexed in both directions so lookups by resource and by
/// agent are keyed reads.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAgentLinkRegistry {
    state: Arc<RwLock<InMemoryLinkState>>,
}

#[derive(Debug, Default)]
struct InMemoryLinkState {
    agents: HashMap<AgentId, AgentRecord>,
    name_index: HashMap<AgentName, AgentId>,
    owners: HashMap<(ResourceKind, Uuid), AgentId>,
    owned: HashMap<(AgentId, ResourceKind), Vec<Uuid>>,
}

impl InMemoryAgentLinkRegistry {
    /// Creates an empty in-memory registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> AgentLinkRegistryError {
    AgentLinkRegistryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl AgentLinkRegistry for InMemoryAgentLinkRegistry {
    async fn register_agent(&self, agent: &AgentRecord) -> AgentLinkRegistryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.name_index.contains_key(agent.name()) {
            return Err(AgentLinkRegistryError::DuplicateAgentName(
                agent.name().clone(),
            ));
        }
        state.name_index.insert(agent.name().clone(), agent.id());
        state.agents.insert(agent.id(), agent.clone());
        Ok(())
    }

    async fn find_agent_by_name(
        &self,
        agent_name: &AgentName,
    ) -> AgentLinkRegistryResult<Option<AgentRecord>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .name_index
            .get(agent_name)
            .and_then(|id| state.agents.get(id))
            .cloned())
    }

    async fn find_agent_by_resource(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> AgentLinkRegistryResult<Option<AgentRecord>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .owners
            .get(&(kind, resource_id))
            .and_then(|id| state.agents.get(id))
            .cloned())
    }

    async fn link_exists(&self, link: &ResourceLink) -> AgentLinkRegistryResult<bool> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.owners.get(&(link.kind(), link.resource_id())) == Some(&link.agent_id()))
    }

    async fn create_link(&self, link: &ResourceLink) -> AgentLinkRegistryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.agents.contains_key(&link.agent_id()) {
            return Err(AgentLinkRegistryError::UnknownAgent(link.agent_id()));
        }

        let key = (link.kind(), link.resource_id());
        if let Some(&owner) = state.owners.get(&key) {
            return Err(if owner == link.agent_id() {
                AgentLinkRegistryError::DuplicateLink {
                    agent_id: owner,
                    resource_id: link.resource_id(),
                    kind: link.kind(),
                }
            } else {
                AgentLinkRegistryError::ResourceAlreadyOwned {
                    owner,
                    resource_id: link.resource_id(),
                    kind: link.kind(),
                }
            });
        }

        state.owners.insert(key, link.agent_id());
        state
            .owned
            .entry((link.agent_id(), link.kind()))
            .or_default()
            .push(link.resource_id());
        Ok(())
    }

    async fn remove_links_for_resource(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
    ) -> AgentLinkRegistryResult<usize> {
        let mut state = self.state.write().map_err(lock_error)?;
        let Some(owner) = state.owners.remove(&(kind, resource_id)) else {
            return Ok(0);
        };
        if let Some(resources) = state.owned.get_mut(&(owner, kind)) {
            resources.retain(|owned_id| *owned_id != resource_id);
        }
        Ok(1)
    }

    async fn find_resources_by_agent(
        &self,
        agent_id: AgentId,
        kind: ResourceKind,
    ) -> AgentLinkRegistryResult<Vec<Uuid>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .owned
            .get(&(agent_id, kind))
            .cloned()
            .unwrap_or_default())
    }
}
