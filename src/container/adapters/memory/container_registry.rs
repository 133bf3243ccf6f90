//! In-memory registry for container records.

use crate::container::{
    domain::{ContainerId, ContainerName, ContainerRecord},
    ports::{ContainerRegistry, ContainerRegistryError, ContainerRegistryResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory container registry with compare-and-swap updates.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContainerRegistry {
    state: Arc<RwLock<InMemoryContainerState>>,
}

#[derive(Debug, Default)]
struct InMemoryContainerState {
    containers: HashMap<ContainerId, ContainerRecord>,
    name_index: HashMap<ContainerName, ContainerId>,
}

impl InMemoryContainerRegistry {
    /// Creates an empty in-memory registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> ContainerRegistryError {
    ContainerRegistryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ContainerRegistry for InMemoryContainerRegistry {
    async fn create(&self, record: &ContainerRecord) -> ContainerRegistryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;

        if state.containers.contains_key(&record.id()) {
            return Err(ContainerRegistryError::DuplicateContainer(record.id()));
        }
        if state.name_index.contains_key(record.name()) {
            return Err(ContainerRegistryError::DuplicateContainerName(
                record.name().clone(),
            ));
        }

        state.name_index.insert(record.name().clone(), record.id());
        state.containers.insert(record.id(), record.clone());
        Ok(())
    }

    async fn update(&self, record: &ContainerRecord) -> ContainerRegistryResult<ContainerRecord> {
        let mut state = self.state.write().map_err(lock_error)?;

        let stored = state
            .containers
            .get(&record.id())
            .ok_or(ContainerRegistryError::NotFound(record.id()))?;
        if stored.version() != record.version() {
            return Err(ContainerRegistryError::VersionConflict {
                container: record.name().clone(),
                expected: record.version(),
                actual: stored.version(),
            });
        }

        let mut next = record.clone();
        next.advance_version();
        state.containers.insert(next.id(), next.clone());
        Ok(next)
    }

    async fn delete(&self, container_id: ContainerId) -> ContainerRegistryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let removed = state
            .containers
            .remove(&container_id)
            .ok_or(ContainerRegistryError::NotFound(container_id))?;
        state.name_index.remove(removed.name());
        Ok(())
    }

    async fn find_by_id(
        &self,
        container_id: ContainerId,
    ) -> ContainerRegistryResult<Option<ContainerRecord>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.containers.get(&container_id).cloned())
    }

    async fn find_by_name(
        &self,
        container_name: &ContainerName,
    ) -> ContainerRegistryResult<Option<ContainerRecord>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .name_index
            .get(container_name)
            .and_then(|id| state.containers.get(id))
            .cloned())
    }
}
