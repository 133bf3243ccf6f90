//! Registry port for container record persistence.

use crate::container::domain::{ContainerId, ContainerName, ContainerRecord};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for container registry operations.
pub type ContainerRegistryResult<T> = Result<T, ContainerRegistryError>;

/// Persistence contract for container records.
///
/// Updates are compare-and-swap on [`ContainerRecord::version`], so two
/// callers racing on the same container cannot silently overwrite each
/// other.
#[async_trait]
pub trait ContainerRegistry: Send + Sync {
    /// Stores a new container record.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerRegistryError::DuplicateContainer`] when the ID
    /// already exists or [`ContainerRegistryError::DuplicateContainerName`]
    /// when the name is already registered.
    async fn create(&self, record: &ContainerRecord) -> ContainerRegistryResult<()>;

    /// Persists an updated record if nobody else updated it first.
    ///
    /// Returns the stored record carrying the advanced version.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerRegistryError::NotFound`] when the record does not
    /// exist and [`ContainerRegistryError::VersionConflict`] when the stored
    /// version differs from `record.version()`.
    async fn update(&self, record: &ContainerRecord) -> ContainerRegistryResult<ContainerRecord>;

    /// Deletes a record.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerRegistryError::NotFound`] when the record does not
    /// exist.
    async fn delete(&self, container_id: ContainerId) -> ContainerRegistryResult<()>;

    /// Finds a record by identifier.
    async fn find_by_id(
        &self,
        container_id: ContainerId,
    ) -> ContainerRegistryResult<Option<ContainerRecord>>;

    /// Finds a record by unique container name.
    async fn find_by_name(
        &self,
        container_name: &ContainerName,
    ) -> ContainerRegistryResult<Option<ContainerRecord>>;
}

/// Errors returned by container registry implementations.
#[derive(Debug, Clone, Error)]
pub enum ContainerRegistryError {
    /// A container with the same identifier already exists.
    #[error("duplicate container identifier: {0}")]
    DuplicateContainer(ContainerId),

    /// A container with the same name already exists.
    #[error("duplicate container name: {0}")]
    DuplicateContainerName(ContainerName),

    /// The container was not found.
    #[error("container not found: {0}")]
    NotFound(ContainerId),

    /// The stored record changed since it was read.
    #[error("container {container} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        /// Container name.
        container: ContainerName,
        /// Version the caller read.
        expected: u64,
        /// Version currently stored.
        actual: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ContainerRegistryError {
    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
