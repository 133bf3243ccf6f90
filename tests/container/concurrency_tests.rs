//! Optimistic concurrency on container record updates.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::helpers::{context_with, create_request};
use async_trait::async_trait;
use container_manager::container::{
    adapters::memory::InMemoryContainerRegistry,
    domain::{ContainerId, ContainerName, ContainerRecord, ContainerState},
    ports::{ContainerRegistry, ContainerRegistryResult},
    services::ContainerManagerError,
};
use mockable::DefaultClock;

/// Registry that lets a competing writer win the next update once armed.
#[derive(Default)]
struct RacingRegistry {
    inner: InMemoryContainerRegistry,
    armed: AtomicBool,
}

impl RacingRegistry {
    fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContainerRegistry for RacingRegistry {
    async fn create(&self, record: &ContainerRecord) -> ContainerRegistryResult<()> {
        self.inner.create(record).await
    }

    async fn update(&self, record: &ContainerRecord) -> ContainerRegistryResult<ContainerRecord> {
        if self.armed.swap(false, Ordering::SeqCst) {
            let mut competing = record.clone();
            competing.set_state(ContainerState::reported("Competing"), &DefaultClock);
            self.inner.update(&competing).await?;
        }
        self.inner.update(record).await
    }

    async fn delete(&self, container_id: ContainerId) -> ContainerRegistryResult<()> {
        self.inner.delete(container_id).await
    }

    async fn find_by_id(
        &self,
        container_id: ContainerId,
    ) -> ContainerRegistryResult<Option<ContainerRecord>> {
        self.inner.find_by_id(container_id).await
    }

    async fn find_by_name(
        &self,
        container_name: &ContainerName,
    ) -> ContainerRegistryResult<Option<ContainerRecord>> {
        self.inner.find_by_name(container_name).await
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_update_is_reported_and_competing_write_kept() {
    let ctx = context_with(Arc::new(RacingRegistry::default())).await;
    ctx.service
        .create_container(create_request("app1"))
        .await
        .expect("create should succeed");
    ctx.containers.arm();

    let result = ctx.service.refresh_state("app1").await;

    assert!(matches!(
        result,
        Err(ContainerManagerError::ConcurrentModification { .. })
    ));
    let stored = ctx
        .service
        .find_container("app1")
        .await
        .expect("lookup should succeed")
        .expect("record should exist");
    assert_eq!(stored.state().as_str(), "Competing");
}
