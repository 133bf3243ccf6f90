//! Domain model for container lifecycle orchestration.
//!
//! The container domain models container records and their cached lifecycle
//! state, agent ownership links, catalog configurations, deployables, and the
//! resource representations read back from agents. Infrastructure concerns
//! remain outside this boundary.

mod agent;
mod catalog;
mod container;
mod deployable;
mod descriptors;
mod error;
mod ids;
mod remote;
mod state;

pub use agent::{AgentRecord, ResourceKind, ResourceLink};
pub use catalog::CatalogConfiguration;
pub use container::{ConnectorDescriptor, ContainerRecord, DatasourceDescriptor};
pub use deployable::{Deployable, DeployableSource, RepositoryRef};
pub use descriptors::{Descriptor, render_topology};
pub use error::ContainerDomainError;
pub use ids::{AgentId, AgentName, ConnectorName, ContainerId, ContainerName, DatasourceName};
pub use remote::{
    ApplicationResource, ArtifactStatus, RemoteTask, ServerResource, TaskId, TaskStatus,
};
pub use state::ContainerState;
