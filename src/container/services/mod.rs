//! Application services for container lifecycle orchestration.

mod deployment;
mod error;
mod lifecycle;
mod poller;
mod resources;

pub use error::{ContainerManagerError, ContainerManagerResult};
pub use lifecycle::{ContainerLifecycleService, CreateContainerRequest, LifecycleCollaborators};
pub use poller::{TaskPollError, TaskPoller};
pub use resources::DatasourceRequest;
