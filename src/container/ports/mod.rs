//! Port contracts for container lifecycle orchestration.

mod agent;
mod agent_links;
mod catalog;
mod container_registry;

pub use agent::{AgentApi, AgentClientError, AgentClientResult, ServerAction};
pub use agent_links::{AgentLinkRegistry, AgentLinkRegistryError, AgentLinkRegistryResult};
pub use catalog::{CatalogError, ConfigurationCatalog, TemplateSource, TemplateSourceError};
pub use container_registry::{
    ContainerRegistry, ContainerRegistryError, ContainerRegistryResult,
};
