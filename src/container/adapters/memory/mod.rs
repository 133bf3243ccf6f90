//! In-memory adapters for container registries, catalogs, and templates.

mod agent_links;
mod catalog;
mod container_registry;

pub use agent_links::InMemoryAgentLinkRegistry;
pub use catalog::{InMemoryCatalog, InMemoryTemplateSource};
pub use container_registry::InMemoryContainerRegistry;
