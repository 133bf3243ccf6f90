//! Shared fixtures for in-memory container lifecycle tests.

use std::sync::Arc;
use std::time::Duration;

use container_manager::{
    config::{ContainerManagerSettings, PollingSettings},
    container::{
        adapters::{
            InMemoryAgent,
            memory::{
                InMemoryAgentLinkRegistry, InMemoryCatalog, InMemoryContainerRegistry,
                InMemoryTemplateSource,
            },
        },
        domain::{AgentName, AgentRecord, CatalogConfiguration},
        ports::{AgentLinkRegistry, ContainerRegistry},
        services::{ContainerLifecycleService, CreateContainerRequest, LifecycleCollaborators},
    },
};
use mockable::DefaultClock;
use rstest::fixture;

/// Topology template registered for the `cfg-container` configuration.
pub const TOPOLOGY: &str = r#"<server name="{{ container_name }}"/>"#;

/// Service wired with the in-memory agent and the given registry.
pub type TestService<R> = ContainerLifecycleService<
    R,
    InMemoryAgentLinkRegistry,
    InMemoryAgent,
    InMemoryCatalog,
    InMemoryTemplateSource,
    DefaultClock,
>;

/// Service plus handles on its in-memory collaborators.
pub struct TestContext<R: ContainerRegistry = InMemoryContainerRegistry> {
    pub service: TestService<R>,
    pub containers: Arc<R>,
    pub links: Arc<InMemoryAgentLinkRegistry>,
    pub agent: Arc<InMemoryAgent>,
}

/// Settings polling every millisecond with a five second deadline.
pub fn fast_settings() -> ContainerManagerSettings {
    ContainerManagerSettings {
        polling: PollingSettings::new(Duration::from_millis(1), Some(Duration::from_secs(5))),
        ..ContainerManagerSettings::default()
    }
}

/// Builds a context around `containers` with agents `A1` and `A2` registered.
pub async fn context_with<R: ContainerRegistry>(containers: Arc<R>) -> TestContext<R> {
    let links = Arc::new(InMemoryAgentLinkRegistry::new());
    for (name, url) in [
        ("A1", "http://agent-1.local:9000"),
        ("A2", "http://agent-2.local:9000"),
    ] {
        let agent = AgentRecord::new(AgentName::new(name).expect("valid agent name"), url)
            .expect("valid agent");
        links
            .register_agent(&agent)
            .await
            .expect("agent should register");
    }

    let catalog = Arc::new(InMemoryCatalog::new());
    catalog
        .insert(CatalogConfiguration::new(
            "cfg-container",
            "container",
            "jonas",
            "topology.xml",
        ))
        .expect("catalog insert should succeed");
    let templates = Arc::new(InMemoryTemplateSource::new());
    templates
        .insert("topology.xml", TOPOLOGY)
        .expect("template insert should succeed");

    let agent = Arc::new(InMemoryAgent::new());
    let service = ContainerLifecycleService::new(
        LifecycleCollaborators {
            containers: Arc::clone(&containers),
            links: Arc::clone(&links),
            agent: Arc::clone(&agent),
            catalog,
            templates,
            clock: Arc::new(DefaultClock),
        },
        &fast_settings(),
    );

    TestContext {
        service,
        containers,
        links,
        agent,
    }
}

/// Provides a context backed by a fresh in-memory registry.
#[fixture]
pub async fn context() -> TestContext {
    context_with(Arc::new(InMemoryContainerRegistry::new())).await
}

/// Request creating `name` on agent `A1` from `cfg-container`.
pub fn create_request(name: &str) -> CreateContainerRequest {
    CreateContainerRequest::new(name, "A1", "cfg-container")
}
