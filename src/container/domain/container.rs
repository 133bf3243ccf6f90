//! Container record aggregate root.

use super::{
    ConnectorName, ContainerDomainError, ContainerId, ContainerName, ContainerState,
    DatasourceName,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Connector attached to a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorDescriptor {
    name: ConnectorName,
    port: u16,
}

impl ConnectorDescriptor {
    /// Creates a connector descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerDomainError::InvalidPort`] when `port` is zero.
    pub fn new(name: ConnectorName, port: u16) -> Result<Self, ContainerDomainError> {
        if port == 0 {
            return Err(ContainerDomainError::InvalidPort);
        }
        Ok(Self { name, port })
    }

    /// Returns the connector name.
    #[must_use]
    pub const fn name(&self) -> &ConnectorName {
        &self.name
    }

    /// Returns the listening port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

/// Datasource attached to a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceDescriptor {
    name: DatasourceName,
    url: String,
    driver_class: String,
    username: String,
}

impl DatasourceDescriptor {
    /// Creates a datasource descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerDomainError::EmptyDatasourceField`] when the JDBC
    /// URL or driver class is empty after trimming.
    pub fn new(
        name: DatasourceName,
        url: impl Into<String>,
        driver_class: impl Into<String>,
        username: impl Into<String>,
    ) -> Result<Self, ContainerDomainError> {
        let normalized_url = url.into().trim().to_owned();
        if normalized_url.is_empty() {
            return Err(ContainerDomainError::EmptyDatasourceField("url"));
        }
        let normalized_driver = driver_class.into().trim().to_owned();
        if normalized_driver.is_empty() {
            return Err(ContainerDomainError::EmptyDatasourceField("driver class"));
        }

        Ok(Self {
            name,
            url: normalized_url,
            driver_class: normalized_driver,
            username: username.into().trim().to_owned(),
        })
    }

    /// Returns the datasource name.
    #[must_use]
    pub const fn name(&self) -> &DatasourceName {
        &self.name
    }

    /// Returns the JDBC URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the JDBC driver class.
    #[must_use]
    pub fn driver_class(&self) -> &str {
        &self.driver_class
    }

    /// Returns the connection user name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Container record aggregate root.
///
/// The record caches the agent's view of the container. `version` is the
/// optimistic-concurrency stamp checked by registry updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    id: ContainerId,
    name: ContainerName,
    state: ContainerState,
    profile: String,
    connectors: Vec<ConnectorDescriptor>,
    datasources: Vec<DatasourceDescriptor>,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContainerRecord {
    /// Creates a new record in the [`ContainerState::INIT`] state.
    #[must_use]
    pub fn new(name: ContainerName, profile: impl Into<String>, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ContainerId::new(),
            name,
            state: ContainerState::init(),
            profile: profile.into(),
            connectors: Vec::new(),
            datasources: Vec::new(),
            version: 0,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Returns the container identifier.
    #[must_use]
    pub const fn id(&self) -> ContainerId {
        self.id
    }

    /// Returns the container name.
    #[must_use]
    pub const fn name(&self) -> &ContainerName {
        &self.name
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> &ContainerState {
        &self.state
    }

    /// Returns the catalog profile the container was created from.
    #[must_use]
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Returns the attached connectors in attachment order.
    #[must_use]
    pub fn connectors(&self) -> &[ConnectorDescriptor] {
        &self.connectors
    }

    /// Returns the attached datasources in attachment order.
    #[must_use]
    pub fn datasources(&self) -> &[DatasourceDescriptor] {
        &self.datasources
    }

    /// Returns the optimistic-concurrency stamp.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Looks up a connector by name.
    #[must_use]
    pub fn connector(&self, name: &ConnectorName) -> Option<&ConnectorDescriptor> {
        self.connectors
            .iter()
            .find(|connector| connector.name() == name)
    }

    /// Looks up a datasource by name.
    #[must_use]
    pub fn datasource(&self, name: &DatasourceName) -> Option<&DatasourceDescriptor> {
        self.datasources
            .iter()
            .find(|datasource| datasource.name() == name)
    }

    /// Records a new lifecycle state.
    pub fn set_state(&mut self, state: ContainerState, clock: &impl Clock) {
        self.state = state;
        self.touch(clock);
    }

    /// Attaches a connector. Returns `false` when the name is already
    /// attached, leaving the record unchanged.
    pub fn attach_connector(&mut self, connector: ConnectorDescriptor, clock: &impl Clock) -> bool {
        if self.connector(connector.name()).is_some() {
            return false;
        }
        self.connectors.push(connector);
        self.touch(clock);
        true
    }

    /// Detaches a connector. Returns `false` when no connector has the name.
    pub fn detach_connector(&mut self, name: &ConnectorName, clock: &impl Clock) -> bool {
        let before = self.connectors.len();
        self.connectors.retain(|connector| connector.name() != name);
        let removed = self.connectors.len() != before;
        if removed {
            self.touch(clock);
        }
        removed
    }

    /// Attaches a datasource. Returns `false` when the name is already
    /// attached, leaving the record unchanged.
    pub fn attach_datasource(
        &mut self,
        datasource: DatasourceDescriptor,
        clock: &impl Clock,
    ) -> bool {
        if self.datasource(datasource.name()).is_some() {
            return false;
        }
        self.datasources.push(datasource);
        self.touch(clock);
        true
    }

    /// Detaches a datasource. Returns `false` when no datasource has the name.
    pub fn detach_datasource(&mut self, name: &DatasourceName, clock: &impl Clock) -> bool {
        let before = self.datasources.len();
        self.datasources.retain(|datasource| datasource.name() != name);
        let removed = self.datasources.len() != before;
        if removed {
            self.touch(clock);
        }
        removed
    }

    /// Advances the concurrency stamp.
    ///
    /// Registry adapters call this once a compare-and-swap update succeeds.
    pub fn advance_version(&mut self) {
        self.version += 1;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
