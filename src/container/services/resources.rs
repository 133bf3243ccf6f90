//! Connector and datasource management.
//!
//! Adding a resource whose name is already recorded, or removing one that
//! is not, succeeds without contacting the agent.

use super::error::ContainerManagerResult;
use super::lifecycle::ContainerLifecycleService;
use crate::container::{
    domain::{
        ConnectorDescriptor, ConnectorName, ContainerName, ContainerRecord, DatasourceDescriptor,
        DatasourceName, Descriptor,
    },
    ports::{
        AgentApi, AgentLinkRegistry, ConfigurationCatalog, ContainerRegistry, TemplateSource,
    },
};
use mockable::Clock;
use tracing::{info, warn};

/// Request payload for attaching a datasource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasourceRequest {
    /// Datasource name, unique per container.
    pub name: String,
    /// JDBC URL.
    pub url: String,
    /// JDBC driver class.
    pub driver_class: String,
    /// Connection user name.
    pub username: String,
}

impl DatasourceRequest {
    /// Creates a datasource request.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        driver_class: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            driver_class: driver_class.into(),
            username: username.into(),
        }
    }
}

impl<R, L, A, G, T, C> ContainerLifecycleService<R, L, A, G, T, C>
where
    R: ContainerRegistry,
    L: AgentLinkRegistry,
    A: AgentApi,
    G: ConfigurationCatalog,
    T: TemplateSource,
    C: Clock + Send + Sync,
{
    /// Attaches a connector listening on `port` to a container.
    ///
    /// # Errors
    ///
    /// Returns domain errors for invalid names or a zero port,
    /// [`super::ContainerManagerError::NotFound`] or
    /// [`super::ContainerManagerError::NoAgent`] when the container cannot be
    /// addressed, and deployment, task, agent, or registry errors. The
    /// connector is only recorded once the agent confirms the deployment.
    pub async fn add_connector(
        &self,
        name: &str,
        connector_name: &str,
        port: u16,
    ) -> ContainerManagerResult<ContainerRecord> {
        let container_name = ContainerName::new(name)?;
        let connector = ConnectorDescriptor::new(ConnectorName::new(connector_name)?, port)?;

        let record = self.find_container_or_error(&container_name).await?;
        if record.connector(connector.name()).is_some() {
            warn!(container = %container_name, connector = %connector.name(), "connector already attached");
            return Ok(record);
        }
        info!(container = %container_name, connector = %connector.name(), port, "adding connector");

        let agent = self.owning_agent(&record).await?;
        let descriptor = Descriptor::connector(&connector)?;
        self.deploy_descriptor(&agent, record.name(), descriptor)
            .await?;

        let mut updated = record;
        updated.attach_connector(connector, &*self.clock);
        self.resync_state(&agent, updated).await
    }

    /// Detaches a connector from a container.
    ///
    /// # Errors
    ///
    /// Returns domain errors for invalid names,
    /// [`super::ContainerManagerError::NotFound`] or
    /// [`super::ContainerManagerError::NoAgent`] when the container cannot be
    /// addressed, and deployment, task, agent, or registry errors.
    pub async fn remove_connector(
        &self,
        name: &str,
        connector_name: &str,
    ) -> ContainerManagerResult<ContainerRecord> {
        let container_name = ContainerName::new(name)?;
        let connector = ConnectorName::new(connector_name)?;

        let record = self.find_container_or_error(&container_name).await?;
        if record.connector(&connector).is_none() {
            warn!(container = %container_name, connector = %connector, "connector not attached");
            return Ok(record);
        }
        info!(container = %container_name, connector = %connector, "removing connector");

        let agent = self.owning_agent(&record).await?;
        self.undeploy_and_confirm(
            &agent,
            record.name(),
            &Descriptor::connector_artifact(&connector),
        )
        .await?;

        let mut updated = record;
        updated.detach_connector(&connector, &*self.clock);
        self.resync_state(&agent, updated).await
    }

    /// Attaches a datasource to a container.
    ///
    /// # Errors
    ///
    /// Returns domain errors for invalid names or empty connection fields,
    /// [`super::ContainerManagerError::NotFound`] or
    /// [`super::ContainerManagerError::NoAgent`] when the container cannot be
    /// addressed, and deployment, task, agent, or registry errors.
    pub async fn add_datasource(
        &self,
        name: &str,
        request: DatasourceRequest,
    ) -> ContainerManagerResult<ContainerRecord> {
        let container_name = ContainerName::new(name)?;
        let datasource = DatasourceDescriptor::new(
            DatasourceName::new(request.name)?,
            request.url,
            request.driver_class,
            request.username,
        )?;

        let record = self.find_container_or_error(&container_name).await?;
        if record.datasource(datasource.name()).is_some() {
            warn!(container = %container_name, datasource = %datasource.name(), "datasource already attached");
            return Ok(record);
        }
        info!(container = %container_name, datasource = %datasource.name(), "adding datasource");

        let agent = self.owning_agent(&record).await?;
        let descriptor = Descriptor::datasource(&datasource)?;
        self.deploy_descriptor(&agent, record.name(), descriptor)
            .await?;

        let mut updated = record;
        updated.attach_datasource(datasource, &*self.clock);
        self.resync_state(&agent, updated).await
    }

    /// Detaches a datasource from a container.
    ///
    /// # Errors
    ///
    /// Returns domain errors for invalid names,
    /// [`super::ContainerManagerError::NotFound`] or
    /// [`super::ContainerManagerError::NoAgent`] when the container cannot be
    /// addressed, and deployment, task, agent, or registry errors.
    pub async fn remove_datasource(
        &self,
        name: &str,
        datasource_name: &str,
    ) -> ContainerManagerResult<ContainerRecord> {
        let container_name = ContainerName::new(name)?;
        let datasource = DatasourceName::new(datasource_name)?;

        let record = self.find_container_or_error(&container_name).await?;
        if record.datasource(&datasource).is_none() {
            warn!(container = %container_name, datasource = %datasource, "datasource not attached");
            return Ok(record);
        }
        info!(container = %container_name, datasource = %datasource, "removing datasource");

        let agent = self.owning_agent(&record).await?;
        self.undeploy_and_confirm(
            &agent,
            record.name(),
            &Descriptor::datasource_artifact(&datasource),
        )
        .await?;

        let mut updated = record;
        updated.detach_datasource(&datasource, &*self.clock);
        self.resync_state(&agent, updated).await
    }
}
