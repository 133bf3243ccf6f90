//! Payload rendering for topologies and deployable descriptors.
//!
//! Descriptors are small XML documents uploaded to the agent as artifacts.
//! All payloads are rendered with `minijinja`; placeholders use the
//! `{{ name }}` form.

use super::{
    ConnectorDescriptor, ConnectorName, ContainerDomainError, ContainerName,
    DatasourceDescriptor, DatasourceName, Deployable, RepositoryRef,
};
use minijinja::{Environment, context};
use serde::Serialize;

const REPOSITORY_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<deployment-plan xmlns="urn:container-manager:deployment-plan:1.0">
  <repository>
    <id>{{ repository_id }}</id>
    <type>url</type>
    <url>{{ base_url }}</url>
  </repository>
</deployment-plan>
"#;

const DEPLOYMENT_PLAN_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<deployment-plan xmlns="urn:container-manager:deployment-plan:1.0">
  <deployment>
    <id>{{ plan_id }}</id>
    <repository-ref>{{ repository_id }}</repository-ref>
    <artifact>{{ artifact }}</artifact>
  </deployment>
</deployment-plan>
"#;

const CONNECTOR_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<connector xmlns="urn:container-manager:connector:1.0">
  <name>{{ name }}</name>
  <port>{{ port }}</port>
</connector>
"#;

const DATASOURCE_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<datasource xmlns="urn:container-manager:datasource:1.0">
  <name>{{ name }}</name>
  <url>{{ url }}</url>
  <driver-class>{{ driver_class }}</driver-class>
  <user>{{ username }}</user>
</datasource>
"#;

/// Rendered descriptor ready to upload as an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    artifact_name: String,
    content: String,
}

impl Descriptor {
    /// Renders the repository descriptor for a deployable's repository.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerDomainError::TemplateRender`] when rendering fails.
    pub fn repository(repository: &RepositoryRef) -> Result<Self, ContainerDomainError> {
        let artifact_name = repository.descriptor_artifact();
        let content = render_payload(
            &artifact_name,
            REPOSITORY_TEMPLATE,
            context! {
                repository_id => repository.id(),
                base_url => repository.base_url(),
            },
        )?;
        Ok(Self {
            artifact_name,
            content,
        })
    }

    /// Renders the deployment plan referencing `repository`.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerDomainError::TemplateRender`] when rendering fails.
    pub fn deployment_plan(
        deployable: &Deployable,
        repository: &RepositoryRef,
    ) -> Result<Self, ContainerDomainError> {
        let artifact_name = deployable.plan_artifact();
        let plan_id = artifact_name.trim_end_matches(".xml").to_owned();
        let content = render_payload(
            &artifact_name,
            DEPLOYMENT_PLAN_TEMPLATE,
            context! {
                plan_id => plan_id,
                repository_id => repository.id(),
                artifact => deployable.artifact_name(),
            },
        )?;
        Ok(Self {
            artifact_name,
            content,
        })
    }

    /// Renders a connector descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerDomainError::TemplateRender`] when rendering fails.
    pub fn connector(connector: &ConnectorDescriptor) -> Result<Self, ContainerDomainError> {
        let artifact_name = Self::connector_artifact(connector.name());
        let content = render_payload(
            &artifact_name,
            CONNECTOR_TEMPLATE,
            context! {
                name => connector.name().as_str(),
                port => connector.port(),
            },
        )?;
        Ok(Self {
            artifact_name,
            content,
        })
    }

    /// Renders a datasource descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerDomainError::TemplateRender`] when rendering fails.
    pub fn datasource(datasource: &DatasourceDescriptor) -> Result<Self, ContainerDomainError> {
        let artifact_name = Self::datasource_artifact(datasource.name());
        let content = render_payload(
            &artifact_name,
            DATASOURCE_TEMPLATE,
            context! {
                name => datasource.name().as_str(),
                url => datasource.url(),
                driver_class => datasource.driver_class(),
                username => datasource.username(),
            },
        )?;
        Ok(Self {
            artifact_name,
            content,
        })
    }

    /// Returns the artifact name under which a connector is deployed.
    #[must_use]
    pub fn connector_artifact(name: &ConnectorName) -> String {
        format!("connector-{name}.xml")
    }

    /// Returns the artifact name under which a datasource is deployed.
    #[must_use]
    pub fn datasource_artifact(name: &DatasourceName) -> String {
        format!("datasource-{name}.xml")
    }

    /// Returns the artifact name.
    #[must_use]
    pub fn artifact_name(&self) -> &str {
        &self.artifact_name
    }

    /// Returns the rendered descriptor.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consumes the descriptor, returning the upload body.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.content.into_bytes()
    }
}

/// Substitutes the container name (and optional port range) into a
/// topology template.
///
/// # Errors
///
/// Returns [`ContainerDomainError::TemplateRender`] when the template is
/// malformed.
pub fn render_topology(
    template_name: &str,
    template: &str,
    container_name: &ContainerName,
    port_range: Option<u16>,
) -> Result<String, ContainerDomainError> {
    render_payload(
        template_name,
        template,
        context! {
            container_name => container_name.as_str(),
            port_range => port_range,
        },
    )
}

fn render_payload(
    template_name: &str,
    template: &str,
    context: impl Serialize,
) -> Result<String, ContainerDomainError> {
    let environment = Environment::new();
    environment
        .render_str(template, context)
        .map_err(|error| ContainerDomainError::TemplateRender {
            template: template_name.to_owned(),
            reason: error.to_string(),
        })
}
