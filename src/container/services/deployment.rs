//! Artifact deployment onto containers.
//!
//! Every agent submission here is a full submit, wait, confirm cycle: the
//! artifact status is read back and must match the intended outcome.

use super::error::{ContainerManagerError, ContainerManagerResult};
use super::lifecycle::ContainerLifecycleService;
use crate::container::{
    domain::{
        AgentRecord, ArtifactStatus, ContainerName, ContainerRecord, Deployable,
        DeployableSource, Descriptor, RepositoryRef,
    },
    ports::{
        AgentApi, AgentLinkRegistry, ConfigurationCatalog, ContainerRegistry, TemplateSource,
    },
};
use mockable::Clock;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

impl<R, L, A, G, T, C> ContainerLifecycleService<R, L, A, G, T, C>
where
    R: ContainerRegistry,
    L: AgentLinkRegistry,
    A: AgentApi,
    G: ConfigurationCatalog,
    T: TemplateSource,
    C: Clock + Send + Sync,
{
    /// Deploys the artifact at `deployable_url` onto a container.
    ///
    /// `file` URLs are uploaded directly. `http(s)` URLs first ensure the
    /// repository descriptor for the host is deployed, then deploy a
    /// deployment plan referencing it. A repository descriptor that was
    /// deployed before a failing plan stays deployed.
    ///
    /// # Errors
    ///
    /// Returns domain errors for malformed URLs,
    /// [`ContainerManagerError::NotFound`] or
    /// [`ContainerManagerError::NoAgent`] when the container cannot be
    /// addressed, [`ContainerManagerError::ArtifactRead`] when a local file
    /// cannot be read, [`ContainerManagerError::UnexpectedArtifactStatus`]
    /// when the agent does not confirm the deployment, and task, agent, or
    /// registry errors.
    pub async fn deploy(
        &self,
        name: &str,
        deployable_url: &str,
    ) -> ContainerManagerResult<ContainerRecord> {
        let container_name = ContainerName::new(name)?;
        let deployable = Deployable::parse(deployable_url)?;
        info!(container = %container_name, deployable = %deployable.url(), "deploying artifact");

        let record = self.find_container_or_error(&container_name).await?;
        let agent = self.owning_agent(&record).await?;

        match deployable.source() {
            DeployableSource::LocalFile(path) => {
                let content = read_local_artifact(path).await?;
                self.deploy_and_confirm(&agent, record.name(), deployable.artifact_name(), content)
                    .await?;
            }
            DeployableSource::Repository(repository) => {
                self.ensure_repository(&agent, record.name(), repository)
                    .await?;
                let plan = Descriptor::deployment_plan(&deployable, repository)?;
                self.deploy_descriptor(&agent, record.name(), plan).await?;
            }
        }

        let settled = self.resync_state(&agent, record).await?;
        info!(
            container = %container_name,
            artifact = deployable.artifact_name(),
            "artifact deployed"
        );
        Ok(settled)
    }

    /// Undeploys the artifact at `deployable_url` from a container.
    ///
    /// For `http(s)` URLs only the deployment plan is undeployed; the
    /// repository descriptor is shared by every artifact from the host.
    ///
    /// # Errors
    ///
    /// Returns domain errors for malformed URLs,
    /// [`ContainerManagerError::NotFound`] or
    /// [`ContainerManagerError::NoAgent`] when the container cannot be
    /// addressed, [`ContainerManagerError::UnexpectedArtifactStatus`] when
    /// the agent does not confirm the undeployment, and task, agent, or
    /// registry errors.
    pub async fn undeploy(
        &self,
        name: &str,
        deployable_url: &str,
    ) -> ContainerManagerResult<ContainerRecord> {
        let container_name = ContainerName::new(name)?;
        let deployable = Deployable::parse(deployable_url)?;
        info!(container = %container_name, deployable = %deployable.url(), "undeploying artifact");

        let record = self.find_container_or_error(&container_name).await?;
        let agent = self.owning_agent(&record).await?;

        let artifact = match deployable.source() {
            DeployableSource::LocalFile(_) => deployable.artifact_name().to_owned(),
            DeployableSource::Repository(_) => deployable.plan_artifact(),
        };
        self.undeploy_and_confirm(&agent, record.name(), &artifact)
            .await?;

        let settled = self.resync_state(&agent, record).await?;
        info!(container = %container_name, artifact = %artifact, "artifact undeployed");
        Ok(settled)
    }

    async fn ensure_repository(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        repository: &RepositoryRef,
    ) -> ContainerManagerResult<()> {
        let artifact = repository.descriptor_artifact();
        if self.artifact_state(agent, server, &artifact).await? == ArtifactStatus::Deployed {
            debug!(server = %server, artifact = %artifact, "repository descriptor already deployed");
            return Ok(());
        }
        let descriptor = Descriptor::repository(repository)?;
        self.deploy_descriptor(agent, server, descriptor).await
    }

    pub(super) async fn deploy_descriptor(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        descriptor: Descriptor,
    ) -> ContainerManagerResult<()> {
        let artifact = descriptor.artifact_name().to_owned();
        self.deploy_and_confirm(agent, server, &artifact, descriptor.into_bytes())
            .await
    }

    async fn deploy_and_confirm(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        artifact: &str,
        content: Vec<u8>,
    ) -> ContainerManagerResult<()> {
        let submitted = self
            .agent
            .deploy_artifact(agent, server, artifact, content)
            .await?;
        self.await_submission(agent, submitted).await?;
        self.confirm_artifact(agent, server, artifact, ArtifactStatus::Deployed)
            .await
    }

    pub(super) async fn undeploy_and_confirm(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        artifact: &str,
    ) -> ContainerManagerResult<()> {
        let submitted = self
            .agent
            .undeploy_artifact(agent, server, artifact)
            .await?;
        self.await_submission(agent, submitted).await?;
        self.confirm_artifact(agent, server, artifact, ArtifactStatus::NotDeployed)
            .await
    }

    async fn confirm_artifact(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        artifact: &str,
        expected: ArtifactStatus,
    ) -> ContainerManagerResult<()> {
        let actual = self.artifact_state(agent, server, artifact).await?;
        if actual != expected {
            return Err(ContainerManagerError::UnexpectedArtifactStatus {
                artifact: artifact.to_owned(),
                expected,
                actual,
            });
        }
        debug!(server = %server, artifact, status = %actual, "artifact status confirmed");
        Ok(())
    }

    /// Reads an artifact's status; an artifact unknown to the agent is not
    /// deployed.
    async fn artifact_state(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        artifact: &str,
    ) -> ContainerManagerResult<ArtifactStatus> {
        match self.agent.artifact_status(agent, server, artifact).await {
            Ok(resource) => Ok(resource.status()),
            Err(err) if err.is_not_found() => Ok(ArtifactStatus::NotDeployed),
            Err(err) => Err(err.into()),
        }
    }
}

async fn read_local_artifact(path: &Path) -> ContainerManagerResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|err| ContainerManagerError::ArtifactRead {
            path: path.display().to_string(),
            source: Arc::new(err),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContainerManagerSettings, PollingSettings};
    use crate::container::{
        adapters::memory::{
            InMemoryAgentLinkRegistry, InMemoryCatalog, InMemoryContainerRegistry,
            InMemoryTemplateSource,
        },
        domain::{AgentName, ApplicationResource, RemoteTask, ResourceLink, ServerResource, TaskId},
        ports::AgentClientError,
        services::LifecycleCollaborators,
        test_support::MockAgent,
    };
    use mockable::DefaultClock;
    use std::io::Write;
    use std::time::Duration;

    type TestService = ContainerLifecycleService<
        InMemoryContainerRegistry,
        InMemoryAgentLinkRegistry,
        MockAgent,
        InMemoryCatalog,
        InMemoryTemplateSource,
        DefaultClock,
    >;

    async fn service_with(mock: MockAgent) -> TestService {
        let containers = Arc::new(InMemoryContainerRegistry::new());
        let links = Arc::new(InMemoryAgentLinkRegistry::new());
        let agent = AgentRecord::new(
            AgentName::new("A1").expect("valid agent name"),
            "http://agent.local:9000",
        )
        .expect("valid agent");
        let record = ContainerRecord::new(
            ContainerName::new("app1").expect("valid container name"),
            "cfg-container",
            &DefaultClock,
        );
        links.register_agent(&agent).await.expect("agent should register");
        containers.create(&record).await.expect("record should be created");
        links
            .create_link(&ResourceLink::container(agent.id(), record.id()))
            .await
            .expect("link should be created");

        let settings = ContainerManagerSettings {
            polling: PollingSettings::new(Duration::from_secs(1), None),
            ..ContainerManagerSettings::default()
        };
        ContainerLifecycleService::new(
            LifecycleCollaborators {
                containers,
                links,
                agent: Arc::new(mock),
                catalog: Arc::new(InMemoryCatalog::new()),
                templates: Arc::new(InMemoryTemplateSource::new()),
                clock: Arc::new(DefaultClock),
            },
            &settings,
        )
    }

    fn expect_started_server(mock: &mut MockAgent) {
        mock.expect_server_status()
            .times(1)
            .returning(|_, server| Ok(ServerResource::new(server.as_str(), "Started")));
    }

    fn succeeded(id: u64) -> Option<RemoteTask> {
        Some(RemoteTask::new(TaskId::new(id), "SUCCESS"))
    }

    #[tokio::test(start_paused = true)]
    async fn deployed_repository_descriptor_is_not_redeployed() {
        let mut mock = MockAgent::new();
        mock.expect_artifact_status()
            .withf(|_, _, artifact| artifact == "repo-host.xml")
            .times(1)
            .returning(|_, _, artifact| Ok(ApplicationResource::new(artifact, "DEPLOYED")));
        mock.expect_deploy_artifact()
            .withf(|_, _, artifact, content| {
                artifact == "app-plan.xml"
                    && String::from_utf8_lossy(content).contains("<repository-ref>repo-host</repository-ref>")
            })
            .times(1)
            .returning(|_, _, _, _| Ok(succeeded(1)));
        mock.expect_artifact_status()
            .withf(|_, _, artifact| artifact == "app-plan.xml")
            .times(1)
            .returning(|_, _, artifact| Ok(ApplicationResource::new(artifact, "DEPLOYED")));
        expect_started_server(&mut mock);
        let service = service_with(mock).await;

        let record = service
            .deploy("app1", "http://host/repo/app.war")
            .await
            .expect("deploy should succeed");

        assert_eq!(record.state().as_str(), "Started");
    }

    #[tokio::test(start_paused = true)]
    async fn local_file_bytes_are_uploaded() {
        let mut file = tempfile::Builder::new()
            .suffix(".war")
            .tempfile()
            .expect("temp file should be created");
        file.write_all(b"war-bytes").expect("artifact should be written");
        let url = url::Url::from_file_path(file.path())
            .expect("temp path should be absolute")
            .to_string();
        let artifact_name = file
            .path()
            .file_name()
            .and_then(|name| name.to_str())
            .expect("temp file name should be UTF-8")
            .to_owned();

        let mut mock = MockAgent::new();
        let expected_artifact = artifact_name.clone();
        mock.expect_deploy_artifact()
            .withf(move |_, _, artifact, content| {
                artifact == expected_artifact && content.as_slice() == b"war-bytes"
            })
            .times(1)
            .returning(|_, _, _, _| Ok(None));
        mock.expect_artifact_status()
            .times(1)
            .returning(|_, _, artifact| Ok(ApplicationResource::new(artifact, "DEPLOYED")));
        expect_started_server(&mut mock);
        let service = service_with(mock).await;

        service
            .deploy("app1", &url)
            .await
            .expect("deploy should succeed");
    }

    #[tokio::test(start_paused = true)]
    async fn missing_local_file_fails_before_agent_call() {
        let mut mock = MockAgent::new();
        mock.expect_deploy_artifact().times(0);
        let service = service_with(mock).await;

        let result = service
            .deploy("app1", "file:///nonexistent/dir/app.war")
            .await;

        assert!(matches!(
            result,
            Err(ContainerManagerError::ArtifactRead { path, .. }) if path == "/nonexistent/dir/app.war"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn unconfirmed_deployment_is_reported() {
        let mut mock = MockAgent::new();
        mock.expect_artifact_status()
            .withf(|_, _, artifact| artifact == "repo-host.xml")
            .times(1)
            .returning(|_, _, _| {
                Err(AgentClientError::Request {
                    url: "http://agent.local:9000/jonas-api/server/app1/app/repo-host.xml"
                        .to_owned(),
                    status: 404,
                })
            });
        mock.expect_deploy_artifact()
            .withf(|_, _, artifact, _| artifact == "repo-host.xml")
            .times(1)
            .returning(|_, _, _, _| Ok(succeeded(1)));
        mock.expect_artifact_status()
            .withf(|_, _, artifact| artifact == "repo-host.xml")
            .times(1)
            .returning(|_, _, artifact| Ok(ApplicationResource::new(artifact, "FAILED")));
        mock.expect_server_status().times(0);
        let service = service_with(mock).await;

        let result = service.deploy("app1", "http://host/repo/app.war").await;

        assert!(matches!(
            result,
            Err(ContainerManagerError::UnexpectedArtifactStatus {
                expected: ArtifactStatus::Deployed,
                actual: ArtifactStatus::Other(ref status),
                ..
            }) if status == "FAILED"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn repository_undeploy_targets_plan_only() {
        let mut mock = MockAgent::new();
        mock.expect_undeploy_artifact()
            .withf(|_, _, artifact| artifact == "app-plan.xml")
            .times(1)
            .returning(|_, _, _| Ok(succeeded(2)));
        mock.expect_artifact_status()
            .withf(|_, _, artifact| artifact == "app-plan.xml")
            .times(1)
            .returning(|_, _, artifact| Ok(ApplicationResource::new(artifact, "NOT_DEPLOYED")));
        expect_started_server(&mut mock);
        let service = service_with(mock).await;

        service
            .undeploy("app1", "http://host/repo/app.war")
            .await
            .expect("undeploy should succeed");
    }

    #[tokio::test(start_paused = true)]
    async fn unsupported_scheme_is_rejected() {
        let service = service_with(MockAgent::new()).await;

        let result = service.deploy("app1", "ftp://host/app.war").await;

        assert!(matches!(result, Err(ContainerManagerError::Domain(_))));
    }
}
