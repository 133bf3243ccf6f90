//! Shared fixtures for container unit tests.

use crate::container::{
    domain::{
        AgentRecord, ApplicationResource, ContainerName, RemoteTask, ServerResource, TaskId,
    },
    ports::{AgentApi, AgentClientResult, ServerAction},
};
use async_trait::async_trait;
use mockall::mock;

mock! {
    pub Agent {}

    #[async_trait]
    impl AgentApi for Agent {
        async fn create_server(
            &self,
            agent: &AgentRecord,
            server: &ContainerName,
            topology: &str,
        ) -> AgentClientResult<Option<RemoteTask>>;

        async fn delete_server(
            &self,
            agent: &AgentRecord,
            server: &ContainerName,
        ) -> AgentClientResult<Option<RemoteTask>>;

        async fn server_action(
            &self,
            agent: &AgentRecord,
            server: &ContainerName,
            action: ServerAction,
        ) -> AgentClientResult<Option<RemoteTask>>;

        async fn server_status(
            &self,
            agent: &AgentRecord,
            server: &ContainerName,
        ) -> AgentClientResult<ServerResource>;

        async fn task_status(
            &self,
            agent: &AgentRecord,
            task_id: TaskId,
        ) -> AgentClientResult<RemoteTask>;

        async fn deploy_artifact(
            &self,
            agent: &AgentRecord,
            server: &ContainerName,
            artifact: &str,
            content: Vec<u8>,
        ) -> AgentClientResult<Option<RemoteTask>>;

        async fn undeploy_artifact(
            &self,
            agent: &AgentRecord,
            server: &ContainerName,
            artifact: &str,
        ) -> AgentClientResult<Option<RemoteTask>>;

        async fn artifact_status(
            &self,
            agent: &AgentRecord,
            server: &ContainerName,
            artifact: &str,
        ) -> AgentClientResult<ApplicationResource>;
    }
}
