//! `reqwest` client for the agent REST API.
//!
//! Structured payloads travel as `application/json`; artifact uploads as
//! `application/octet-stream`. Only 200, 202, and 204 are accepted. A
//! submission yields a task only when the body decodes as one; any other
//! accepted answer is an immediate result.

use crate::config::AgentSettings;
use crate::container::{
    domain::{
        AgentRecord, ApplicationResource, ContainerName, RemoteTask, ServerResource, TaskId,
    },
    ports::{AgentApi, AgentClientError, AgentClientResult, ServerAction},
};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

const STRUCTURED_TYPE: &str = "application/json";
const ARTIFACT_TYPE: &str = "application/octet-stream";

/// Agent API adapter over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAgentClient {
    client: Client,
    api_context: String,
}

impl HttpAgentClient {
    /// Creates a client using the request timeout and API path prefix from
    /// `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentClientError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(settings: &AgentSettings) -> AgentClientResult<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(AgentClientError::transport)?;
        Ok(Self {
            client,
            api_context: settings.api_context.clone(),
        })
    }

    fn url(&self, agent: &AgentRecord, path: &str) -> String {
        normalize_url(&format!(
            "{}/{}/{}",
            agent.api_url(),
            self.api_context,
            path
        ))
    }

    fn server_path(server: &ContainerName) -> String {
        format!("server/{server}")
    }

    fn artifact_path(server: &ContainerName, artifact: &str) -> String {
        format!("server/{server}/app/{artifact}")
    }

    /// Sends `request`, returning the response for accepted statuses other
    /// than 204.
    async fn accept(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> AgentClientResult<Option<Response>> {
        let response = request
            .header(ACCEPT, STRUCTURED_TYPE)
            .send()
            .await
            .map_err(AgentClientError::transport)?;
        let status = response.status();
        debug!(url, status = status.as_u16(), "agent responded");

        if !matches!(
            status,
            StatusCode::OK | StatusCode::ACCEPTED | StatusCode::NO_CONTENT
        ) {
            return Err(AgentClientError::Request {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(response))
    }

    /// Submits mutating work. The agent answers either with a task handle or
    /// with an immediate result; only the former yields a task.
    async fn submit(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> AgentClientResult<Option<RemoteTask>> {
        let Some(response) = self.accept(request, url).await? else {
            return Ok(None);
        };
        let structured = is_structured(&content_type_of(&response));
        let body = response
            .bytes()
            .await
            .map_err(AgentClientError::transport)?;
        if !structured || body.is_empty() {
            debug!(url, "submission completed without a task handle");
            return Ok(None);
        }
        Ok(serde_json::from_slice::<RemoteTask>(&body).map_or_else(
            |err| {
                debug!(url, reason = %err, "submission answered with an immediate result");
                None
            },
            Some,
        ))
    }

    async fn read<T>(&self, agent: &AgentRecord, path: &str) -> AgentClientResult<T>
    where
        T: DeserializeOwned,
    {
        let url = self.url(agent, path);
        let response = self
            .accept(self.client.get(&url), &url)
            .await?
            .ok_or_else(|| AgentClientError::Decode {
                url: url.clone(),
                reason: "response has no body".to_owned(),
            })?;

        let content_type = content_type_of(&response);
        if !is_structured(&content_type) {
            return Err(AgentClientError::Response { url, content_type });
        }
        let body = response
            .bytes()
            .await
            .map_err(AgentClientError::transport)?;
        serde_json::from_slice(&body).map_err(|err| AgentClientError::Decode {
            url,
            reason: err.to_string(),
        })
    }
}

fn content_type_of(response: &Response) -> String {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned()
}

fn is_structured(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media_type| media_type.trim().eq_ignore_ascii_case(STRUCTURED_TYPE))
}

/// Collapses repeated `/` in a URL while keeping the `scheme://` separator.
fn normalize_url(raw: &str) -> String {
    let (mut normalized, rest) = raw.split_once("://").map_or_else(
        || (String::with_capacity(raw.len()), raw),
        |(scheme, rest)| (format!("{scheme}://"), rest),
    );

    let mut previous_slash = false;
    for character in rest.chars() {
        let is_slash = character == '/';
        if !(is_slash && previous_slash) {
            normalized.push(character);
        }
        previous_slash = is_slash;
    }
    normalized
}

#[async_trait]
impl AgentApi for HttpAgentClient {
    async fn create_server(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        topology: &str,
    ) -> AgentClientResult<Option<RemoteTask>> {
        let url = self.url(agent, &Self::server_path(server));
        let request = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, STRUCTURED_TYPE)
            .body(topology.to_owned());
        self.submit(request, &url).await
    }

    async fn delete_server(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
    ) -> AgentClientResult<Option<RemoteTask>> {
        let url = self.url(agent, &Self::server_path(server));
        self.submit(self.client.delete(&url), &url).await
    }

    async fn server_action(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        action: ServerAction,
    ) -> AgentClientResult<Option<RemoteTask>> {
        let url = self.url(agent, &format!("server/{server}/action/{action}"));
        self.submit(self.client.post(&url), &url).await
    }

    async fn server_status(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
    ) -> AgentClientResult<ServerResource> {
        self.read(agent, &Self::server_path(server)).await
    }

    async fn task_status(
        &self,
        agent: &AgentRecord,
        task_id: TaskId,
    ) -> AgentClientResult<RemoteTask> {
        self.read(agent, &format!("task/{task_id}")).await
    }

    async fn deploy_artifact(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        artifact: &str,
        content: Vec<u8>,
    ) -> AgentClientResult<Option<RemoteTask>> {
        let url = self.url(
            agent,
            &format!("{}/action/deploy", Self::artifact_path(server, artifact)),
        );
        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, ARTIFACT_TYPE)
            .body(content);
        self.submit(request, &url).await
    }

    async fn undeploy_artifact(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        artifact: &str,
    ) -> AgentClientResult<Option<RemoteTask>> {
        let url = self.url(
            agent,
            &format!("{}/action/undeploy", Self::artifact_path(server, artifact)),
        );
        self.submit(self.client.post(&url), &url).await
    }

    async fn artifact_status(
        &self,
        agent: &AgentRecord,
        server: &ContainerName,
        artifact: &str,
    ) -> AgentClientResult<ApplicationResource> {
        self.read(agent, &Self::artifact_path(server, artifact))
            .await
    }
}
