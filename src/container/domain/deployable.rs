//! Deployable artifacts addressed by URL.

use super::ContainerDomainError;
use std::path::PathBuf;
use url::Url;

/// Remote repository that serves deployables to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    id: String,
    base_url: String,
}

impl RepositoryRef {
    /// Returns the repository identifier (`repo-<host>`).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the URL of the directory holding the artifact.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the artifact name of the repository descriptor.
    #[must_use]
    pub fn descriptor_artifact(&self) -> String {
        format!("{}.xml", self.id)
    }
}

/// Where the agent obtains the artifact bytes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployableSource {
    /// The artifact is read locally and uploaded as-is.
    LocalFile(PathBuf),
    /// The agent fetches the artifact from a repository via a deployment plan.
    Repository(RepositoryRef),
}

/// Artifact to deploy, parsed from its URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployable {
    url: Url,
    artifact_name: String,
    source: DeployableSource,
}

impl Deployable {
    /// Parses a deployable URL.
    ///
    /// `file` URLs are uploaded directly. `http` and `https` URLs are served
    /// through a repository descriptor named after the host.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerDomainError`] when the URL is malformed, uses an
    /// unsupported scheme, or has no final path segment.
    pub fn parse(raw: &str) -> Result<Self, ContainerDomainError> {
        let url = Url::parse(raw.trim()).map_err(|error| invalid_url(raw, &error))?;

        let artifact_name = url
            .path_segments()
            .and_then(Iterator::last)
            .filter(|segment| !segment.is_empty())
            .map(ToOwned::to_owned)
            .ok_or_else(|| ContainerDomainError::MissingArtifactName(raw.to_owned()))?;

        let source = match url.scheme() {
            "file" => {
                let path = url.to_file_path().map_err(|()| {
                    ContainerDomainError::InvalidDeployableUrl {
                        url: raw.to_owned(),
                        reason: "not a local file path".to_owned(),
                    }
                })?;
                DeployableSource::LocalFile(path)
            }
            "http" | "https" => DeployableSource::Repository(repository_for(raw, &url)?),
            other => {
                return Err(ContainerDomainError::UnsupportedDeployableScheme(
                    other.to_owned(),
                ));
            }
        };

        Ok(Self {
            url,
            artifact_name,
            source,
        })
    }

    /// Returns the parsed URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the artifact name (the final URL path segment).
    #[must_use]
    pub fn artifact_name(&self) -> &str {
        &self.artifact_name
    }

    /// Returns where the artifact bytes come from.
    #[must_use]
    pub const fn source(&self) -> &DeployableSource {
        &self.source
    }

    /// Returns the artifact name of the deployment plan for this deployable.
    #[must_use]
    pub fn plan_artifact(&self) -> String {
        let stem = self
            .artifact_name
            .rsplit_once('.')
            .map_or(self.artifact_name.as_str(), |(stem, _)| stem);
        format!("{stem}-plan.xml")
    }
}

fn repository_for(raw: &str, url: &Url) -> Result<RepositoryRef, ContainerDomainError> {
    let host = url
        .host_str()
        .ok_or_else(|| ContainerDomainError::InvalidDeployableUrl {
            url: raw.to_owned(),
            reason: "missing host".to_owned(),
        })?;
    let id = match url.port() {
        Some(port) => format!("repo-{host}-{port}"),
        None => format!("repo-{host}"),
    };
    let base_url = url
        .join("./")
        .map_err(|error| invalid_url(raw, &error))?
        .to_string();

    Ok(RepositoryRef { id, base_url })
}

fn invalid_url(raw: &str, error: &url::ParseError) -> ContainerDomainError {
    ContainerDomainError::InvalidDeployableUrl {
        url: raw.to_owned(),
        reason: error.to_string(),
    }
}
