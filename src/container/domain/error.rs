//! Error types for container domain validation.

use thiserror::Error;

/// Errors returned while constructing container domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContainerDomainError {
    /// A resource name is empty after trimming.
    #[error("{kind} name must not be empty")]
    EmptyName {
        /// Kind of resource being named.
        kind: &'static str,
    },

    /// A resource name contains characters outside `[A-Za-z0-9._-]`.
    #[error(
        "{kind} name '{value}' contains invalid characters (only alphanumerics, '.', '_' and '-' allowed)"
    )]
    InvalidName {
        /// Kind of resource being named.
        kind: &'static str,
        /// Rejected value.
        value: String,
    },

    /// A resource name exceeds the 100-character storage limit.
    #[error("{kind} name exceeds 100 character limit: {value}")]
    NameTooLong {
        /// Kind of resource being named.
        kind: &'static str,
        /// Rejected value.
        value: String,
    },

    /// An agent API URL is not an absolute `http` or `https` URL.
    #[error("agent API URL '{0}' must be an absolute http:// or https:// URL")]
    InvalidAgentUrl(String),

    /// A connector port is zero.
    #[error("connector port must be non-zero")]
    InvalidPort,

    /// A datasource field is empty after trimming.
    #[error("datasource {0} must not be empty")]
    EmptyDatasourceField(&'static str),

    /// A deployable URL could not be parsed.
    #[error("invalid deployable URL '{url}': {reason}")]
    InvalidDeployableUrl {
        /// Raw URL text.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A deployable URL uses a scheme other than `file`, `http`, or `https`.
    #[error("unsupported deployable URL scheme '{0}'")]
    UnsupportedDeployableScheme(String),

    /// A deployable URL has no final path segment to name the artifact.
    #[error("deployable URL '{0}' does not name an artifact")]
    MissingArtifactName(String),

    /// A catalog configuration does not carry the expected kind.
    #[error(
        "configuration '{configuration}' has {field} '{actual}', expected '{expected}'"
    )]
    ConfigurationMismatch {
        /// Catalog configuration name.
        configuration: String,
        /// Mismatched field (`type` or `sub-type`).
        field: &'static str,
        /// Value found in the catalog.
        actual: String,
        /// Value this manager requires.
        expected: String,
    },

    /// A payload template failed to render.
    #[error("failed to render template '{template}': {reason}")]
    TemplateRender {
        /// Template identifier.
        template: String,
        /// Renderer diagnostic.
        reason: String,
    },
}
