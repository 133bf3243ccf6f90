//! Identifier and validated-name types for containers and agents.

use super::ContainerDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum length for a resource name, matching `VARCHAR(100)`.
const MAX_NAME_LENGTH: usize = 100;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random ", $label, " identifier.")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Creates a ", $label, " identifier from an existing UUID.")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

macro_rules! resource_name {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a validated ", $kind, " name.")]
            ///
            /// The input is trimmed. Only characters in `[A-Za-z0-9._-]` are
            /// accepted because names are embedded in agent URL paths.
            ///
            /// # Errors
            ///
            /// Returns [`ContainerDomainError`] when validation fails.
            pub fn new(value: impl Into<String>) -> Result<Self, ContainerDomainError> {
                validate_name($kind, value.into()).map(Self)
            }

            #[doc = concat!("Returns the ", $kind, " name as a string slice.")]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ContainerDomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str(self.as_str())
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a container record.
    ContainerId,
    "container"
);

uuid_id!(
    /// Unique identifier for an agent record.
    AgentId,
    "agent"
);

resource_name!(
    /// Validated, unique container name.
    ContainerName,
    "container"
);

resource_name!(
    /// Validated agent name.
    AgentName,
    "agent"
);

resource_name!(
    /// Validated connector name, unique within one container.
    ConnectorName,
    "connector"
);

resource_name!(
    /// Validated datasource name, unique within one container.
    DatasourceName,
    "datasource"
);

fn validate_name(kind: &'static str, value: String) -> Result<String, ContainerDomainError> {
    let normalized = value.trim().to_owned();

    if normalized.is_empty() {
        return Err(ContainerDomainError::EmptyName { kind });
    }

    let is_valid = normalized
        .chars()
        .all(|character| character.is_ascii_alphanumeric() || matches!(character, '.' | '_' | '-'));
    if !is_valid {
        return Err(ContainerDomainError::InvalidName {
            kind,
            value: normalized,
        });
    }

    if normalized.len() > MAX_NAME_LENGTH {
        return Err(ContainerDomainError::NameTooLong {
            kind,
            value: normalized,
        });
    }

    Ok(normalized)
}
