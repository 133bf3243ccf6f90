//! Catalog configuration entries resolved by name at container creation.

use super::ContainerDomainError;
use serde::{Deserialize, Serialize};

/// Named configuration resolved from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfiguration {
    name: String,
    #[serde(rename = "type")]
    config_type: String,
    sub_type: String,
    template_path: String,
}

impl CatalogConfiguration {
    /// Creates a catalog configuration entry.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        config_type: impl Into<String>,
        sub_type: impl Into<String>,
        template_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            config_type: config_type.into(),
            sub_type: sub_type.into(),
            template_path: template_path.into(),
        }
    }

    /// Returns the configuration name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configuration type.
    #[must_use]
    pub fn config_type(&self) -> &str {
        &self.config_type
    }

    /// Returns the configuration sub-type.
    #[must_use]
    pub fn sub_type(&self) -> &str {
        &self.sub_type
    }

    /// Returns the path of the topology template for this configuration.
    #[must_use]
    pub fn template_path(&self) -> &str {
        &self.template_path
    }

    /// Checks that the configuration describes the expected resource kind.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerDomainError::ConfigurationMismatch`] naming the first
    /// field that differs.
    pub fn ensure_kind(
        &self,
        expected_type: &str,
        expected_sub_type: &str,
    ) -> Result<(), ContainerDomainError> {
        if self.config_type != expected_type {
            return Err(self.mismatch("type", &self.config_type, expected_type));
        }
        if self.sub_type != expected_sub_type {
            return Err(self.mismatch("sub-type", &self.sub_type, expected_sub_type));
        }
        Ok(())
    }

    fn mismatch(&self, field: &'static str, actual: &str, expected: &str) -> ContainerDomainError {
        ContainerDomainError::ConfigurationMismatch {
            configuration: self.name.clone(),
            field,
            actual: actual.to_owned(),
            expected: expected.to_owned(),
        }
    }
}
