//! Catalog and template-source ports used at container creation.

use crate::container::domain::CatalogConfiguration;
use std::sync::Arc;
use thiserror::Error;

/// Read-only catalog of named configurations.
pub trait ConfigurationCatalog: Send + Sync {
    /// Resolves a configuration by name.
    ///
    /// Returns `Ok(None)` when the catalog has no such entry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the catalog cannot be queried.
    fn find_configuration(&self, name: &str) -> Result<Option<CatalogConfiguration>, CatalogError>;
}

/// Errors returned by catalog implementations.
#[derive(Debug, Clone, Error)]
#[error("catalog lookup failed: {0}")]
pub struct CatalogError(pub Arc<dyn std::error::Error + Send + Sync>);

impl CatalogError {
    /// Wraps a catalog backend failure.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}

/// Source of raw payload templates addressed by path.
pub trait TemplateSource: Send + Sync {
    /// Loads the raw template at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateSourceError::NotFound`] when no template exists at
    /// `path` or [`TemplateSourceError::Io`] when reading fails.
    fn load(&self, path: &str) -> Result<String, TemplateSourceError>;
}

/// Errors returned by template sources.
#[derive(Debug, Clone, Error)]
pub enum TemplateSourceError {
    /// No template exists at the path.
    #[error("template not found: {0}")]
    NotFound(String),

    /// The template could not be read.
    #[error("failed to read template '{path}': {source}")]
    Io {
        /// Template path.
        path: String,
        /// Underlying failure.
        source: Arc<std::io::Error>,
    },
}
