//! In-memory configuration catalog and template source.

use crate::container::{
    domain::CatalogConfiguration,
    ports::{CatalogError, ConfigurationCatalog, TemplateSource, TemplateSourceError},
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory configuration catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    configurations: Arc<RwLock<HashMap<String, CatalogConfiguration>>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when lock acquisition fails.
    pub fn insert(&self, configuration: CatalogConfiguration) -> Result<(), CatalogError> {
        let mut configurations = self
            .configurations
            .write()
            .map_err(|err| CatalogError::backend(std::io::Error::other(err.to_string())))?;
        configurations.insert(configuration.name().to_owned(), configuration);
        Ok(())
    }
}

impl ConfigurationCatalog for InMemoryCatalog {
    fn find_configuration(&self, name: &str) -> Result<Option<CatalogConfiguration>, CatalogError> {
        let configurations = self
            .configurations
            .read()
            .map_err(|err| CatalogError::backend(std::io::Error::other(err.to_string())))?;
        Ok(configurations.get(name).cloned())
    }
}

/// Thread-safe in-memory template source keyed by path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateSource {
    templates: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryTemplateSource {
    /// Creates an empty template source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the template stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateSourceError::Io`] when lock acquisition fails.
    pub fn insert(
        &self,
        path: impl Into<String>,
        template: impl Into<String>,
    ) -> Result<(), TemplateSourceError> {
        let template_path = path.into();
        let mut templates = self
            .templates
            .write()
            .map_err(|err| poisoned(&template_path, &err.to_string()))?;
        templates.insert(template_path, template.into());
        Ok(())
    }
}

fn poisoned(path: &str, message: &str) -> TemplateSourceError {
    TemplateSourceError::Io {
        path: path.to_owned(),
        source: Arc::new(std::io::Error::other(message.to_owned())),
    }
}

impl TemplateSource for InMemoryTemplateSource {
    fn load(&self, path: &str) -> Result<String, TemplateSourceError> {
        let templates = self
            .templates
            .read()
            .map_err(|err| poisoned(path, &err.to_string()))?;
        templates
            .get(path)
            .cloned()
            .ok_or_else(|| TemplateSourceError::NotFound(path.to_owned()))
    }
}
