//! Template source reading from a capability-scoped directory.

use crate::container::ports::{TemplateSource, TemplateSourceError};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io::ErrorKind;
use std::sync::Arc;

/// Loads templates from files below one root directory.
///
/// Template paths are resolved relative to the root and cannot escape it.
#[derive(Debug)]
pub struct DirTemplateSource {
    root: Dir,
}

impl DirTemplateSource {
    /// Opens `root` as the template directory.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateSourceError::Io`] when the directory cannot be
    /// opened.
    pub fn open(root: &str) -> Result<Self, TemplateSourceError> {
        let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(|err| {
            TemplateSourceError::Io {
                path: root.to_owned(),
                source: Arc::new(err),
            }
        })?;
        Ok(Self { root: dir })
    }
}

impl TemplateSource for DirTemplateSource {
    fn load(&self, path: &str) -> Result<String, TemplateSourceError> {
        self.root.read_to_string(path).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                TemplateSourceError::NotFound(path.to_owned())
            } else {
                TemplateSourceError::Io {
                    path: path.to_owned(),
                    source: Arc::new(err),
                }
            }
        })
    }
}
