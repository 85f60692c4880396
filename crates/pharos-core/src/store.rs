//! Load and save the project configuration document

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::layout::ProjectLayout;
use crate::types::ProjectConfig;

/// Reads and writes `pharos-config.json`
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(layout: &ProjectLayout) -> Self {
        Self {
            path: layout.config_path(),
        }
    }

    /// Use an explicit document path.
    pub fn at<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the configuration, failing with `ConfigMissing` if the file is absent.
    pub fn load(&self) -> Result<ProjectConfig> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigMissing {
                    path: self.path.clone(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|e| Error::invalid_config(e.to_string()))
    }

    /// Save the configuration.
    ///
    /// The document is written to a temporary file next to the target and
    /// renamed into place, so readers never see a partial document.
    pub fn save(&self, config: &ProjectConfig) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut content = serde_json::to_string_pretty(config)?;
        content.push('\n');

        let mut file = tempfile::NamedTempFile::new_in(dir)?;
        file.write_all(content.as_bytes())?;
        file.persist(&self.path).map_err(|e| Error::FileSystem(e.error))?;
        Ok(())
    }
}
