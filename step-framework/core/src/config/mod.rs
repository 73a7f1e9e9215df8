pub mod validation;

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    compose_file::{ComposeFileArg, PathStyle, resolve_compose_file_argument},
    config::validation::ConfigError,
    variant::CommandVariant,
};

/// Configuration of one compose build step, fixed once the step is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedStepConfig {
    #[serde(default)]
    pub use_custom_compose_file: bool,
    /// Only consulted when `use_custom_compose_file` is set.
    #[serde(default)]
    pub compose_file_path: String,
    pub variant: CommandVariant,
}

impl CompletedStepConfig {
    /// Step using the default `docker-compose.yml`.
    pub fn new(variant: impl Into<CommandVariant>) -> Self {
        Self {
            use_custom_compose_file: false,
            compose_file_path: String::new(),
            variant: variant.into(),
        }
    }

    #[must_use]
    pub fn with_compose_file(mut self, path: impl Into<String>) -> Self {
        self.use_custom_compose_file = true;
        self.compose_file_path = path.into();
        self
    }

    /// Resolve the `-f` argument against the given workspace.
    #[must_use]
    pub fn compose_file_argument(&self, workspace_root: &str, style: PathStyle) -> ComposeFileArg {
        resolve_compose_file_argument(
            self.use_custom_compose_file,
            &self.compose_file_path,
            workspace_root,
            style,
        )
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
