use std::path::PathBuf;

use crate::{
    config::CompletedStepConfig,
    variant::{CommandVariant, VariantKind},
};

#[derive(Debug, thiserror::Error)]
/// Step configuration failures, raised before any process is launched.
pub enum ConfigError {
    #[error("{field} should not be empty")]
    EmptyField { field: &'static str },
    #[error("{field} must be at least 1 (got {value})")]
    OutOfRange { field: &'static str, value: u32 },
    #[error("'{}' is not enabled for this step executor", kind.display_name())]
    UnsupportedVariant { kind: VariantKind },
    #[error("failed to read step config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse step config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl CompletedStepConfig {
    /// Reject configurations that would assemble a malformed compose
    /// invocation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.use_custom_compose_file {
            require_non_empty("composeFilePath", &self.compose_file_path)?;
        }

        match &self.variant {
            CommandVariant::ExecInContainer(exec) => {
                require_non_empty("service", &exec.service)?;
                require_non_empty("command", &exec.command)?;
                require_positive("containerIndex", exec.container_index)
            }
            CommandVariant::StopService(stop) => require_non_empty("service", &stop.service),
            CommandVariant::StartService(start) => {
                require_non_empty("service", &start.service)?;
                require_positive("scale", start.scale)
            }
            CommandVariant::StopAllServices | CommandVariant::StartAllServices => Ok(()),
        }
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyField { field });
    }
    Ok(())
}

fn require_positive(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::OutOfRange { field, value });
    }
    Ok(())
}
