use step_framework_core::ConfigError;

use crate::docker::commands::ComposeCommandError;

#[derive(Debug, thiserror::Error)]
/// Top-level compose step errors.
///
/// A compose CLI that ran and exited non-zero is not an error; it is reported
/// as [`step_framework_core::ExecutionOutcome::Failure`].
pub enum StepError {
    #[error("compose CLI `{cli}` does not appear to be available on this host")]
    ComposeUnavailable { cli: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Command(#[from] ComposeCommandError),
}
