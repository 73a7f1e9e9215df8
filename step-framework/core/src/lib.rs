pub mod compose_file;
pub mod config;
pub mod constants;
pub mod outcome;
pub mod variant;

pub use compose_file::{ComposeFileArg, PathStyle, resolve_compose_file_argument};
pub use config::{CompletedStepConfig, validation::ConfigError};
pub use outcome::ExecutionOutcome;
pub use variant::{CommandVariant, ExecInContainer, StartService, StopService, VariantKind};
