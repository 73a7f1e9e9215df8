pub mod docker;
pub mod errors;
pub mod executor;

pub use docker::{
    ComposeCli,
    commands::{
        ComposeCommandError, ComposeInvocation, OutputSink, ProcessRunner, TokioProcessRunner,
    },
};
pub use errors::StepError;
pub use executor::{ExecutionContext, StepExecutor};
pub use step_framework_core::{
    CommandVariant, CompletedStepConfig, ConfigError, ExecInContainer, ExecutionOutcome,
    PathStyle, StartService, StopService, VariantKind,
};
