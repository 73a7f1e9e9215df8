use std::path::{Path, PathBuf};

use step_framework_core::{
    CommandVariant, CompletedStepConfig, ConfigError, ExecutionOutcome, PathStyle, VariantKind,
};
use tracing::{error, info, warn};

use crate::{
    docker::{
        ComposeCli,
        commands::{
            ComposeCommandError, ComposeInvocation, OutputSink, ProcessRunner, TokioProcessRunner,
            write_line,
        },
    },
    errors::StepError,
};

/// Per-invocation inputs supplied by the build host.
pub struct ExecutionContext<'a> {
    workspace_root: PathBuf,
    path_style: PathStyle,
    output: &'a mut OutputSink,
}

impl<'a> ExecutionContext<'a> {
    /// Context using the path convention of the current host.
    pub fn new(workspace_root: impl Into<PathBuf>, output: &'a mut OutputSink) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            path_style: PathStyle::host(),
            output,
        }
    }

    #[must_use]
    pub const fn with_path_style(mut self, path_style: PathStyle) -> Self {
        self.path_style = path_style;
        self
    }

    #[must_use]
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    #[must_use]
    pub const fn path_style(&self) -> PathStyle {
        self.path_style
    }
}

/// Runs a configured compose step: resolve the compose file, assemble the
/// arguments, launch the CLI, classify the exit code.
pub struct StepExecutor<R = TokioProcessRunner> {
    cli: ComposeCli,
    runner: R,
    variants: Vec<VariantKind>,
}

impl StepExecutor {
    /// Executor configured from the environment (`COMPOSE_STEP_CLI`,
    /// `COMPOSE_STEP_TIMEOUT_SECS`) with every operation enabled.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_runner(ComposeCli::from_env(), TokioProcessRunner::from_env())
    }
}

impl Default for StepExecutor {
    fn default() -> Self {
        Self::with_runner(ComposeCli::default(), TokioProcessRunner::new())
    }
}

impl<R: ProcessRunner> StepExecutor<R> {
    pub fn with_runner(cli: ComposeCli, runner: R) -> Self {
        Self {
            cli,
            runner,
            variants: VariantKind::ALL.to_vec(),
        }
    }

    /// Restrict the operations this executor accepts.
    #[must_use]
    pub fn with_variants(mut self, variants: impl IntoIterator<Item = VariantKind>) -> Self {
        self.variants = variants.into_iter().collect();
        self
    }

    #[must_use]
    pub fn variants(&self) -> &[VariantKind] {
        &self.variants
    }

    #[must_use]
    pub const fn cli(&self) -> &ComposeCli {
        &self.cli
    }

    /// Validate the step and assemble the invocation without running it.
    pub fn prepare(
        &self,
        config: &CompletedStepConfig,
        workspace_root: &Path,
        path_style: PathStyle,
    ) -> Result<ComposeInvocation, ConfigError> {
        config.validate()?;
        let kind = config.variant.kind();
        if !self.variants.contains(&kind) {
            return Err(ConfigError::UnsupportedVariant { kind });
        }

        let compose_file =
            config.compose_file_argument(&workspace_root.to_string_lossy(), path_style);
        info!(compose_file = compose_file.path(), "using compose file");

        let args = config.variant.build_arguments(&compose_file);
        Ok(self.cli.invocation(args))
    }

    /// Run the step once.
    ///
    /// The assembled command line and the exit code are written to the
    /// context output before returning, so the step log alone explains a
    /// failure.
    pub async fn execute(
        &self,
        config: &CompletedStepConfig,
        ctx: ExecutionContext<'_>,
    ) -> Result<ExecutionOutcome, StepError> {
        let ExecutionContext {
            workspace_root,
            path_style,
            output,
        } = ctx;

        let invocation = match self.prepare(config, &workspace_root, path_style) {
            Ok(invocation) => invocation,
            Err(err) => {
                error!(error = %err, "compose step configuration rejected");
                report_failure(output, &format!("compose step configuration rejected: {err}"))
                    .await;
                return Err(err.into());
            }
        };

        log_operation(&config.variant);
        report(output, &format!("$ {}", invocation.command_line())).await?;

        let exit_code = match self.runner.run(&invocation, output).await {
            Ok(code) => code,
            Err(err) => {
                error!(error = %err, "compose step failed to execute");
                report_failure(output, &format!("compose step failed to execute: {err}")).await;
                return Err(err.into());
            }
        };

        let outcome = ExecutionOutcome::from_exit_code(exit_code);
        info!(exit_code, %outcome, "compose step finished");
        report(output, &format!("exit code: {exit_code}")).await?;

        Ok(outcome)
    }
}

fn log_operation(variant: &CommandVariant) {
    match variant {
        CommandVariant::ExecInContainer(exec) => info!(
            command = %exec.command,
            service = %exec.service,
            index = exec.container_index,
            work_dir = %exec.work_dir,
            privileged = exec.privileged,
            "executing command inside container"
        ),
        CommandVariant::StopService(stop) => info!(service = %stop.service, "stopping service"),
        CommandVariant::StopAllServices => info!("stopping all services"),
        CommandVariant::StartService(start) => {
            info!(service = %start.service, scale = start.scale, "starting service");
        }
        CommandVariant::StartAllServices => info!("starting all services"),
    }
}

async fn report(output: &mut OutputSink, line: &str) -> Result<(), ComposeCommandError> {
    write_line(output, line.as_bytes()).await
}

async fn report_failure(output: &mut OutputSink, line: &str) {
    if let Err(err) = report(output, line).await {
        warn!(error = %err, "failed to write failure details to step output");
    }
}
