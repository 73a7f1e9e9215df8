use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use step_framework_core::{CompletedStepConfig, ExecutionOutcome, PathStyle, VariantKind};
use step_runner_compose::{ComposeCli, ExecutionContext, StepError, StepExecutor};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Run one compose build step the way a pipeline host would.
#[derive(Debug, Parser)]
#[command(name = "compose_step", version)]
struct Args {
    /// YAML step configuration.
    #[arg(short, long, env = "COMPOSE_STEP_CONFIG", required_unless_present = "list_options")]
    config: Option<PathBuf>,

    /// Build workspace the compose file is resolved against.
    #[arg(short, long, env = "WORKSPACE", default_value = ".")]
    workspace: PathBuf,

    /// Path convention of the execution host.
    #[arg(long, value_enum, default_value_t = HostPaths::Native)]
    paths: HostPaths,

    /// Print the assembled command instead of running it.
    #[arg(long)]
    dry_run: bool,

    /// Skip the `<cli> version` availability probe.
    #[arg(long)]
    skip_probe: bool,

    /// List the supported operations and exit.
    #[arg(long)]
    list_options: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum HostPaths {
    Native,
    Posix,
    Windows,
}

impl From<HostPaths> for PathStyle {
    fn from(value: HostPaths) -> Self {
        match value {
            HostPaths::Native => PathStyle::host(),
            HostPaths::Posix => PathStyle::Posix,
            HostPaths::Windows => PathStyle::Windows,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.list_options {
        for kind in VariantKind::ALL {
            println!("{:<8} {}", kind.label(), kind.display_name());
        }
        return ExitCode::SUCCESS;
    }

    match run(args).await {
        Ok(ExecutionOutcome::Success) => ExitCode::SUCCESS,
        Ok(ExecutionOutcome::Failure { exit_code }) => {
            warn!(exit_code, "compose step failed");
            ExitCode::from(u8::try_from(exit_code).ok().filter(|code| *code != 0).unwrap_or(1))
        }
        Err(err) => {
            warn!("compose step could not run: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExecutionOutcome> {
    let config_path = args.config.context("no step configuration given")?;
    let config = CompletedStepConfig::load_from_file(&config_path)?;
    let executor = StepExecutor::from_env();
    let path_style = PathStyle::from(args.paths);

    info!(
        config = %config_path.display(),
        workspace = %args.workspace.display(),
        option = config.variant.kind().display_name(),
        "running compose step"
    );

    if args.dry_run {
        let invocation = executor.prepare(&config, &args.workspace, path_style)?;
        println!("{}", invocation.command_line());
        return Ok(ExecutionOutcome::Success);
    }

    if !args.skip_probe {
        probe(executor.cli()).await?;
    }

    let mut stdout = tokio::io::stdout();
    let ctx = ExecutionContext::new(&args.workspace, &mut stdout).with_path_style(path_style);
    executor
        .execute(&config, ctx)
        .await
        .context("executing compose step")
}

async fn probe(cli: &ComposeCli) -> Result<(), StepError> {
    cli.ensure_available().await.inspect_err(|_| {
        warn!("set COMPOSE_STEP_CLI to `plugin` to use `docker compose` instead");
    })
}
