pub mod commands;

use std::{process::Stdio, time::Duration};

use step_framework_core::constants::{DEFAULT_COMPOSE_BINARY, DOCKER_BINARY, compose_cli_selector};
use tokio::{process::Command, time::timeout};
use tracing::debug;

use crate::{docker::commands::ComposeInvocation, errors::StepError};

const COMPOSE_VERSION_TIMEOUT: Duration = Duration::from_secs(15);

/// Which compose executable a step drives.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ComposeCli {
    /// `docker-compose`
    #[default]
    Standalone,
    /// `docker compose`
    Plugin,
    /// Any other launcher. `args` are passed before the compose arguments.
    Custom { program: String, args: Vec<String> },
}

impl ComposeCli {
    /// Select the CLI from `COMPOSE_STEP_CLI`, defaulting to the standalone
    /// binary.
    #[must_use]
    pub fn from_env() -> Self {
        compose_cli_selector()
            .map(|selector| Self::from_selector(&selector))
            .unwrap_or_default()
    }

    /// `standalone`, `plugin`, or the path of another compose executable.
    /// The path is taken whole, so it may contain spaces.
    #[must_use]
    pub fn from_selector(selector: &str) -> Self {
        match selector.trim() {
            "" | "standalone" => Self::Standalone,
            "plugin" => Self::Plugin,
            path => Self::Custom {
                program: path.to_owned(),
                args: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        match self {
            Self::Standalone => DEFAULT_COMPOSE_BINARY,
            Self::Plugin => DOCKER_BINARY,
            Self::Custom { program, .. } => program,
        }
    }

    /// Arguments placed before the compose arguments proper.
    #[must_use]
    pub fn leading_args(&self) -> Vec<String> {
        match self {
            Self::Standalone => Vec::new(),
            Self::Plugin => vec!["compose".to_owned()],
            Self::Custom { args, .. } => args.clone(),
        }
    }

    /// Build the full invocation for an already assembled compose argument
    /// vector.
    #[must_use]
    pub fn invocation(&self, compose_args: Vec<String>) -> ComposeInvocation {
        let mut args = self.leading_args();
        args.extend(compose_args);
        ComposeInvocation::new(self.program(), args)
    }

    /// Checks that `<cli> version` succeeds within a timeout.
    pub async fn ensure_available(&self) -> Result<(), StepError> {
        let mut command = Command::new(self.program());
        command
            .args(self.leading_args())
            .arg("version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let available = timeout(COMPOSE_VERSION_TIMEOUT, command.status())
            .await
            .ok()
            .and_then(Result::ok)
            .map(|status| status.success())
            .unwrap_or(false);

        debug!(cli = self.program(), available, "probed compose CLI");
        if available {
            Ok(())
        } else {
            Err(StepError::ComposeUnavailable {
                cli: self.invocation(Vec::new()).command_line(),
            })
        }
    }
}
