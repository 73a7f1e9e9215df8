use std::{env, time::Duration};

/// Compose file used when a step does not name a custom one.
pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";

/// Executable of the standalone compose CLI.
pub const DEFAULT_COMPOSE_BINARY: &str = "docker-compose";

/// Executable that hosts the `compose` plugin.
pub const DOCKER_BINARY: &str = "docker";

/// Container instance targeted by `exec` when no index is configured.
pub const DEFAULT_CONTAINER_INDEX: u32 = 1;

/// Number of containers started by `up` for a single service.
pub const DEFAULT_SCALE: u32 = 1;

/// Shell used inside the container to interpret `exec` commands.
pub const CONTAINER_SHELL: &str = "/bin/bash";

/// Selects the compose CLI flavour (`standalone`, `plugin`, or an executable
/// path).
pub const COMPOSE_CLI_ENV: &str = "COMPOSE_STEP_CLI";

/// Optional wait timeout, in seconds, for a single compose invocation.
pub const STEP_TIMEOUT_ENV: &str = "COMPOSE_STEP_TIMEOUT_SECS";

/// Raw compose CLI selector from `COMPOSE_STEP_CLI`, ignoring empty values.
pub fn compose_cli_selector() -> Option<String> {
    env::var(COMPOSE_CLI_ENV)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Resolve the step timeout from `COMPOSE_STEP_TIMEOUT_SECS`. Unset, zero or
/// unparsable values mean the step waits indefinitely.
pub fn step_timeout() -> Option<Duration> {
    env::var(STEP_TIMEOUT_ENV)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}
