use std::{
    io,
    process::{ExitStatus, Stdio},
    time::Duration,
};

use async_trait::async_trait;
use step_framework_core::constants::step_timeout;
use tokio::{
    io::{AsyncBufReadExt as _, AsyncRead, AsyncWrite, AsyncWriteExt as _, BufReader, Split},
    process::{Child, Command},
    time::timeout,
};
use tracing::{debug, warn};

/// Where subprocess output is streamed to while a step runs.
pub type OutputSink = dyn AsyncWrite + Send + Unpin;

/// Errors running docker compose commands.
#[derive(Debug, thiserror::Error)]
pub enum ComposeCommandError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("failed while waiting for {command}: {source}")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{command} timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },
    #[error("failed to write compose output: {source}")]
    Output {
        #[source]
        source: io::Error,
    },
}

/// Program plus argument vector for one compose CLI call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeInvocation {
    program: String,
    args: Vec<String>,
}

impl ComposeInvocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Single-line rendering for logs and step output. Arguments containing
    /// whitespace or quotes are double-quoted; the process itself is launched
    /// from the argument vector, never through a host shell.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote_for_display)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote_for_display(arg: &str) -> String {
    let needs_quotes =
        arg.is_empty() || arg.chars().any(|ch| ch.is_whitespace() || ch == '"' || ch == '\'');
    if !needs_quotes {
        return arg.to_owned();
    }

    let escaped = arg.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Launches a compose invocation, streams its output and reports the exit
/// code.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(
        &self,
        invocation: &ComposeInvocation,
        output: &mut OutputSink,
    ) -> Result<i32, ComposeCommandError>;
}

/// [`ProcessRunner`] backed by `tokio::process`.
///
/// Stdout and stderr are forwarded line by line as they arrive. Without a
/// timeout the call waits for as long as the subprocess runs.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner {
    timeout: Option<Duration>,
}

impl TokioProcessRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self { timeout: None }
    }

    /// Runner honoring `COMPOSE_STEP_TIMEOUT_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            timeout: step_timeout(),
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(
        &self,
        invocation: &ComposeInvocation,
        output: &mut OutputSink,
    ) -> Result<i32, ComposeCommandError> {
        let description = invocation.command_line();
        let mut command = Command::new(invocation.program());
        command
            .args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .map_err(|source| ComposeCommandError::Spawn {
                command: description.clone(),
                source,
            })?;
        debug!(command = %description, pid = child.id(), "spawned compose process");

        let status = match self.timeout {
            None => stream_until_exit(&mut child, output, &description).await?,
            Some(limit) => {
                let streaming = stream_until_exit(&mut child, output, &description);
                let result = timeout(limit, streaming).await;
                match result {
                    Ok(status) => status?,
                    Err(_) => {
                        warn!(
                            command = %description,
                            ?limit,
                            "compose process timed out; killing"
                        );
                        if let Err(err) = child.kill().await {
                            warn!(error = %err, "failed to kill timed out compose process");
                        }
                        return Err(ComposeCommandError::Timeout {
                            command: description,
                            timeout: limit,
                        });
                    }
                }
            }
        };

        Ok(exit_code(status))
    }
}

type Segments<R> = Split<BufReader<R>>;

async fn stream_until_exit(
    child: &mut Child,
    output: &mut OutputSink,
    description: &str,
) -> Result<ExitStatus, ComposeCommandError> {
    let mut stdout = child.stdout.take().map(|pipe| BufReader::new(pipe).split(b'\n'));
    let mut stderr = child.stderr.take().map(|pipe| BufReader::new(pipe).split(b'\n'));
    let wait_error = |source: io::Error| ComposeCommandError::Wait {
        command: description.to_owned(),
        source,
    };

    loop {
        tokio::select! {
            segment = next_segment(&mut stdout), if stdout.is_some() => {
                match segment.map_err(wait_error)? {
                    Some(line) => write_line(output, &line).await?,
                    None => stdout = None,
                }
            }
            segment = next_segment(&mut stderr), if stderr.is_some() => {
                match segment.map_err(wait_error)? {
                    Some(line) => write_line(output, &line).await?,
                    None => stderr = None,
                }
            }
            else => break,
        }
    }

    child.wait().await.map_err(wait_error)
}

async fn next_segment<R>(segments: &mut Option<Segments<R>>) -> io::Result<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    match segments {
        Some(segments) => segments.next_segment().await,
        None => Ok(None),
    }
}

/// Write one newline-terminated line to the step output and flush it.
pub(crate) async fn write_line(
    output: &mut OutputSink,
    line: &[u8],
) -> Result<(), ComposeCommandError> {
    let write = async {
        output.write_all(line).await?;
        output.write_all(b"\n").await?;
        output.flush().await
    };
    write
        .await
        .map_err(|source| ComposeCommandError::Output { source })
}

/// Exit code of a finished process; on unix a signal death maps to
/// `128 + signal` like a shell reports it.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt as _;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_quotes_shell_command() {
        let invocation = ComposeInvocation::new(
            "docker-compose",
            [
                "-f",
                "/ws/docker-compose.yml",
                "exec",
                "-T",
                "--index=1",
                "web",
                "/bin/bash",
                "-c",
                "echo hi",
            ]
            .map(String::from)
            .to_vec(),
        );
        assert_eq!(
            invocation.command_line(),
            r#"docker-compose -f /ws/docker-compose.yml exec -T --index=1 web /bin/bash -c "echo hi""#
        );
    }

    #[test]
    fn command_line_escapes_embedded_quotes() {
        let invocation = ComposeInvocation::new("docker-compose", vec![r#"say "hi""#.to_owned()]);
        assert_eq!(invocation.command_line(), r#"docker-compose "say \"hi\"""#);
    }

    #[test]
    fn empty_argument_is_visible() {
        let invocation = ComposeInvocation::new("docker-compose", vec![String::new()]);
        assert_eq!(invocation.command_line(), r#"docker-compose """#);
    }

    #[cfg(unix)]
    #[test]
    fn signal_exit_maps_like_a_shell() {
        use std::os::unix::process::ExitStatusExt as _;

        assert_eq!(exit_code(ExitStatus::from_raw(0)), 0);
        assert_eq!(exit_code(ExitStatus::from_raw(3 << 8)), 3);
        assert_eq!(exit_code(ExitStatus::from_raw(9)), 137);
    }
}
