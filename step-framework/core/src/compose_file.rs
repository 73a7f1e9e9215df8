use std::{fmt, path::Path};

use tracing::debug;

use crate::constants::DEFAULT_COMPOSE_FILE;

/// Path convention of the host that runs the compose CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathStyle {
    #[default]
    Posix,
    Windows,
}

impl PathStyle {
    /// Convention of the host this process runs on.
    #[must_use]
    pub const fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    #[must_use]
    pub const fn is_posix(self) -> bool {
        matches!(self, Self::Posix)
    }

    const fn is_separator(self, ch: char) -> bool {
        match self {
            Self::Posix => ch == '/',
            Self::Windows => ch == '/' || ch == '\\',
        }
    }
}

/// The `-f <path>` file-selection argument handed to the compose CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeFileArg {
    path: String,
}

impl ComposeFileArg {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Argument vector form: `["-f", <path>]`.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        vec!["-f".to_owned(), self.path.clone()]
    }
}

impl fmt::Display for ComposeFileArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-f {}", self.path)
    }
}

/// Pick the compose file argument for a step.
///
/// A file that exists relative to the current working directory is used
/// verbatim. Anything else is assumed to live in the workspace and is joined
/// lexically onto `workspace_root`; the joined path is never checked, so a
/// missing file only surfaces when the compose CLI rejects it.
pub fn resolve_compose_file_argument(
    use_custom: bool,
    custom_path: &str,
    workspace_root: &str,
    style: PathStyle,
) -> ComposeFileArg {
    let candidate = if use_custom {
        custom_path
    } else {
        DEFAULT_COMPOSE_FILE
    };

    if Path::new(candidate).exists() {
        debug!(compose_file = candidate, "using compose file from working directory");
        return ComposeFileArg::new(candidate);
    }

    let resolved = workspace_relative(workspace_root, candidate, style);
    debug!(compose_file = %resolved, "using compose file relative to workspace");
    ComposeFileArg::new(resolved)
}

fn workspace_relative(workspace_root: &str, candidate: &str, style: PathStyle) -> String {
    let mut root = workspace_root;
    if !style.is_posix() {
        // `/C:/ws` -> `C:/ws`
        root = root.strip_prefix(|ch: char| style.is_separator(ch)).unwrap_or(root);
    }
    root = root.strip_suffix(|ch: char| style.is_separator(ch)).unwrap_or(root);

    format!("{root}/{candidate}")
}
