use serde::{Deserialize, Serialize};

use crate::{
    compose_file::ComposeFileArg,
    constants::{CONTAINER_SHELL, DEFAULT_CONTAINER_INDEX, DEFAULT_SCALE},
};

/// Compose operation performed by a build step.
///
/// The set is closed: adding an operation means adding a variant here, and
/// every match over it is checked for exhaustiveness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "option")]
pub enum CommandVariant {
    #[serde(rename = "exec")]
    ExecInContainer(ExecInContainer),
    #[serde(rename = "stop")]
    StopService(StopService),
    #[serde(rename = "stop_all")]
    StopAllServices,
    #[serde(rename = "up")]
    StartService(StartService),
    #[serde(rename = "up_all")]
    StartAllServices,
}

/// Run a shell command inside an already running service container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecInContainer {
    #[serde(default)]
    pub privileged: bool,
    pub service: String,
    pub command: String,
    #[serde(default = "default_container_index")]
    pub container_index: u32,
    #[serde(default)]
    pub work_dir: String,
}

impl ExecInContainer {
    pub fn new(service: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            privileged: false,
            service: service.into(),
            command: command.into(),
            container_index: DEFAULT_CONTAINER_INDEX,
            work_dir: String::new(),
        }
    }

    #[must_use]
    pub const fn privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    #[must_use]
    pub const fn index(mut self, container_index: u32) -> Self {
        self.container_index = container_index;
        self
    }

    #[must_use]
    pub fn work_dir(mut self, work_dir: impl Into<String>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    fn push_arguments(&self, args: &mut Vec<String>) {
        args.push("exec".to_owned());
        // Output is captured, so no pseudo-TTY.
        args.push("-T".to_owned());
        if self.privileged {
            args.push("--privileged".to_owned());
        }
        args.push(format!("--index={}", self.container_index));
        if !self.work_dir.is_empty() {
            args.push("-w".to_owned());
            args.push(self.work_dir.clone());
        }
        args.push(self.service.clone());
        args.push(CONTAINER_SHELL.to_owned());
        args.push("-c".to_owned());
        args.push(self.command.clone());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopService {
    pub service: String,
}

impl StopService {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

/// Bring up one service, optionally scaled to several containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartService {
    pub service: String,
    #[serde(default = "default_scale")]
    pub scale: u32,
}

impl StartService {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            scale: DEFAULT_SCALE,
        }
    }

    #[must_use]
    pub const fn scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }
}

const fn default_container_index() -> u32 {
    DEFAULT_CONTAINER_INDEX
}

const fn default_scale() -> u32 {
    DEFAULT_SCALE
}

/// Field-less discriminant of [`CommandVariant`], used to describe which
/// operations an executor accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    ExecInContainer,
    StopService,
    StopAllServices,
    StartService,
    StartAllServices,
}

impl VariantKind {
    pub const ALL: [Self; 5] = [
        Self::ExecInContainer,
        Self::StopService,
        Self::StopAllServices,
        Self::StartService,
        Self::StartAllServices,
    ];

    /// Tag used in serialized step configuration.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ExecInContainer => "exec",
            Self::StopService => "stop",
            Self::StopAllServices => "stop_all",
            Self::StartService => "up",
            Self::StartAllServices => "up_all",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::ExecInContainer => "Execute command inside running container",
            Self::StopService => "Stop service",
            Self::StopAllServices => "Stop all services",
            Self::StartService => "Start service",
            Self::StartAllServices => "Start all services",
        }
    }
}

impl CommandVariant {
    #[must_use]
    pub const fn kind(&self) -> VariantKind {
        match self {
            Self::ExecInContainer(_) => VariantKind::ExecInContainer,
            Self::StopService(_) => VariantKind::StopService,
            Self::StopAllServices => VariantKind::StopAllServices,
            Self::StartService(_) => VariantKind::StartService,
            Self::StartAllServices => VariantKind::StartAllServices,
        }
    }

    /// Service targeted by the operation, if it targets a single one.
    #[must_use]
    pub fn service(&self) -> Option<&str> {
        match self {
            Self::ExecInContainer(exec) => Some(&exec.service),
            Self::StopService(stop) => Some(&stop.service),
            Self::StartService(start) => Some(&start.service),
            Self::StopAllServices | Self::StartAllServices => None,
        }
    }

    /// Full compose CLI argument vector, starting with the file selection.
    #[must_use]
    pub fn build_arguments(&self, compose_file: &ComposeFileArg) -> Vec<String> {
        let mut args = compose_file.to_args();
        match self {
            Self::ExecInContainer(exec) => exec.push_arguments(&mut args),
            Self::StopService(stop) => {
                args.push("stop".to_owned());
                args.push(stop.service.clone());
            }
            Self::StopAllServices => args.push("down".to_owned()),
            Self::StartService(start) => {
                args.extend(["up", "-d", "--no-recreate", "--scale"].map(String::from));
                args.push(format!("{}={}", start.service, start.scale));
                args.push(start.service.clone());
            }
            Self::StartAllServices => {
                args.extend(["up", "-d", "--no-recreate"].map(String::from));
            }
        }
        args
    }
}

impl From<ExecInContainer> for CommandVariant {
    fn from(value: ExecInContainer) -> Self {
        Self::ExecInContainer(value)
    }
}

impl From<StopService> for CommandVariant {
    fn from(value: StopService) -> Self {
        Self::StopService(value)
    }
}

impl From<StartService> for CommandVariant {
    fn from(value: StartService) -> Self {
        Self::StartService(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> ComposeFileArg {
        ComposeFileArg::new("/x/docker-compose.yml")
    }

    #[test]
    fn stop_all_is_down() {
        let args = CommandVariant::StopAllServices.build_arguments(&file());
        assert_eq!(args, vec!["-f", "/x/docker-compose.yml", "down"]);
    }

    #[test]
    fn stop_service_names_service() {
        let variant = CommandVariant::from(StopService::new("web"));
        let args = variant.build_arguments(&ComposeFileArg::new("a.yml"));
        assert_eq!(args.join(" "), "-f a.yml stop web");
    }

    #[test]
    fn exec_minimal() {
        let variant = CommandVariant::from(ExecInContainer::new("web", "echo hi"));
        let args = variant.build_arguments(&file());
        assert_eq!(
            args,
            vec![
                "-f",
                "/x/docker-compose.yml",
                "exec",
                "-T",
                "--index=1",
                "web",
                "/bin/bash",
                "-c",
                "echo hi",
            ]
        );
    }

    #[test]
    fn exec_service_and_shell_command_always_come_last() {
        for privileged in [false, true] {
            for work_dir in ["", "/app"] {
                let exec = ExecInContainer::new("db", "make test && echo ok")
                    .privileged(privileged)
                    .index(3)
                    .work_dir(work_dir);
                let args = CommandVariant::from(exec).build_arguments(&file());

                let tail = &args[args.len() - 4..];
                assert_eq!(tail, ["db", "/bin/bash", "-c", "make test && echo ok"]);
                assert_eq!(args.contains(&"--privileged".to_owned()), privileged);
                assert_eq!(args.contains(&"-w".to_owned()), !work_dir.is_empty());
                assert!(args.contains(&"--index=3".to_owned()));
            }
        }
    }

    #[test]
    fn exec_optional_flags_order() {
        let exec = ExecInContainer::new("web", "ls")
            .privileged(true)
            .index(2)
            .work_dir("/srv");
        let args = CommandVariant::from(exec).build_arguments(&file());
        assert_eq!(
            &args[2..],
            [
                "exec",
                "-T",
                "--privileged",
                "--index=2",
                "-w",
                "/srv",
                "web",
                "/bin/bash",
                "-c",
                "ls",
            ]
        );
    }

    #[test]
    fn start_service_scales_target() {
        let variant = CommandVariant::from(StartService::new("worker").scale(3));
        let args = variant.build_arguments(&ComposeFileArg::new("a.yml"));
        assert_eq!(
            args.join(" "),
            "-f a.yml up -d --no-recreate --scale worker=3 worker"
        );
    }

    #[test]
    fn start_all_is_detached_up() {
        let args = CommandVariant::StartAllServices.build_arguments(&ComposeFileArg::new("a.yml"));
        assert_eq!(args.join(" "), "-f a.yml up -d --no-recreate");
    }

    #[test]
    fn kinds_cover_every_variant_once() {
        let labels: Vec<_> = VariantKind::ALL.iter().map(|kind| kind.label()).collect();
        assert_eq!(labels, ["exec", "stop", "stop_all", "up", "up_all"]);
        assert_eq!(
            CommandVariant::StopAllServices.kind().display_name(),
            "Stop all services"
        );
    }
}
