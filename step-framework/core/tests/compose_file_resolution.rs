use std::{env, fs, path::PathBuf};

use serial_test::serial;
use step_framework_core::{
    CommandVariant, CompletedStepConfig, PathStyle, StopService, constants::DEFAULT_COMPOSE_FILE,
};

struct CwdGuard {
    previous: PathBuf,
}

impl CwdGuard {
    fn enter(dir: &std::path::Path) -> Self {
        let previous = env::current_dir().expect("current dir");
        env::set_current_dir(dir).expect("enter temp dir");
        Self { previous }
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = env::set_current_dir(&self.previous);
    }
}

#[test]
#[serial]
fn local_compose_file_wins_over_workspace() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join(DEFAULT_COMPOSE_FILE), "services: {}\n").expect("write compose");
    let _cwd = CwdGuard::enter(dir.path());

    let config = CompletedStepConfig::new(CommandVariant::StopAllServices);
    let arg = config.compose_file_argument("/ws", PathStyle::Posix);

    assert_eq!(arg.path(), DEFAULT_COMPOSE_FILE);
}

#[test]
#[serial]
fn missing_local_file_falls_back_to_workspace() {
    let dir = tempfile::tempdir().expect("tempdir");
    let _cwd = CwdGuard::enter(dir.path());

    let config = CompletedStepConfig::new(StopService::new("web"));
    let arg = config.compose_file_argument("/ws/", PathStyle::Posix);

    assert_eq!(arg.path(), "/ws/docker-compose.yml");
    assert_eq!(
        config.variant.build_arguments(&arg).join(" "),
        "-f /ws/docker-compose.yml stop web"
    );
}

#[test]
#[serial]
fn custom_compose_file_in_subdirectory() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir_all(dir.path().join("ci")).expect("mkdir");
    fs::write(dir.path().join("ci/stack.yml"), "services: {}\n").expect("write compose");
    let _cwd = CwdGuard::enter(dir.path());

    let config =
        CompletedStepConfig::new(CommandVariant::StopAllServices).with_compose_file("ci/stack.yml");
    assert_eq!(
        config.compose_file_argument("/ws", PathStyle::Posix).path(),
        "ci/stack.yml"
    );

    let config = CompletedStepConfig::new(CommandVariant::StopAllServices)
        .with_compose_file("ci/other.yml");
    assert_eq!(
        config
            .compose_file_argument("/C:/ws/", PathStyle::Windows)
            .path(),
        "C:/ws/ci/other.yml"
    );
}

#[test]
#[serial]
fn default_file_name_is_always_compose_yml() {
    let dir = tempfile::tempdir().expect("tempdir");
    let _cwd = CwdGuard::enter(dir.path());

    for root in ["/ws", "/ws/", "/", "relative/ws", "/C:/ws/"] {
        for style in [PathStyle::Posix, PathStyle::Windows] {
            let arg = CompletedStepConfig::new(CommandVariant::StartAllServices)
                .compose_file_argument(root, style);
            assert!(
                arg.path().ends_with("/docker-compose.yml"),
                "{root} -> {}",
                arg.path()
            );
            assert!(!arg.path().contains("//"), "{root} -> {}", arg.path());
        }
    }
}
