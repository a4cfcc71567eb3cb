//! Tests for ServeService and build_and_serve
#![cfg(unix)]

use std::io::{self, Write};
use std::os::unix::process::ExitStatusExt;
use std::path::Path;
use std::process::{Child, ExitStatus, Output};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rstest::{fixture, rstest};
use tempfile::TempDir;

use elm_emaki::application::services::{build_and_serve, BuildService, ServeService};
use elm_emaki::application::ApplicationError;
use elm_emaki::config::Settings;
use elm_emaki::infrastructure::traits::{CommandRunner, RealCommandRunner};
use elm_emaki::util::testing;

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

/// In-memory sink shared with the relay thread.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runner whose builds exit with `build_status` and which counts spawns.
struct CountingRunner {
    build_status: i32,
    spawns: AtomicUsize,
}

impl CommandRunner for CountingRunner {
    fn run_in(&self, _dir: &Path, _cmd: &str, _args: &[&str]) -> io::Result<Output> {
        Ok(Output {
            status: ExitStatus::from_raw(self.build_status << 8),
            stdout: Vec::new(),
            stderr: b"compile error".to_vec(),
        })
    }

    fn spawn_piped(&self, _dir: &Path, _cmd: &str, _args: &[&str]) -> io::Result<Child> {
        self.spawns.fetch_add(1, Ordering::SeqCst);
        Err(io::Error::other("server spawned"))
    }
}

#[fixture]
fn temp() -> TempDir {
    TempDir::new().unwrap()
}

fn shell_server(script: &str) -> ServeService {
    let settings = Settings {
        server: vec!["sh".into(), "-c".into(), script.into(), "server".into()],
        ..Settings::default()
    };
    ServeService::new(Arc::new(RealCommandRunner), Arc::new(settings))
}

// ============================================================
// Command line
// ============================================================

#[rstest]
#[case(8000, &["serve", "-p", "8000", "output"])]
#[case(3000, &["serve", "-p", "3000", "output"])]
fn given_port_when_building_serve_command_then_serves_output_dir(
    #[case] port: u16,
    #[case] expected: &[&str],
) {
    let service = ServeService::new(Arc::new(RealCommandRunner), Arc::new(Settings::default()));

    let command = service.command(port).unwrap();

    assert_eq!(command.program, expected[0]);
    assert_eq!(command.args, expected[1..]);
}

// ============================================================
// Build then serve
// ============================================================

#[rstest]
fn given_failing_build_when_build_and_serve_then_server_never_started(temp: TempDir) {
    // Arrange
    let runner = Arc::new(CountingRunner {
        build_status: 1,
        spawns: AtomicUsize::new(0),
    });
    let settings = Arc::new(Settings::default());
    let build = BuildService::new(runner.clone(), settings.clone());
    let serve = ServeService::new(runner.clone(), settings);

    // Act
    let result = build_and_serve(&build, &serve, temp.path(), 8000);

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::CommandFailed { .. })
    ));
    assert_eq!(runner.spawns.load(Ordering::SeqCst), 0);
}

#[rstest]
fn given_successful_build_when_build_and_serve_then_server_started(temp: TempDir) {
    let runner = Arc::new(CountingRunner {
        build_status: 0,
        spawns: AtomicUsize::new(0),
    });
    let settings = Arc::new(Settings::default());
    let build = BuildService::new(runner.clone(), settings.clone());
    let serve = ServeService::new(runner.clone(), settings);

    let result = build_and_serve(&build, &serve, temp.path(), 8000);

    assert!(matches!(
        result,
        Err(ApplicationError::OperationFailed { .. })
    ));
    assert_eq!(runner.spawns.load(Ordering::SeqCst), 1);
}

// ============================================================
// Relaying and lifecycle
// ============================================================

#[rstest]
fn given_server_output_when_serving_then_both_streams_relayed(temp: TempDir) {
    // Arrange
    let service = shell_server(r#"printf '%s\n' "$*"; echo listening >&2"#);
    let (out, err) = (Captured::default(), Captured::default());

    // Act
    let handle = service
        .serve_static_to(temp.path(), 8000, Box::new(out.clone()), Box::new(err.clone()))
        .unwrap();
    let exit = handle.wait().unwrap();

    // Assert
    assert!(exit.status.success());
    assert!(!exit.cancelled);
    assert_eq!(out.text(), "-p 8000 output\n");
    assert_eq!(err.text(), "listening\n");
}

#[rstest]
fn given_server_runs_in_root_when_serving_then_working_dir_is_root(temp: TempDir) {
    let service = shell_server("pwd");
    let out = Captured::default();

    let handle = service
        .serve_static_to(temp.path(), 8000, Box::new(out.clone()), Box::new(io::sink()))
        .unwrap();
    handle.wait().unwrap();

    assert_eq!(
        Path::new(out.text().trim()).canonicalize().unwrap(),
        temp.path().canonicalize().unwrap()
    );
}

#[rstest]
fn given_server_exits_nonzero_when_waiting_then_exit_not_clean(temp: TempDir) {
    let service = shell_server("exit 3");

    let handle = service
        .serve_static_to(temp.path(), 8000, Box::new(io::sink()), Box::new(io::sink()))
        .unwrap();
    let exit = handle.wait().unwrap();

    assert_eq!(exit.status.code(), Some(3));
    assert!(!exit.is_clean());
}

#[rstest]
fn given_running_server_when_cancelled_then_wait_returns_promptly(temp: TempDir) {
    // Arrange
    let service = shell_server("exec sleep 30");
    let handle = service
        .serve_static_to(temp.path(), 8000, Box::new(io::sink()), Box::new(io::sink()))
        .unwrap();
    let canceller = handle.canceller();
    let started = Instant::now();

    // Act
    let cancelling = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        canceller.cancel();
    });
    let exit = handle.wait().unwrap();
    cancelling.join().unwrap();

    // Assert
    assert!(exit.cancelled);
    assert!(exit.is_clean());
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[rstest]
fn given_forking_server_when_cancelled_then_wait_does_not_block_on_child(temp: TempDir) {
    // Arrange: sh forks `sleep`, which inherits the output pipes
    let service = shell_server("sleep 8; echo done");
    let out = Captured::default();
    let handle = service
        .serve_static_to(temp.path(), 8000, Box::new(out.clone()), Box::new(io::sink()))
        .unwrap();
    let canceller = handle.canceller();
    let started = Instant::now();

    // Act
    let cancelling = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        canceller.cancel();
    });
    let exit = handle.wait().unwrap();
    cancelling.join().unwrap();

    // Assert
    assert!(exit.cancelled);
    assert!(
        started.elapsed() < Duration::from_secs(3),
        "wait took {:?}",
        started.elapsed()
    );
    assert_eq!(out.text(), "");
}

#[rstest]
fn given_server_with_background_job_when_cancelled_then_job_stopped(temp: TempDir) {
    // Arrange: the background job would leave a marker after one second
    let service = shell_server("(sleep 1; touch finished) & wait");
    let handle = service
        .serve_static_to(temp.path(), 8000, Box::new(io::sink()), Box::new(io::sink()))
        .unwrap();
    let canceller = handle.canceller();

    // Act
    let cancelling = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        canceller.cancel();
    });
    let exit = handle.wait().unwrap();
    cancelling.join().unwrap();
    thread::sleep(Duration::from_millis(1500));

    // Assert
    assert!(exit.cancelled);
    assert!(!temp.path().join("finished").exists());
}

#[rstest]
fn given_missing_server_when_serving_then_program_not_found(temp: TempDir) {
    let settings = Settings {
        server: vec!["elm-emaki-no-such-server".into()],
        ..Settings::default()
    };
    let service = ServeService::new(Arc::new(RealCommandRunner), Arc::new(settings));

    let result = service.serve_static_to(
        temp.path(),
        8000,
        Box::new(io::sink()),
        Box::new(io::sink()),
    );

    assert!(matches!(
        result,
        Err(ApplicationError::ProgramNotFound { .. })
    ));
}
