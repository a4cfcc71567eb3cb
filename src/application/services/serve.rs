//! Serve invoker: runs the static file server over the build artifact.
//!
//! The server is a child process whose stdout and stderr are relayed to the
//! caller's sinks by one thread per stream. [`ServeHandle::wait`] blocks
//! until the child exits or is cancelled through a [`Canceller`].

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ExitStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::application::services::build::{spawn_error, BuildService};
use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{CommandSpec, ARTIFACT_DIR};
use crate::infrastructure::traits::CommandRunner;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const RELAY_POLL_INTERVAL: Duration = Duration::from_millis(20);
const RELAY_GRACE: Duration = Duration::from_secs(2);

/// Destination for a relayed stream.
pub type Sink = Box<dyn Write + Send>;

/// Starts `<server> -p <port> output` in the project root.
pub struct ServeService {
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
}

impl ServeService {
    /// Create a new serve service.
    pub fn new(cmd: Arc<dyn CommandRunner>, settings: Arc<Settings>) -> Self {
        Self { cmd, settings }
    }

    /// Full server invocation for `port`, program first.
    pub fn command(&self, port: u16) -> ApplicationResult<CommandSpec> {
        let server = self.settings.server_command()?;
        Ok(server.with_args(["-p".to_string(), port.to_string(), ARTIFACT_DIR.to_string()]))
    }

    /// Start the server, relaying its output to this process's stdout and stderr.
    pub fn serve_static(&self, root: &Path, port: u16) -> ApplicationResult<ServeHandle> {
        self.serve_static_to(root, port, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Start the server, relaying its output to the given sinks.
    pub fn serve_static_to(
        &self,
        root: &Path,
        port: u16,
        stdout: Sink,
        stderr: Sink,
    ) -> ApplicationResult<ServeHandle> {
        let command = self.command(port)?;
        debug!("serve_static: root={}, command={}", root.display(), command);

        let mut child = self
            .cmd
            .spawn_piped(root, &command.program, &command.arg_refs())
            .map_err(|e| spawn_error(&command, root, e))?;
        info!("serving {} on port {}", root.join(ARTIFACT_DIR).display(), port);

        let relays = match start_relays(&mut child, stdout, stderr) {
            Ok(relays) => relays,
            Err(e) => {
                terminate(&mut child);
                if let Err(reap) = child.wait() {
                    debug!("serve_static: reap after relay failure: {}", reap);
                }
                return Err(e).with_path_context("relay output of", root);
            }
        };

        Ok(ServeHandle {
            child,
            relays,
            cancelled: Arc::new(AtomicBool::new(false)),
            command,
            root: root.to_path_buf(),
        })
    }
}

/// Compile the project, then start the file server.
///
/// A failed build returns before the server is spawned.
pub fn build_and_serve(
    build: &BuildService,
    serve: &ServeService,
    root: &Path,
    port: u16,
) -> ApplicationResult<ServeHandle> {
    build.build(root)?;
    serve.serve_static(root, port)
}

fn start_relays(
    child: &mut Child,
    stdout: Sink,
    stderr: Sink,
) -> io::Result<Vec<JoinHandle<io::Result<u64>>>> {
    let mut relays = Vec::with_capacity(2);
    if let Some(pipe) = child.stdout.take() {
        relays.push(relay("relay-stdout", pipe, stdout)?);
    }
    if let Some(pipe) = child.stderr.take() {
        relays.push(relay("relay-stderr", pipe, stderr)?);
    }
    Ok(relays)
}

/// Stop the server and everything it started.
///
/// The server leads its own process group (see `CommandRunner::spawn_piped`),
/// so the whole group gets SIGTERM before the direct child is killed.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        let pgid = child.id() as libc::pid_t;
        // SAFETY: killpg only sends a signal; the group id is our unreaped child's pid
        if unsafe { libc::killpg(pgid, libc::SIGTERM) } != 0 {
            debug!("terminate: killpg {}: {}", pgid, io::Error::last_os_error());
        }
    }
    if let Err(e) = child.kill() {
        // already exited
        debug!("terminate: kill: {}", e);
    }
}

fn relay<R>(name: &str, mut pipe: R, mut sink: Sink) -> io::Result<JoinHandle<io::Result<u64>>>
where
    R: Read + Send + 'static,
{
    thread::Builder::new().name(name.to_string()).spawn(move || {
        let copied = io::copy(&mut pipe, &mut sink)?;
        sink.flush()?;
        Ok(copied)
    })
}

/// Requests termination of a running server; cheap to clone across threads.
#[derive(Debug, Clone)]
pub struct Canceller {
    flag: Arc<AtomicBool>,
}

impl Canceller {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// How the server ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServeExit {
    pub status: ExitStatus,
    /// True if the server was stopped through a [`Canceller`].
    pub cancelled: bool,
}

impl ServeExit {
    /// Stopped on request, or exited cleanly on its own.
    pub fn is_clean(&self) -> bool {
        self.cancelled || self.status.success()
    }
}

/// Running file server.
pub struct ServeHandle {
    child: Child,
    relays: Vec<JoinHandle<io::Result<u64>>>,
    cancelled: Arc<AtomicBool>,
    command: CommandSpec,
    root: PathBuf,
}

impl ServeHandle {
    pub fn canceller(&self) -> Canceller {
        Canceller {
            flag: Arc::clone(&self.cancelled),
        }
    }

    /// Stop the server and its process group; [`ServeHandle::wait`] then returns.
    pub fn cancel(&self) {
        self.canceller().cancel();
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    /// Block until the server exits or is cancelled, then drain the relays.
    pub fn wait(mut self) -> ApplicationResult<ServeExit> {
        let cancelled = loop {
            if self.cancelled.load(Ordering::SeqCst) {
                debug!("wait: cancelling pid {}", self.child.id());
                terminate(&mut self.child);
                break true;
            }
            if self
                .child
                .try_wait()
                .with_path_context("wait for file server in", &self.root)?
                .is_some()
            {
                break false;
            }
            thread::sleep(POLL_INTERVAL);
        };

        let status = self
            .child
            .wait()
            .with_path_context("wait for file server in", &self.root)?;

        // a process that escaped the group may still hold the pipes
        let deadline = cancelled.then(|| Instant::now() + RELAY_GRACE);
        for handle in self.relays.drain(..) {
            if let Some(deadline) = deadline {
                while !handle.is_finished() && Instant::now() < deadline {
                    thread::sleep(RELAY_POLL_INTERVAL);
                }
                if !handle.is_finished() {
                    warn!(
                        "wait: {} still open after cancel, detaching",
                        handle.thread().name().unwrap_or("relay")
                    );
                    continue;
                }
            }
            let relayed = handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("relay thread panicked")));
            match relayed {
                Ok(bytes) => debug!("wait: relayed {} bytes", bytes),
                Err(e) => debug!("wait: relay ended: {}", e),
            }
        }

        debug!("wait: {} exited with {}", self.command, status);
        Ok(ServeExit { status, cancelled })
    }
}
