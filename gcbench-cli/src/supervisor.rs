//! JVM Process Supervisor
//!
//! Launches one isolated JVM per run descriptor, captures its diagnostic
//! output and enforces the per-run timeout. The child lives in its own process
//! group so that a timeout terminates everything it started.

use gcbench_core::{Artifact, ArtifactKind, FailureKind, RunDescriptor};
use std::io::Read;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Interval between liveness checks of a running child
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Failures that prevent a run from being executed at all
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The launcher could not be started
    #[error("Failed to spawn JVM: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// stdout or stderr could not be drained
    #[error("Failed to capture JVM output: {0}")]
    OutputCapture(String),

    /// The run log directory could not be prepared
    #[error("Failed to prepare run directory: {0}")]
    WorkDir(#[source] std::io::Error),

    /// Polling the child failed
    #[error("Failed to wait for JVM: {0}")]
    Wait(#[source] std::io::Error),
}

/// How the child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// Exit status 0
    Success,
    /// Non-zero exit status
    Code(i32),
    /// Terminated by a signal it was not sent by us
    Signal(i32),
    /// Killed after exceeding the timeout
    TimedOut,
}

impl RunExit {
    /// Whether the child exited with status 0
    pub fn is_success(self) -> bool {
        matches!(self, RunExit::Success)
    }

    /// Failure category and message of an unsuccessful exit
    pub fn failure(self, timeout: Duration) -> Option<(FailureKind, String)> {
        match self {
            RunExit::Success => None,
            RunExit::Code(code) => Some((FailureKind::Exit, format!("JVM exited with status {}", code))),
            RunExit::Signal(signal) => Some((
                FailureKind::Signal,
                format!("JVM terminated by signal {}", signal),
            )),
            RunExit::TimedOut => Some((
                FailureKind::Timeout,
                format!("JVM exceeded the {:?} timeout and was killed", timeout),
            )),
        }
    }

    fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            RunExit::Success
        } else if let Some(code) = status.code() {
            RunExit::Code(code)
        } else {
            RunExit::Signal(status.signal().unwrap_or(0))
        }
    }
}

/// Captured result of one child process
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// stdout, stderr and GC log contents, in that order
    pub diagnostics: String,
    /// How the child ended
    pub exit: RunExit,
    /// Wall time from spawn to reap
    pub elapsed: Duration,
    /// Launched command, for the orchestration log
    pub command_line: String,
}

/// Executes a single run descriptor. Implementations must run at most one
/// child at a time and fully reap it before returning.
pub trait RunExecutor: Send + Sync {
    /// Run `artifact` under `descriptor`. `Err` aborts the whole orchestration;
    /// an unsuccessful JVM is reported through `RunOutput::exit`.
    fn execute(
        &self,
        descriptor: &RunDescriptor,
        artifact: &Artifact,
    ) -> Result<RunOutput, SupervisorError>;

    /// Per-run timeout, used in failure messages
    fn timeout(&self) -> Duration;
}

/// Process runner options
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// JVM launcher
    pub java: PathBuf,
    /// Options placed before the generated flags
    pub jvm_options: Vec<String>,
    /// Per-run timeout
    pub timeout: Duration,
    /// SIGTERM to SIGKILL window
    pub terminate_grace: Duration,
    /// Directory for per-run GC logs
    pub work_dir: PathBuf,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            java: PathBuf::from("java"),
            jvm_options: Vec::new(),
            timeout: Duration::from_secs(300),
            terminate_grace: Duration::from_millis(500),
            work_dir: PathBuf::from("target/gcbench/runs"),
        }
    }
}

/// Send `signal` to the process group led by `pid`
fn signal_group(pid: u32, signal: libc::c_int) -> Result<(), std::io::Error> {
    let ret = unsafe { libc::kill(-(pid as libc::pid_t), signal) };
    if ret == -1 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Owns a spawned child; kills and reaps it on every exit path
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }

    fn try_wait(&mut self) -> Result<Option<ExitStatus>, SupervisorError> {
        let status = self.child.try_wait().map_err(SupervisorError::Wait)?;
        if status.is_some() {
            self.reaped = true;
        }
        Ok(status)
    }

    /// SIGTERM, wait up to `grace`, then SIGKILL and reap
    fn terminate(&mut self, grace: Duration) {
        // Ignore error: the group may already be gone
        let _ = signal_group(self.child.id(), libc::SIGTERM);

        let deadline = Instant::now() + grace;
        while Instant::now() < deadline {
            match self.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) => std::thread::sleep(POLL_INTERVAL),
                Err(_) => break,
            }
        }

        // Stragglers in the group are killed even when the leader exited
        let _ = signal_group(self.child.id(), libc::SIGKILL);
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
            self.reaped = true;
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        // Descendants may outlive the leader and still hold the output pipes
        let _ = signal_group(self.child.id(), libc::SIGKILL);
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut stream: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn join_reader(
    reader: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    name: &str,
) -> Result<String, SupervisorError> {
    let Some(reader) = reader else {
        return Ok(String::new());
    };
    let bytes = reader
        .join()
        .map_err(|_| SupervisorError::OutputCapture(format!("{} reader panicked", name)))?
        .map_err(|e| SupervisorError::OutputCapture(format!("{}: {}", name, e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn push_section(diagnostics: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !diagnostics.is_empty() && !diagnostics.ends_with('\n') {
        diagnostics.push('\n');
    }
    diagnostics.push_str(text);
}

/// Runs the target artifact in a fresh JVM per descriptor
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    options: RunnerOptions,
}

impl ProcessRunner {
    /// Runner with the given options
    pub fn new(options: RunnerOptions) -> Self {
        Self { options }
    }

    /// Options this runner launches with
    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// GC log location for `descriptor`
    pub fn log_path(&self, descriptor: &RunDescriptor) -> PathBuf {
        self.options.work_dir.join(format!(
            "run-{:04}-{}-{}m-{}m-{}.log",
            descriptor.sequence,
            descriptor.collector.name().to_lowercase(),
            descriptor.heap.init_mb,
            descriptor.heap.max_mb,
            descriptor.repetition,
        ))
    }

    /// Launcher arguments for one run
    pub fn arguments(
        &self,
        descriptor: &RunDescriptor,
        artifact: &Artifact,
        log_path: &Path,
    ) -> Vec<String> {
        let mut args = self.options.jvm_options.clone();
        args.push(descriptor.collector.jvm_flag().to_string());
        args.push(format!("-Xms{}m", descriptor.heap.init_mb));
        args.push(format!("-Xmx{}m", descriptor.heap.max_mb));
        args.push(format!(
            "-Xlog:gc*:file={}:uptime,level,tags",
            log_path.display()
        ));

        match artifact.kind() {
            ArtifactKind::Jar => {
                args.push("-jar".to_string());
                args.push(artifact.path().display().to_string());
            }
            ArtifactKind::Class => {
                args.push("-cp".to_string());
                args.push(artifact.class_dir().display().to_string());
                if let Some(class_name) = artifact.class_name() {
                    args.push(class_name);
                }
            }
        }
        args
    }

    /// Run one descriptor to completion or timeout
    pub fn run(
        &self,
        descriptor: &RunDescriptor,
        artifact: &Artifact,
    ) -> Result<RunOutput, SupervisorError> {
        std::fs::create_dir_all(&self.options.work_dir).map_err(SupervisorError::WorkDir)?;
        let log_path = self.log_path(descriptor);
        if log_path.exists() {
            std::fs::remove_file(&log_path).map_err(SupervisorError::WorkDir)?;
        }

        let args = self.arguments(descriptor, artifact, &log_path);
        let command_line = std::iter::once(self.options.java.display().to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!("Launching: {}", command_line);

        let mut command = Command::new(&self.options.java);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0);

        let start = Instant::now();
        let mut child = command.spawn().map_err(SupervisorError::SpawnFailed)?;
        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);
        let mut guard = ChildGuard::new(child);

        let exit = loop {
            if let Some(status) = guard.try_wait()? {
                break RunExit::from_status(status);
            }
            if start.elapsed() >= self.options.timeout {
                tracing::warn!(
                    "{} exceeded {:?}, terminating",
                    descriptor,
                    self.options.timeout
                );
                guard.terminate(self.options.terminate_grace);
                break RunExit::TimedOut;
            }
            std::thread::sleep(POLL_INTERVAL);
        };
        let elapsed = start.elapsed();
        drop(guard);

        let stdout = join_reader(stdout, "stdout")?;
        let stderr = join_reader(stderr, "stderr")?;
        let gc_log = match std::fs::read(&log_path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => String::new(),
        };

        let mut diagnostics = String::with_capacity(stdout.len() + stderr.len() + gc_log.len() + 2);
        push_section(&mut diagnostics, &stdout);
        push_section(&mut diagnostics, &stderr);
        push_section(&mut diagnostics, &gc_log);

        Ok(RunOutput {
            diagnostics,
            exit,
            elapsed,
            command_line,
        })
    }
}

impl RunExecutor for ProcessRunner {
    fn execute(
        &self,
        descriptor: &RunDescriptor,
        artifact: &Artifact,
    ) -> Result<RunOutput, SupervisorError> {
        self.run(descriptor, artifact)
    }

    fn timeout(&self) -> Duration {
        self.options.timeout
    }
}
