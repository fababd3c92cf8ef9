//! Bounded command execution.
//!
//! [`ProcessRunner`] spawns one external process with an argument vector (no
//! local shell), captures stderr, and enforces a hard wall-clock deadline
//! measured from invocation start. Nothing here returns an error: every
//! result is a [`CommandOutcome`] so a sweep never stops on one bad input.

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::task::JoinHandle;

/// How long to wait for a killed process to be reaped, and the most a
/// failed invocation waits for its stderr to drain.
const REAP_GRACE: Duration = Duration::from_millis(500);

/// Cap on captured stderr.
const MAX_STDERR_BYTES: usize = 64 * 1024;

/// An external program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Result of one bounded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Exited with status zero before the deadline.
    Success,
    /// The deadline passed; the process was killed.
    TimedOut,
    /// Exited non-zero, was killed by a signal, or could not be spawned.
    Failed { code: Option<i32>, stderr: String },
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success)
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Success => write!(f, "success"),
            CommandOutcome::TimedOut => write!(f, "timed out"),
            CommandOutcome::Failed { code, stderr } => {
                match code {
                    Some(code) => write!(f, "failed with exit code {}", code)?,
                    None => write!(f, "failed")?,
                }
                let stderr = stderr.trim();
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
        }
    }
}

/// Executes commands under a deadline.
///
/// Abstracted so the orchestrator can be driven by a scripted runner in tests.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> CommandOutcome;
}

/// Runner backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> CommandOutcome {
        let started = Instant::now();

        let mut child = match Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                return CommandOutcome::Failed {
                    code: None,
                    stderr: format!("failed to spawn '{}': {}", spec.program.display(), e),
                };
            }
        };

        let stderr_task = child.stderr.take().map(|pipe| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut limited = pipe.take(MAX_STDERR_BYTES as u64);
                let _ = limited.read_to_end(&mut buf).await;
                // Keep the pipe open past the cap so the child never sees EPIPE.
                let mut rest = limited.into_inner();
                let _ = tokio::io::copy(&mut rest, &mut tokio::io::sink()).await;
                buf
            })
        });

        let remaining = timeout.saturating_sub(started.elapsed());
        match tokio::time::timeout(remaining, child.wait()).await {
            Err(_) => {
                // SIGKILL cannot be ignored; the grace only bounds reaping.
                let _ = child.start_kill();
                let _ = tokio::time::timeout(REAP_GRACE, child.wait()).await;
                if let Some(task) = stderr_task {
                    task.abort();
                }
                CommandOutcome::TimedOut
            }
            Ok(Err(e)) => {
                if let Some(task) = stderr_task {
                    task.abort();
                }
                CommandOutcome::Failed {
                    code: None,
                    stderr: format!("failed to wait for '{}': {}", spec.program.display(), e),
                }
            }
            Ok(Ok(status)) if status.success() => {
                // Stderr is only reported on failure; a grandchild holding it
                // open must not push a success past the deadline.
                if let Some(task) = stderr_task {
                    task.abort();
                }
                if started.elapsed() > timeout {
                    CommandOutcome::TimedOut
                } else {
                    CommandOutcome::Success
                }
            }
            Ok(Ok(status)) => {
                let remaining = timeout.saturating_sub(started.elapsed());
                let stderr = collect_stderr(stderr_task, remaining.min(REAP_GRACE)).await;
                CommandOutcome::Failed {
                    code: status.code(),
                    stderr,
                }
            }
        }
    }
}

/// Stderr may stay open in a grandchild; never wait on it past `wait`.
async fn collect_stderr(task: Option<JoinHandle<Vec<u8>>>, wait: Duration) -> String {
    let Some(mut task) = task else {
        return String::new();
    };
    match tokio::time::timeout(wait, &mut task).await {
        Ok(Ok(buf)) => String::from_utf8_lossy(&buf).into_owned(),
        Ok(Err(_)) => String::new(),
        Err(_) => {
            task.abort();
            String::new()
        }
    }
}
