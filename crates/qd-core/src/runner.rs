//! Subprocess invocation with uniform outcome classification.
//!
//! Every external call the crate makes goes through [`CommandRunner`], so
//! installers, version probes, the compiler, and the notifier all report the
//! same three-way [`CommandOutcome`].
//!
//! # Variants
//! - `run`:            inherit stdio, block until exit
//! - `capture`:        pipe stdout/stderr, block until exit
//! - `stream`:         inherit stdio, block until exit or Ctrl+C (interrupt is success)
//! - `spawn_detached`: start and forget; only a failure to start is reported

use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use crate::error::{QdError, Result};

/// Exit code of a process terminated by SIGINT.
#[cfg(unix)]
const SIGINT: i32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    /// The process ran and exited non-zero. Signals map to `128 + signo`.
    ToolFailure(i32),
    /// The process could not be started, or a prerequisite is missing.
    EnvironmentFailure(String),
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success)
    }

    /// Convert to a `Result`, naming `tool` in a tool failure.
    pub fn into_result(self, tool: &str) -> Result<()> {
        match self {
            CommandOutcome::Success => Ok(()),
            CommandOutcome::ToolFailure(code) => Err(QdError::ToolFailed {
                tool: tool.to_string(),
                code,
            }),
            CommandOutcome::EnvironmentFailure(reason) => Err(QdError::Environment(reason)),
        }
    }

    fn from_status(status: ExitStatus) -> Self {
        if status.success() {
            return CommandOutcome::Success;
        }
        if let Some(code) = status.code() {
            return CommandOutcome::ToolFailure(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return CommandOutcome::ToolFailure(128 + signal);
            }
        }
        CommandOutcome::ToolFailure(-1)
    }

    fn spawn_failure(program: &Path, err: &std::io::Error) -> Self {
        let reason = match err.kind() {
            std::io::ErrorKind::NotFound => format!("{} not found", program.display()),
            std::io::ErrorKind::PermissionDenied => {
                format!("permission denied running {}", program.display())
            }
            _ => format!("failed to start {}: {err}", program.display()),
        };
        CommandOutcome::EnvironmentFailure(reason)
    }
}

/// Output of a [`CommandRunner::capture`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub outcome: CommandOutcome,
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    pub fn failed(outcome: CommandOutcome) -> Self {
        Self {
            outcome,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

pub trait CommandRunner {
    fn run(&self, program: &Path, args: &[String]) -> CommandOutcome;

    fn capture(&self, program: &Path, args: &[String]) -> Captured;

    /// Like `run`, but a user interrupt ends the call with `Success`.
    fn stream(&self, program: &Path, args: &[String]) -> CommandOutcome;

    fn spawn_detached(&self, program: &Path, args: &[String]) -> CommandOutcome;

    /// Run a shell snippet through `sh -c` with inherited stdio.
    fn run_shell(&self, script: &str) -> CommandOutcome {
        self.run(Path::new("sh"), &["-c".to_string(), script.to_string()])
    }
}

/// Runs real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[String]) -> CommandOutcome {
        tracing::debug!(program = %program.display(), ?args, "run");
        match Command::new(program).args(args).status() {
            Ok(status) => CommandOutcome::from_status(status),
            Err(e) => CommandOutcome::spawn_failure(program, &e),
        }
    }

    fn capture(&self, program: &Path, args: &[String]) -> Captured {
        tracing::debug!(program = %program.display(), ?args, "capture");
        let output = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(e) => return Captured::failed(CommandOutcome::spawn_failure(program, &e)),
        };
        Captured {
            outcome: CommandOutcome::from_status(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    fn stream(&self, program: &Path, args: &[String]) -> CommandOutcome {
        tracing::debug!(program = %program.display(), ?args, "stream");
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                tracing::warn!("no async runtime for interrupt handling ({e}); running plainly");
                return self.run(program, args);
            }
        };
        rt.block_on(stream_until_exit_or_interrupt(program, args))
    }

    fn spawn_detached(&self, program: &Path, args: &[String]) -> CommandOutcome {
        tracing::debug!(program = %program.display(), ?args, "spawn detached");
        match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(_child) => CommandOutcome::Success,
            Err(e) => CommandOutcome::spawn_failure(program, &e),
        }
    }
}

async fn stream_until_exit_or_interrupt(program: &Path, args: &[String]) -> CommandOutcome {
    let mut child = match tokio::process::Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return CommandOutcome::spawn_failure(program, &e),
    };

    let exited = tokio::select! {
        status = child.wait() => Some(status),
        _ = interrupted() => None,
    };

    match exited {
        Some(Ok(status)) => classify_streamed(status),
        Some(Err(e)) => CommandOutcome::EnvironmentFailure(format!(
            "lost track of {}: {e}",
            program.display()
        )),
        None => {
            // The child is in our process group and saw the same SIGINT.
            let _ = child.kill().await;
            tracing::info!(program = %program.display(), "stopped by user");
            CommandOutcome::Success
        }
    }
}

/// Resolves on Ctrl+C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn classify_streamed(status: ExitStatus) -> CommandOutcome {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if status.signal() == Some(SIGINT) {
            return CommandOutcome::Success;
        }
    }
    CommandOutcome::from_status(status)
}
