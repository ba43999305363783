//! Best-effort side effects: version probes and the sound cue.
//!
//! Nothing here returns an error. Failures are logged at debug level and
//! turned into `None` / `false`, so they can never change an exit code.

use std::path::Path;

use crate::runner::{CommandOutcome, CommandRunner};

/// Run `f`, keeping its value on success and logging anything else.
pub fn best_effort<T, E: std::fmt::Display>(
    label: &str,
    f: impl FnOnce() -> std::result::Result<T, E>,
) -> Option<T> {
    match f() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("{label} skipped: {e}");
            None
        }
    }
}

/// `<program> --version`, trimmed stdout. `None` on any failure or empty output.
pub fn tool_version<R: CommandRunner>(runner: &R, program: &Path) -> Option<String> {
    best_effort("version probe", || {
        let captured = runner.capture(program, &["--version".to_string()]);
        match captured.outcome {
            CommandOutcome::Success => non_empty(captured.stdout.trim())
                .ok_or_else(|| "no version output".to_string()),
            other => Err(format!("{other:?}")),
        }
    })
}

/// `java -version` style probe: first line of stderr, else of stdout.
pub fn runtime_version<R: CommandRunner>(runner: &R, program: &Path) -> Option<String> {
    best_effort("runtime probe", || {
        let captured = runner.capture(program, &["-version".to_string()]);
        if let CommandOutcome::EnvironmentFailure(reason) = captured.outcome {
            return Err(reason);
        }
        let text = if captured.stderr.trim().is_empty() {
            captured.stdout
        } else {
            captured.stderr
        };
        text.lines()
            .next()
            .and_then(|l| non_empty(l.trim()))
            .ok_or_else(|| "no version output".to_string())
    })
}

/// Fire the sound-cue script with `dir` as its only argument.
///
/// Returns whether the script was started.
pub fn sound_cue<R: CommandRunner>(runner: &R, script: &Path, dir: &str) -> bool {
    best_effort("sound cue", || {
        match runner.spawn_detached(script, &[dir.to_string()]) {
            CommandOutcome::Success => Ok(()),
            other => Err(format!("{other:?}")),
        }
    })
    .is_some()
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
