//! Test doubles shared by the unit tests in this crate.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::runner::{Captured, CommandOutcome, CommandRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Run,
    Capture,
    Stream,
    Detached,
}

#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub mode: Mode,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Call {
    pub fn line(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

struct Rule {
    needle: String,
    outcome: CommandOutcome,
    stdout: String,
    stderr: String,
    creates: Option<PathBuf>,
}

/// Records every call and answers from scripted rules.
///
/// The first rule whose needle appears in the command line wins. Unmatched
/// commands succeed.
#[derive(Default)]
pub(crate) struct FakeRunner {
    rules: Vec<Rule>,
    calls: RefCell<Vec<Call>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, needle: &str, outcome: CommandOutcome) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            outcome,
            stdout: String::new(),
            stderr: String::new(),
            creates: None,
        });
        self
    }

    /// Succeed and write an empty file at `path`, standing in for an install.
    pub fn on_creating(mut self, needle: &str, path: &Path) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            outcome: CommandOutcome::Success,
            stdout: String::new(),
            stderr: String::new(),
            creates: Some(path.to_path_buf()),
        });
        self
    }

    pub fn on_output(mut self, needle: &str, stdout: &str, stderr: &str) -> Self {
        self.rules.push(Rule {
            needle: needle.to_string(),
            outcome: CommandOutcome::Success,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            creates: None,
        });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(Call::line).collect()
    }

    fn respond(&self, mode: Mode, program: &Path, args: &[String]) -> Captured {
        let call = Call {
            mode,
            program: program.to_path_buf(),
            args: args.to_vec(),
        };
        let line = call.line();
        self.calls.borrow_mut().push(call);

        let Some(rule) = self.rules.iter().find(|r| line.contains(&r.needle)) else {
            return Captured::failed(CommandOutcome::Success);
        };
        if let Some(path) = &rule.creates {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, "").unwrap();
        }
        Captured {
            outcome: rule.outcome.clone(),
            stdout: rule.stdout.clone(),
            stderr: rule.stderr.clone(),
        }
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &Path, args: &[String]) -> CommandOutcome {
        self.respond(Mode::Run, program, args).outcome
    }

    fn capture(&self, program: &Path, args: &[String]) -> Captured {
        self.respond(Mode::Capture, program, args)
    }

    fn stream(&self, program: &Path, args: &[String]) -> CommandOutcome {
        self.respond(Mode::Stream, program, args).outcome
    }

    fn spawn_detached(&self, program: &Path, args: &[String]) -> CommandOutcome {
        self.respond(Mode::Detached, program, args).outcome
    }
}

/// Write an executable `#!/bin/sh` script at `dir/name`.
pub(crate) fn write_executable(dir: &Path, name: &str, body: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    path
}
