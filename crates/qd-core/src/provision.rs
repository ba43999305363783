//! High-level operations behind the `qd` CLI.
//!
//! [`Provisioner`] ties together the locator, the install chain, and the
//! command runner. The tool location is looked up fresh by each operation
//! and handed along explicitly; nothing is cached between calls.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::error::{QdError, Result};
use crate::install::InstallChain;
use crate::locator::{Locator, ToolHandle};
use crate::platform::PlatformFamily;
use crate::probe;
use crate::runner::CommandRunner;

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

/// Yes/no question whose default answer is "yes".
pub trait Confirm {
    fn confirm(&self, question: &str) -> bool;
}

/// Asks on stdout, reads one line from stdin. EOF or a read error is "no".
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, question: &str) -> bool {
        print!("{question} [Y/n]: ");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => false,
            Ok(_) => parse_answer(&line),
        }
    }
}

/// Empty input, `y`, and `yes` (any case) accept.
pub fn parse_answer(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "" | "y" | "yes")
}

// ---------------------------------------------------------------------------
// Status types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStatus {
    pub tool: String,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
}

impl ToolStatus {
    pub fn is_installed(&self) -> bool {
        self.path.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeStatus {
    pub runtime: String,
    pub path: Option<PathBuf>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    Pdf,
}

impl ExportTarget {
    fn flag(&self) -> &'static str {
        match self {
            ExportTarget::Pdf => "--pdf",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ExportTarget::Pdf => "PDF",
        }
    }

    fn failure_hint(&self) -> &'static str {
        match self {
            ExportTarget::Pdf => {
                "Note: PDF export requires Node.js and Puppeteer.\n\
                 Install with: npm install -g puppeteer"
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Provisioner
// ---------------------------------------------------------------------------

pub struct Provisioner<'a, R: CommandRunner, C: Confirm> {
    config: &'a Config,
    locator: Locator,
    runner: R,
    confirm: C,
    platform: PlatformFamily,
}

impl<'a, R: CommandRunner, C: Confirm> Provisioner<'a, R, C> {
    pub fn new(
        config: &'a Config,
        locator: Locator,
        runner: R,
        confirm: C,
        platform: PlatformFamily,
    ) -> Self {
        Self {
            config,
            locator,
            runner,
            confirm,
            platform,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Report presence and version. Never installs.
    pub fn status(&self) -> ToolStatus {
        let handle = self.locator.locate();
        let version = handle
            .as_ref()
            .and_then(|h| probe::tool_version(&self.runner, h.path()));
        ToolStatus {
            tool: self.locator.tool_name().to_string(),
            path: handle.map(|h| h.path().to_path_buf()),
            version,
        }
    }

    /// Presence and version of the secondary runtime. Informational only.
    pub fn runtime_status(&self) -> RuntimeStatus {
        let runtime = &self.config.tool.runtime;
        let path = self.locator.find_program(runtime, &[]);
        let version = path
            .as_deref()
            .and_then(|p| probe::runtime_version(&self.runner, p));
        RuntimeStatus {
            runtime: runtime.clone(),
            path,
            version,
        }
    }

    /// Install without asking. Already-installed is success.
    pub fn install(&self) -> Result<ToolHandle> {
        if let Some(handle) = self.locator.locate() {
            println!(
                "{} already installed at: {handle}",
                self.locator.tool_name()
            );
            return Ok(handle);
        }
        self.run_install_chain()
    }

    /// Return the tool, offering to install it when missing.
    pub fn ensure_installed(&self) -> Result<ToolHandle> {
        if let Some(handle) = self.locator.locate() {
            return Ok(handle);
        }
        println!("{} is not installed.", self.locator.tool_name());
        if !self.confirm.confirm("Install now?") {
            return Err(QdError::Environment(format!(
                "{} not installed",
                self.locator.tool_name()
            )));
        }
        self.run_install_chain()
    }

    /// `<tool> c <file> -o <out_dir>`
    pub fn compile(&self, input: &Path, out_dir: &Path) -> Result<()> {
        let tool = self.ensure_installed()?;
        let input = self.checked_input(input, true)?;

        println!("Compiling: {}", input.display());
        let args = vec![
            "c".to_string(),
            input.display().to_string(),
            "-o".to_string(),
            out_dir.display().to_string(),
        ];
        self.runner
            .stream(tool.path(), &args)
            .into_result(self.locator.tool_name())?;
        println!("Output saved to: {}", out_dir.display());
        Ok(())
    }

    /// `<tool> c <file> -p -w`, until the user interrupts it.
    pub fn preview(&self, input: &Path) -> Result<()> {
        let tool = self.ensure_installed()?;
        let input = self.checked_input(input, false)?;

        println!("Starting live preview: {}", input.display());
        println!("Press Ctrl+C to stop");
        let args = vec![
            "c".to_string(),
            input.display().to_string(),
            "-p".to_string(),
            "-w".to_string(),
        ];
        self.runner
            .stream(tool.path(), &args)
            .into_result(self.locator.tool_name())?;
        println!("\nPreview stopped.");
        Ok(())
    }

    /// `<tool> c <file> --pdf -o <out_dir>`
    pub fn export(&self, input: &Path, out_dir: &Path, target: ExportTarget) -> Result<()> {
        let tool = self.ensure_installed()?;
        let input = self.checked_input(input, true)?;

        println!("Exporting to {}: {}", target.name(), input.display());
        let args = vec![
            "c".to_string(),
            input.display().to_string(),
            target.flag().to_string(),
            "-o".to_string(),
            out_dir.display().to_string(),
        ];
        let result = self
            .runner
            .stream(tool.path(), &args)
            .into_result(self.locator.tool_name());
        if let Err(e) = result {
            if matches!(e, QdError::ToolFailed { .. }) {
                eprintln!("{}", target.failure_hint());
            }
            return Err(e);
        }
        println!("{} saved to: {}", target.name(), out_dir.display());
        Ok(())
    }

    fn run_install_chain(&self) -> Result<ToolHandle> {
        let tool = self.locator.tool_name();
        InstallChain::new(&self.locator, &self.runner, &self.config.install)
            .install(self.platform)
            .into_result(tool)?;
        self.locator
            .locate()
            .ok_or_else(|| QdError::Environment(format!("{tool} not found after install")))
    }

    /// The input must exist. An unexpected extension only warns.
    fn checked_input(&self, input: &Path, check_extension: bool) -> Result<PathBuf> {
        if !input.exists() {
            return Err(QdError::FileNotFound(input.to_path_buf()));
        }
        let input = std::fs::canonicalize(input)?;

        let expected = &self.config.tool.extension;
        if check_extension {
            let actual = input.extension().and_then(|e| e.to_str()).unwrap_or("");
            if actual != expected {
                tracing::warn!(file = %input.display(), "unexpected extension");
                eprintln!("Warning: Expected .{expected} file, got: .{actual}");
            }
        }
        Ok(input)
    }
}
