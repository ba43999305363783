//! Ordered, per-platform installation of the external compiler.
//!
//! Each platform gets a list of [`InstallStrategy`] values evaluated in
//! priority order by [`InstallChain::install_with`]. A strategy that fails at
//! any step is abandoned and the next one is tried. A strategy that claims
//! success only counts once the locator can actually find the tool.

use std::path::PathBuf;

use crate::config::{expand_home, InstallConfig};
use crate::locator::Locator;
use crate::platform::PlatformFamily;
use crate::runner::{CommandOutcome, CommandRunner};

/// A package manager (or similar) a strategy needs before it can act.
#[derive(Debug, Clone)]
pub struct Companion {
    pub program: String,
    /// Checked after the search path.
    pub known_paths: Vec<PathBuf>,
    /// Shell snippet that installs the companion itself. Run at most once.
    pub bootstrap: Option<String>,
    /// Shown when the companion is missing and cannot be bootstrapped.
    pub missing_hint: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Action {
    /// One companion invocation per entry, in order.
    Companion(Vec<Vec<String>>),
    /// A shell snippet run through `sh -c`.
    Shell(String),
}

#[derive(Debug, Clone)]
pub struct InstallStrategy {
    pub name: &'static str,
    pub requires: Option<Companion>,
    pub action: Action,
}

/// The strategies for `platform`, highest priority first.
pub fn strategies_for(platform: PlatformFamily, cfg: &InstallConfig) -> Vec<InstallStrategy> {
    match platform {
        PlatformFamily::MacOs => vec![homebrew(cfg, true), install_script(cfg)],
        PlatformFamily::Linux => vec![homebrew(cfg, false), install_script(cfg)],
        PlatformFamily::Windows => vec![scoop(cfg)],
        PlatformFamily::Unsupported => Vec::new(),
    }
}

fn homebrew(cfg: &InstallConfig, bootstrap: bool) -> InstallStrategy {
    InstallStrategy {
        name: "Homebrew",
        requires: Some(Companion {
            program: "brew".to_string(),
            known_paths: cfg
                .brew_known_paths
                .iter()
                .filter_map(|p| expand_home(p))
                .collect(),
            bootstrap: bootstrap.then(|| cfg.brew_bootstrap.clone()),
            missing_hint: None,
        }),
        action: Action::Companion(vec![vec![
            "install".to_string(),
            cfg.brew_formula.clone(),
        ]]),
    }
}

fn install_script(cfg: &InstallConfig) -> InstallStrategy {
    InstallStrategy {
        name: "install script",
        requires: None,
        action: Action::Shell(cfg.install_script.clone()),
    }
}

fn scoop(cfg: &InstallConfig) -> InstallStrategy {
    let mut steps: Vec<Vec<String>> = cfg
        .scoop_buckets
        .iter()
        .map(|bucket| {
            let mut args = vec!["bucket".to_string(), "add".to_string(), bucket.name.clone()];
            args.extend(bucket.url.clone());
            args
        })
        .collect();
    steps.push(vec!["install".to_string(), cfg.scoop_package.clone()]);

    InstallStrategy {
        name: "Scoop",
        requires: Some(Companion {
            program: "scoop".to_string(),
            known_paths: Vec::new(),
            bootstrap: None,
            missing_hint: Some(
                "Scoop not found. Please install Scoop first:\n  \
                 Set-ExecutionPolicy RemoteSigned -Scope CurrentUser\n  \
                 irm get.scoop.sh | iex"
                    .to_string(),
            ),
        }),
        action: Action::Companion(steps),
    }
}

pub struct InstallChain<'a, R: CommandRunner> {
    locator: &'a Locator,
    runner: &'a R,
    config: &'a InstallConfig,
}

impl<'a, R: CommandRunner> InstallChain<'a, R> {
    pub fn new(locator: &'a Locator, runner: &'a R, config: &'a InstallConfig) -> Self {
        Self {
            locator,
            runner,
            config,
        }
    }

    pub fn install(&self, platform: PlatformFamily) -> CommandOutcome {
        if platform == PlatformFamily::Unsupported {
            return CommandOutcome::EnvironmentFailure("unsupported platform".to_string());
        }
        println!("Detected {platform}. Installing {}...", self.locator.tool_name());
        self.install_with(&strategies_for(platform, self.config))
    }

    /// Try each strategy until one yields a discoverable tool.
    pub fn install_with(&self, strategies: &[InstallStrategy]) -> CommandOutcome {
        let mut failures = Vec::new();
        for strategy in strategies {
            let outcome = self.attempt(strategy);
            if outcome.is_success() {
                return outcome;
            }
            tracing::warn!(strategy = strategy.name, ?outcome, "install strategy failed");
            failures.push((strategy.name, outcome));
        }
        CommandOutcome::EnvironmentFailure(self.exhausted(&failures))
    }

    fn attempt(&self, strategy: &InstallStrategy) -> CommandOutcome {
        let companion = match &strategy.requires {
            Some(c) => match self.resolve_companion(c) {
                Ok(path) => Some(path),
                Err(outcome) => {
                    tracing::info!(
                        strategy = strategy.name,
                        program = %c.program,
                        "skipping install strategy"
                    );
                    return outcome;
                }
            },
            None => None,
        };
        println!("Installing via {}...", strategy.name);

        let outcome = match (&strategy.action, companion) {
            (Action::Companion(steps), Some(program)) => {
                let failed = steps
                    .iter()
                    .map(|args| self.runner.run(&program, args))
                    .find(|o| !o.is_success());
                failed.unwrap_or(CommandOutcome::Success)
            }
            (Action::Companion(_), None) => CommandOutcome::EnvironmentFailure(format!(
                "{} strategy has no companion program",
                strategy.name
            )),
            (Action::Shell(script), _) => {
                println!("Note: this may require sudo privileges.");
                self.runner.run_shell(script)
            }
        };
        if !outcome.is_success() {
            return outcome;
        }

        match self.locator.locate() {
            Some(handle) => {
                println!("{} installed at: {handle}", self.locator.tool_name());
                CommandOutcome::Success
            }
            None => CommandOutcome::EnvironmentFailure(format!(
                "{} finished but {} is still not discoverable",
                strategy.name,
                self.locator.tool_name()
            )),
        }
    }

    fn resolve_companion(&self, c: &Companion) -> Result<PathBuf, CommandOutcome> {
        if let Some(path) = self.locator.find_program(&c.program, &c.known_paths) {
            return Ok(path);
        }

        let Some(bootstrap) = &c.bootstrap else {
            let reason = c
                .missing_hint
                .clone()
                .unwrap_or_else(|| format!("{} not found", c.program));
            return Err(CommandOutcome::EnvironmentFailure(reason));
        };

        println!("{} not found. Installing it first...", c.program);
        let outcome = self.runner.run_shell(bootstrap);
        if !outcome.is_success() {
            return Err(outcome);
        }
        self.locator
            .find_program(&c.program, &c.known_paths)
            .ok_or_else(|| {
                CommandOutcome::EnvironmentFailure(format!(
                    "{} still not found after bootstrap",
                    c.program
                ))
            })
    }

    fn exhausted(&self, failures: &[(&str, CommandOutcome)]) -> String {
        let mut reason = format!("could not install {}", self.locator.tool_name());
        for (name, outcome) in failures {
            let detail = match outcome {
                CommandOutcome::ToolFailure(code) => format!("exited with status {code}"),
                CommandOutcome::EnvironmentFailure(why) => why.clone(),
                CommandOutcome::Success => "succeeded".to_string(),
            };
            reason.push_str(&format!("\n  {name}: {detail}"));
        }
        reason.push_str(&format!(
            "\n\nManual installation:\n  \
             1. Download from: {}\n  \
             2. Unzip and add bin/ to PATH",
            self.config.manual_url
        ));
        reason
    }
}
