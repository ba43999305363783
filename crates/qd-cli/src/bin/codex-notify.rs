//! Codex `notify` hook: turn one JSON event into a desktop notification.
//!
//! Configure Codex with `notify = ["codex-notify"]`; Codex appends the event
//! payload as the single argument.

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use qd_core::config::{Config, CONFIG_ENV};
use qd_core::notify::{self, Dispatcher, NotificationEvent, Route};
use qd_core::runner::SystemRunner;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "codex-notify",
    about = "Route a Codex notification event to terminal-notifier",
    version
)]
struct Cli {
    /// Notification event as a JSON object
    #[arg(value_name = "NOTIFICATION_JSON")]
    payload: String,

    /// Config file (default: ~/.config/qd-tools/config.yaml when present)
    #[arg(long, env = CONFIG_ENV)]
    config: Option<PathBuf>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => {
            println!("{}", Cli::command().render_usage());
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    // Parse before anything else so a bad payload never reaches routing.
    let event = NotificationEvent::parse(&cli.payload)?;
    let route = notify::classify(&event);
    if let Route::Suppress { kind } = &route {
        // Config only matters when something is sent.
        println!("{}", notify::suppressed_notice(kind.as_deref()));
        return Ok(());
    }
    let config = Config::load(cli.config.as_deref()).context("failed to load config")?;
    Dispatcher::new(&SystemRunner, &config.notify).perform(&route)?;
    Ok(())
}
