mod cmd;
mod output;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use qd_core::config::CONFIG_ENV;
use qd_core::scaffold::DocType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "qd",
    about = "Install, compile, preview, and export Quarkdown documents",
    version,
    propagate_version = true
)]
struct Cli {
    /// Config file (default: ~/.config/qd-tools/config.yaml when present)
    #[arg(long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install Quarkdown using the best strategy for this platform
    Install,

    /// Show installation status
    Status {
        /// Output as JSON
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Compile a .qd file
    Compile {
        file: PathBuf,
        #[arg(default_value = "./output")]
        output_dir: PathBuf,
    },

    /// Compile with live preview (watch mode + browser)
    Preview { file: PathBuf },

    /// Export a .qd file to PDF
    Pdf {
        file: PathBuf,
        #[arg(default_value = "./output")]
        output_dir: PathBuf,
    },

    /// Create a new project skeleton
    Create {
        name: String,
        /// plain, paged, slides, or docs
        #[arg(default_value_t = DocType::Paged)]
        doc_type: DocType,
    },
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            // Bad or missing commands print usage to stdout and exit 1.
            eprint!("{}", e.render());
            println!("{}", Cli::command().render_help());
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

    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Install => cmd::install::run(config_path),
        Commands::Status { json } => cmd::status::run(config_path, json),
        Commands::Compile { file, output_dir } => {
            cmd::compile::run(config_path, &file, &output_dir)
        }
        Commands::Preview { file } => cmd::preview::run(config_path, &file),
        Commands::Pdf { file, output_dir } => cmd::pdf::run(config_path, &file, &output_dir),
        Commands::Create { name, doc_type } => cmd::create::run(&name, doc_type),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
