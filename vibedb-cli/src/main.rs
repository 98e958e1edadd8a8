mod adapters;
mod commands;
mod host;
mod output;
mod runner;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use vibedb_core::adapter::{Confirm, ProcessTable};
use vibedb_core::command::{Action, Dispatcher, Host, Outcome};
use vibedb_core::config::VibedbConfig;
use vibedb_core::lifecycle::Lifecycle;
use vibedb_core::registry::{Registry, RegistryEvent};
use vibedb_core::selector::Selection;

use adapters::SysinfoProcessTable;
use host::{AssumeYes, EditorViewer, PromptConfirm, TerminalSink};
use runner::StreamingRunner;

#[derive(Parser)]
#[command(name = "vibedb")]
#[command(about = "Create, run and inspect local YDB instances", long_about = None)]
struct Cli {
    /// Increase log verbosity (RUST_LOG takes precedence)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to vibedb.yaml (defaults to discovery)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding instances (overrides VIBEDB_ROOT)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Current selection, e.g. `instance:dev`
    #[arg(long, global = true, env = "VIBEDB_SELECTED", default_value = "")]
    selected: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List instances and whether they are running
    List {
        #[arg(long)]
        json: bool,
    },
    /// Rescan instances and the process table
    Refresh {
        #[arg(long)]
        json: bool,
    },
    /// Build the binaries and deploy a new instance
    Create { name: Option<String> },
    /// Start a deployed instance
    Start { name: Option<String> },
    /// Stop the daemons of an instance
    Stop { name: Option<String> },
    /// Delete a stopped instance directory
    Delete {
        name: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Open the instance config file in an editor
    Config {
        name: Option<String>,
        /// Print the path instead of opening it
        #[arg(long)]
        print: bool,
    },
    /// Open the instance log file in a pager
    Logs {
        name: Option<String>,
        #[arg(long)]
        print: bool,
    },
    /// Check the toolchain, root directory and ports
    Doctor,
    /// Write a starter vibedb.yaml in the current directory
    Init {
        #[arg(short, long)]
        force: bool,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(explicit: Option<&Path>, root: Option<PathBuf>) -> anyhow::Result<(Option<PathBuf>, VibedbConfig)> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let (path, mut config) = match explicit {
        Some(path) => {
            let mut config = VibedbConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            config.apply_env_overrides(&cwd);
            (Some(path.to_path_buf()), config)
        }
        None => VibedbConfig::discover(&cwd)?,
    };
    if let Some(root) = root {
        config.set_root(&root, &cwd);
    }
    if let Some(path) = &path {
        tracing::debug!(config = %path.display(), "loaded configuration");
    }
    Ok((path, config))
}

fn build_registry(config: &VibedbConfig) -> Arc<Registry> {
    let table: Arc<dyn ProcessTable> = Arc::new(SysinfoProcessTable::new());
    Arc::new(Registry::new(
        config.root.clone(),
        config.daemon_name.clone(),
        table,
    ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut assume_yes = false;
    let mut print_only = false;
    let mut json = false;
    let action = match cli.command.unwrap_or(Commands::List { json: false }) {
        Commands::Init { force } => return commands::run_init(force, None),
        Commands::Doctor => {
            let (config_path, config) = load_config(cli.config.as_deref(), cli.root)?;
            let registry = build_registry(&config);
            if !commands::run_doctor(&config, config_path.as_deref(), &registry).await {
                std::process::exit(1);
            }
            return Ok(());
        }
        Commands::List { json: j } => {
            json = j;
            Action::List
        }
        Commands::Refresh { json: j } => {
            json = j;
            Action::Refresh
        }
        Commands::Create { name } => {
            let name = match name {
                Some(name) => name,
                None => host::prompt_instance_name().await?,
            };
            Action::Create { name }
        }
        Commands::Start { name } => Action::Start { target: name },
        Commands::Stop { name } => Action::Stop { target: name },
        Commands::Delete { name, yes } => {
            assume_yes = yes;
            Action::Delete { target: name }
        }
        Commands::Config { name, print } => {
            print_only = print;
            Action::EditConfig { target: name }
        }
        Commands::Logs { name, print } => {
            print_only = print;
            Action::OpenLogs { target: name }
        }
    };

    let (_, config) = load_config(cli.config.as_deref(), cli.root)?;
    let config = Arc::new(config);
    let registry = build_registry(&config);

    let confirm: Arc<dyn Confirm> = if assume_yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(PromptConfirm)
    };
    let host = Host {
        sink: Arc::new(TerminalSink::new()),
        confirm,
        viewer: Arc::new(EditorViewer::new(
            config.editor.clone(),
            config.pager.clone(),
            print_only,
        )),
    };

    let lifecycle = Arc::new(Lifecycle::new(
        config.clone(),
        registry.clone(),
        Arc::new(StreamingRunner::new()),
    ));
    let dispatcher = Dispatcher::new(lifecycle, host);
    let selection = Selection::parse(&cli.selected);

    let mut events = registry.subscribe();
    let root = config.root.clone();

    match dispatcher.dispatch(action, &selection).await {
        Ok(outcome) => {
            output::print_outcome(&outcome, &root, json)?;
            if changes_state(&outcome) && invalidated(&mut events) {
                println!();
                output::print_instances(&registry.instances().await, &root, false)?;
            }
            Ok(())
        }
        Err(err) => {
            output::print_error(&err);
            tracing::debug!(error = ?err, "action failed");
            std::process::exit(1);
        }
    }
}

/// Outcomes after which the listing on screen is stale
fn changes_state(outcome: &Outcome) -> bool {
    matches!(
        outcome,
        Outcome::Created(_) | Outcome::Started(_) | Outcome::Stopped { .. } | Outcome::Deleted(_)
    )
}

/// Drain pending registry events, reporting whether any invalidated the listing
fn invalidated(events: &mut broadcast::Receiver<RegistryEvent>) -> bool {
    let mut seen = false;
    loop {
        match events.try_recv() {
            Ok(RegistryEvent::Invalidated) => seen = true,
            Err(broadcast::error::TryRecvError::Lagged(_)) => seen = true,
            Err(_) => return seen,
        }
    }
}
