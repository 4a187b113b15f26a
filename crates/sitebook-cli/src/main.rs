mod config;
mod epo_cmds;
mod note_cmds;
mod schedule_cmd;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};

use sitebook_store::StateStore;
use sitebook_store::config::StoreConfig;

use config::SitebookConfig;

#[derive(Parser)]
#[command(
    name = "sitebook",
    about = "Drywall phase scheduling, EPO tracking, and site-note triage"
)]
struct Cli {
    /// State file path (overrides SITEBOOK_STATE_PATH env var)
    #[arg(long, global = true)]
    state_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a sitebook config file
    Init {
        /// Note classifier backend: keywords or remote
        #[arg(long, default_value = "keywords")]
        classifier: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// List communities and the crew assigned to each phase
    Communities,
    /// Print the six-phase schedule for a community
    Schedule {
        /// Community name (unknown names get unassigned crews)
        community: String,
        /// Start date, YYYY-MM-DD or MM/DD/YYYY
        start: String,
        /// Lot number shown in the header
        #[arg(long)]
        lot: Option<String>,
    },
    /// Queue a mud order for the Scrap date of a schedule
    OrderMud {
        /// Community name
        community: String,
        /// Start date, YYYY-MM-DD or MM/DD/YYYY
        start: String,
        /// Lot number
        #[arg(long)]
        lot: String,
    },
    /// EPO (extra-work approval) tracker
    Epo {
        #[command(subcommand)]
        command: EpoCommands,
    },
    /// Site notes
    Note {
        #[command(subcommand)]
        command: NoteCommands,
    },
    /// Serve the HTTP API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum EpoCommands {
    /// Record an EPO sent to a builder
    Send {
        #[arg(long)]
        lot: String,
        #[arg(long)]
        community: String,
        /// Builder e-mail address
        #[arg(long)]
        to: String,
        /// Amount, e.g. "$450"
        #[arg(long)]
        amount: String,
        /// Attached photo (repeatable)
        #[arg(long)]
        attach: Vec<String>,
    },
    /// Show the EPO tracker
    List,
    /// Mark an EPO as replied
    Replied {
        /// Index shown by `sitebook epo list`
        index: usize,
    },
    /// Record a follow-up for an unanswered EPO
    FollowUp {
        /// Index shown by `sitebook epo list`
        index: usize,
    },
}

#[derive(Subcommand)]
pub enum NoteCommands {
    /// Classify a note and store it
    Add {
        #[arg(long)]
        lot: String,
        #[arg(long)]
        community: String,
        /// Note text
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Classify text without storing it
    Classify {
        /// Note text
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// List stored notes
    List {
        /// Only notes for this lot
        #[arg(long)]
        lot: Option<String>,
    },
}

/// Execute the `sitebook init` command: write config file.
fn cmd_init(cli_state_path: Option<&Path>, classifier: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let state_path = cli_state_path
        .map(Path::to_path_buf)
        .unwrap_or_else(StoreConfig::default_path);

    let cfg = config::ConfigFile {
        state: config::StateSection {
            path: Some(state_path.clone()),
        },
        classifier: config::ClassifierSection {
            backend: Some(classifier.to_string()),
            ..config::ClassifierSection::default()
        },
        ..config::ConfigFile::default()
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  state.path = {}", state_path.display());
    println!("  classifier.backend = {classifier}");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cli_state_path = cli.state_path.as_deref();

    match cli.command {
        Commands::Init { classifier, force } => {
            cmd_init(cli_state_path, &classifier, force)?;
        }
        Commands::Communities => {
            let resolved = SitebookConfig::resolve(cli_state_path)?;
            schedule_cmd::run_communities(&resolved.reference)?;
        }
        Commands::Schedule {
            community,
            start,
            lot,
        } => {
            let resolved = SitebookConfig::resolve(cli_state_path)?;
            schedule_cmd::run_schedule(&resolved.reference, &community, &start, lot.as_deref())?;
        }
        Commands::OrderMud {
            community,
            start,
            lot,
        } => {
            let resolved = SitebookConfig::resolve(cli_state_path)?;
            schedule_cmd::run_order_mud(&resolved.reference, &community, &start, &lot)?;
        }
        Commands::Epo { command } => {
            let resolved = SitebookConfig::resolve(cli_state_path)?;
            let mut store = StateStore::open(&resolved.store_config)?;
            epo_cmds::run_epo_command(command, &mut store)?;
        }
        Commands::Note { command } => {
            let resolved = SitebookConfig::resolve(cli_state_path)?;
            note_cmds::run_note_command(command, &resolved).await?;
        }
        Commands::Serve { bind, port } => {
            let resolved = SitebookConfig::resolve(cli_state_path)?;
            let classifier = resolved.note_classifier()?;
            let store = StateStore::open(&resolved.store_config)?;
            let state = serve_cmd::AppState::new(resolved.reference, store, classifier);
            serve_cmd::run_serve(state, &bind, port).await?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "sitebook", &mut std::io::stdout());
        }
    }

    Ok(())
}
