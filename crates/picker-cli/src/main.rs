mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    catalogue::CatalogueSubcommand, challenge::ChallengeSubcommand,
    commander::CommanderSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "picker",
    about = "Browse a commander catalogue and track one pick per colour identity",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .picker/)
    #[arg(long, global = true, env = "PICKER_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .picker/ with a default config and an empty state
    Init,

    /// Merge the catalogue into the saved state, then attach tags
    Import {
        /// Catalogue file (default: catalogue_path from config)
        #[arg(long)]
        catalogue: Option<PathBuf>,
        /// Tag aggregate file (default: tags_path from config)
        #[arg(long)]
        tags: Option<PathBuf>,
    },

    /// Build catalogue files from saved card-search pages
    Catalogue {
        #[command(subcommand)]
        subcommand: CatalogueSubcommand,
    },

    /// List, search, add, and delete commanders
    Commander {
        #[command(subcommand)]
        subcommand: CommanderSubcommand,
    },

    /// Show the tag index
    Tags {
        /// Only tags whose label contains this text
        #[arg(long)]
        filter: Option<String>,
        /// Show every tag instead of the configured limit
        #[arg(long)]
        all: bool,
    },

    /// Work the 32-cell colour identity challenge
    Challenge {
        #[command(subcommand)]
        subcommand: ChallengeSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Import { catalogue, tags } => {
            cmd::import::run(&root, catalogue.as_deref(), tags.as_deref(), cli.json)
        }
        Commands::Catalogue { subcommand } => cmd::catalogue::run(&root, subcommand, cli.json),
        Commands::Commander { subcommand } => cmd::commander::run(&root, subcommand, cli.json),
        Commands::Tags { filter, all } => cmd::tags::run(&root, filter.as_deref(), all, cli.json),
        Commands::Challenge { subcommand } => cmd::challenge::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
