mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, post::PostSubcommand, post_type::PostTypeSubcommand,
    taxonomy::TaxonomySubcommand, term::TermSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yak-order",
    about = "Manual drag-and-drop ordering for taxonomy terms and posts",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .yak/)
    #[arg(long, global = true, env = "YAK_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .yak/ with default settings and an empty catalog
    Init,

    /// Register and list taxonomies
    Taxonomy {
        #[command(subcommand)]
        subcommand: TaxonomySubcommand,
    },

    /// Register and list post types
    PostType {
        #[command(subcommand)]
        subcommand: PostTypeSubcommand,
    },

    /// Add, list and reorder taxonomy terms
    Term {
        #[command(subcommand)]
        subcommand: TermSubcommand,
    },

    /// Add, list and reorder posts
    Post {
        #[command(subcommand)]
        subcommand: PostSubcommand,
    },

    /// Show, validate and edit ordering settings
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Serve the HTTP ordering API
    Ui {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "0")]
        port: u16,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Ui { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Taxonomy { subcommand } => cmd::taxonomy::run(&root, subcommand, cli.json),
        Commands::PostType { subcommand } => cmd::post_type::run(&root, subcommand, cli.json),
        Commands::Term { subcommand } => cmd::term::run(&root, subcommand, cli.json),
        Commands::Post { subcommand } => cmd::post::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Ui { port, no_open } => cmd::ui::run(&root, port, no_open),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
