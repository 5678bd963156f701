//! mastery CLI: sync, inspect, and report per-topic mastery scores.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "mastery",
    version,
    about = "Per-topic mastery scores from competitive-programming history"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a learner's history, score it, and store the result
    Sync {
        /// Judge handle (repeat to sync several learners)
        #[arg(long = "handle", required = true)]
        handles: Vec<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Score and print without storing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Print stored mastery for a learner
    Show {
        /// Judge handle
        #[arg(long)]
        handle: String,

        /// Only this topic
        #[arg(long)]
        topic: Option<String>,

        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a curriculum and print its topics
    Graph {
        /// Curriculum TOML file (built-in roadmap if omitted)
        #[arg(long)]
        curriculum: Option<PathBuf>,

        /// Print this topic's prerequisites and their distances
        #[arg(long)]
        topic: Option<String>,
    },

    /// Render a learner's stored mastery to a file
    Report {
        /// Judge handle
        #[arg(long)]
        handle: String,

        /// Output file
        #[arg(long)]
        output: PathBuf,

        /// Output format: html, markdown
        #[arg(long, default_value = "html")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and curriculum files
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mastery=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sync {
            handles,
            config,
            dry_run,
        } => commands::sync::execute(handles, config, dry_run).await,
        Commands::Show {
            handle,
            topic,
            json,
            config,
        } => commands::show::execute(handle, topic, json, config).await,
        Commands::Graph { curriculum, topic } => commands::graph::execute(curriculum, topic).await,
        Commands::Report {
            handle,
            output,
            format,
            config,
        } => commands::report::execute(handle, output, format, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
