//! Alchemy CLI
//!
//! Compiles workflow sources to node graphs from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Alchemy - workflow DSL compiler
#[derive(Parser)]
#[command(name = "alchemy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (or project directory)
    #[arg(short, long, default_value = alchemy_core::config::CONFIG_FILE)]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new Alchemy project
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Project name (defaults to directory name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Compile a workflow source to a JSON graph
    Compile {
        /// Source file
        file: String,

        /// Write the graph here instead of stdout
        #[arg(short, long)]
        output: Option<String>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Check workflow sources for errors
    Validate {
        /// Source file or directory to search for .alc files
        #[arg(default_value = ".")]
        path: String,
    },

    /// Inspect available node types
    Nodes {
        #[command(subcommand)]
        command: NodeCommands,
    },

    /// Recompile a source whenever it changes
    Watch {
        /// Source file
        file: String,

        /// Polling interval in milliseconds
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
}

#[derive(Subcommand)]
enum NodeCommands {
    /// List node types
    List {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show a node type descriptor
    Show {
        /// Node type key
        node_type: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // stdout carries compiled graphs, so logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Init { path, name } => {
            commands::init::run(&path, name.as_deref()).await?;
        }
        Commands::Compile {
            file,
            output,
            pretty,
        } => {
            commands::compile::run(&cli.config, &file, output.as_deref(), pretty).await?;
        }
        Commands::Validate { path } => {
            commands::validate::run(&cli.config, &path).await?;
        }
        Commands::Nodes { command } => match command {
            NodeCommands::List { category } => {
                commands::nodes::list(&cli.config, category.as_deref()).await?;
            }
            NodeCommands::Show { node_type } => {
                commands::nodes::show(&cli.config, &node_type).await?;
            }
        },
        Commands::Watch { file, interval_ms } => {
            commands::watch::run(&cli.config, &file, interval_ms).await?;
        }
    }

    Ok(())
}
