mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "slimpack",
    about = "Package Node.js functions with only the files they use, and publish them to AWS Lambda"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a slimpack.toml template into the current Node.js project
    Init,
    /// Show the files and packages reachable from the entry file
    Graph {
        /// Path to the config file (default: ./slimpack.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
    /// Build a deployment archive
    Build {
        /// Path to the config file (default: ./slimpack.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
        /// Leave the build workspace on disk after archiving
        #[arg(long)]
        keep_workspace: bool,
    },
    /// Build (or reuse an archive) and publish to every configured function
    Deploy {
        /// Path to the config file (default: ./slimpack.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
        /// Publish an existing archive instead of building one
        #[arg(long)]
        archive: Option<PathBuf>,
    },
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

    match cli.command {
        Commands::Init => commands::init_project()?,
        Commands::Graph { config } => commands::graph(config.as_deref())?,
        Commands::Build {
            config,
            keep_workspace,
        } => commands::build(config.as_deref(), keep_workspace).await?,
        Commands::Deploy { config, archive } => {
            commands::deploy(config.as_deref(), archive.as_deref()).await?
        }
    }

    Ok(())
}
