use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinescroll_core::{content::Catalog, AppConfig};

mod commands;

#[derive(Parser)]
#[command(name = "cinescroll")]
#[command(author, version, about = "Cinematic scroll engine toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config.toml (defaults to ~/.config/cinescroll/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay wheel input against the engine and print each frame
    Simulate {
        /// Engine flavour
        #[arg(short = 'm', long, value_enum, default_value_t = commands::simulate::EngineKind::Paged)]
        mode: commands::simulate::EngineKind,
        /// Document height in pixels
        #[arg(long, default_value_t = 4000.0)]
        document_height: f64,
        /// Viewport height in pixels
        #[arg(long, default_value_t = 1000.0)]
        viewport_height: f64,
        /// Viewport width in pixels
        #[arg(long, default_value_t = 1600.0)]
        viewport_width: f64,
        /// Script file, one step per line
        #[arg(short = 's', long, conflicts_with = "wheel")]
        script: Option<PathBuf>,
        /// Inline steps separated by commas, e.g. "120,120,frames 10,escape"
        #[arg(short = 'w', long)]
        wheel: Option<String>,
        /// Print frames as JSON lines
        #[arg(long)]
        json: bool,
        /// Pace frames at the configured fps instead of running them back to back
        #[arg(long)]
        realtime: bool,
        /// Also print sample effect transforms for each frame
        #[arg(long)]
        effects: bool,
    },
    /// List inspiration entries
    List {
        /// Only show one category
        #[arg(long)]
        category: Option<String>,
    },
    /// Render the Open Graph share page for an entry
    Og {
        /// Entry id
        id: String,
    },
    /// Serve Open Graph share pages over HTTP at /og?id=<id>
    Serve {
        /// Address to bind (overrides server.bind)
        #[arg(short = 'b', long)]
        bind: Option<String>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(
            // stdout carries simulation frames
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Simulate {
            mode,
            document_height,
            viewport_height,
            viewport_width,
            script,
            wheel,
            json,
            realtime,
            effects,
        } => {
            let options = commands::simulate::Options {
                mode,
                document_height,
                viewport_height,
                viewport_width,
                script,
                wheel,
                json,
                realtime,
                effects,
            };
            commands::simulate::run(&config, options).await
        }
        Commands::List { category } => {
            let catalog = Catalog::builtin()?;
            commands::list::run(&catalog, category.as_deref())
        }
        Commands::Og { id } => {
            let catalog = Catalog::builtin()?;
            commands::og::run(&catalog, &config, &id)
        }
        Commands::Serve { bind } => {
            let catalog = Catalog::builtin()?;
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            commands::serve::run(catalog, config, bind).await
        }
    }
}
