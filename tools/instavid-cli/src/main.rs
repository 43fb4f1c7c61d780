//! InstaVid CLI: build and export vertical short-form videos from scene files.
//!
//! Usage:
//!   instavid init <NAME>          Write a sample scene to start from
//!   instavid validate <SCENE>     Check a scene file
//!   instavid info <SCENE>         Show scene contents
//!   instavid render <SCENE>       Render a single frame to PNG
//!   instavid preview <SCENE>      Play a scene through the editor clock
//!   instavid export <SCENE>       Export a scene to video
//!   instavid check                Check encoder and font availability

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use instavid_common::config::{AppConfig, LoggingConfig};
use instavid_project_model::ResolutionTier;

mod commands;

#[derive(Parser)]
#[command(
    name = "instavid",
    about = "Animated 9:16 videos from scene files",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new scene from the sample template
    Init {
        /// Scene name
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Start with no elements instead of the sample layout
        #[arg(long)]
        empty: bool,
    },

    /// Validate a scene file
    Validate {
        /// Path to the scene file
        path: PathBuf,
    },

    /// Show scene information
    Info {
        /// Path to the scene file
        path: PathBuf,
    },

    /// Render one frame of a scene
    Render {
        /// Path to the scene file
        path: PathBuf,

        /// Timeline position in seconds
        #[arg(short, long, default_value = "0")]
        time: f64,

        /// Output resolution: 720, 1080 or 4k (defaults to the scene's)
        #[arg(long)]
        resolution: Option<ResolutionTier>,

        /// Output file (PNG, or JSON with --dry-run)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the draw commands instead of rasterizing
        #[arg(long)]
        dry_run: bool,

        /// Jitter seed for glitch and shake
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Play a scene through the editor and report what happened
    Preview {
        /// Path to the scene file
        path: PathBuf,

        /// Display refresh rate to tick at
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Pace ticks against the wall clock instead of stepping instantly
        #[arg(long)]
        realtime: bool,

        /// Write the keystroke cues to a WAV file
        #[arg(long)]
        audio: Option<PathBuf>,
    },

    /// Export a scene to video
    Export(commands::export::ExportArgs),

    /// Check encoder and font availability
    Check {
        /// Write the current (or default) configuration to the config file
        #[arg(long)]
        write_config: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    // Initialize logging
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    instavid_common::logging::init_logging(&LoggingConfig {
        level,
        json: config.logging.json,
    });

    match cli.command {
        Commands::Init {
            name,
            output,
            empty,
        } => commands::init::run(&config, name, output, empty),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Info { path } => commands::info::run(path),
        Commands::Render {
            path,
            time,
            resolution,
            output,
            dry_run,
            seed,
        } => commands::render::run(&config, path, time, resolution, output, dry_run, seed),
        Commands::Preview {
            path,
            fps,
            realtime,
            audio,
        } => commands::preview::run(path, fps, realtime, audio).await,
        Commands::Export(args) => commands::export::run(&config, args).await,
        Commands::Check { write_config } => commands::check::run(&config, write_config),
    }
}
