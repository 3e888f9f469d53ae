use clap::{ArgAction, Parser, Subcommand};
use commands::{auth, config, status, sync, videos};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "immersion")]
#[command(about = "Immersion Tracker - count the hours of YouTube you watch in your target language")]
#[command(version)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to a daily rotated file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a watched video by its YouTube link
    #[command(long_about = "Look up a YouTube video and add its duration to your immersion time. Accepts watch, youtu.be, embed and /v/ links. When signed in, the video is also saved to the cloud.")]
    Add {
        /// YouTube video URL
        url: String,
    },
    /// Remove a video from the collection
    Remove {
        /// The video's unique id, as shown by `immersion list`
        unique_id: String,
    },
    /// List watched videos, newest first
    List {
        /// Show at most this many videos
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show total immersion time and level progress
    Status,
    /// Merge with the cloud copy and push the combined collection back
    Sync,
    /// Sign in and merge local and cloud collections
    Login {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account
    Signup,
    /// Sign out (videos stay on this machine)
    Logout,
    /// Send a password reset email
    ResetPassword {
        #[arg(long)]
        email: Option<String>,
    },
    /// View or change configuration
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks keys)
    Show {
        /// Show keys unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Set a value by dotted key, e.g. `youtube.api_key`
    #[command(long_about = "Set a configuration value. Keys: youtube.api_key, firebase.enabled, firebase.api_key, firebase.project_id, firebase.collection, sync.enabled, sync.status_clear_seconds.")]
    Set { key: String, value: String },
    /// Print the configuration and data file locations
    Path,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet, cli.log_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to initialize logging: {}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Add { url } => videos::run_add(&url, &output).await,
        Commands::Remove { unique_id } => videos::run_remove(&unique_id, &output).await,
        Commands::List { limit } => videos::run_list(limit, &output).await,
        Commands::Status => status::run_status(&output).await,
        Commands::Sync => sync::run_sync(&output).await,
        Commands::Login { email } => auth::run_login(email, &output).await,
        Commands::Signup => auth::run_signup(&output).await,
        Commands::Logout => auth::run_logout(&output).await,
        Commands::ResetPassword { email } => auth::run_reset_password(email, &output).await,
        Commands::Config { cmd } => config::run_config(cmd.unwrap_or(ConfigCommands::Show { full: false }), &output),
    }
}
