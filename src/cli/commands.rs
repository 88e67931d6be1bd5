use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "zignav", about = concat!("zignav v", env!("CARGO_PKG_VERSION"), " - deep link and menu navigation controller"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: ./zignav.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// File backing the durable store (overrides storage.state_file)
    #[arg(long = "state-file", global = true)]
    pub state_file: Option<PathBuf>,

    /// Behave like a plain browser: no native app-link bridge
    #[arg(long, global = true)]
    pub web: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check how deep links resolve
    Parse(ParseArgs),
    /// Build the in-app route and custom-scheme link for an event
    Link(LinkArgs),
    /// Run a timed event script through the controller
    Replay(ReplayArgs),
}

#[derive(Args)]
pub struct ParseArgs {
    /// Links to parse
    #[arg(required = true)]
    pub urls: Vec<String>,
}

#[derive(Args)]
pub struct LinkArgs {
    /// Event id (UUID)
    pub event_id: String,
    /// Invite token to carry
    #[arg(long)]
    pub token: Option<String>,
    /// Custom scheme (default: links.app_scheme)
    #[arg(long)]
    pub scheme: Option<String>,
}

#[derive(Args)]
pub struct ReplayArgs {
    /// Script file: one `@<ms> <event> [args]` per line
    pub script: PathBuf,
    /// JSON file with the directory contents (profiles and events)
    #[arg(long)]
    pub directory: Option<PathBuf>,
    /// Route shown before the script starts
    #[arg(long = "start-path", default_value = "/")]
    pub start_path: String,
}
