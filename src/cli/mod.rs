use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "proton-launcher")]
#[command(author, version, about = "Keep a list of game shortcuts and share your launcher settings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the game list (default)
    List,

    /// Add a game shortcut to the end of the list
    Add {
        /// Display name
        name: String,

        /// Address opened when the game is launched
        url: String,

        /// Optional image shown next to the name
        #[arg(short, long)]
        image: Option<String>,
    },

    /// Remove the game at a position
    Remove {
        /// Zero-based position as shown by `list`
        index: usize,
    },

    /// Move a game to a new position
    Move {
        /// Current position
        from: usize,

        /// Position the game ends up at
        to: usize,
    },

    /// Open a game in the default browser
    Open {
        /// Zero-based position as shown by `list`
        index: usize,
    },

    /// Export games and preferences to a JSON file
    Export {
        /// Output file (defaults to the configured export file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import games and preferences from a JSON file
    Import {
        /// Settings file previously written by `export`
        file: PathBuf,
    },

    /// Reset games and preferences to their defaults
    Reset {
        /// Don't ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Set the accent color (#rrggbb)
    Accent {
        color: String,
    },

    /// Remember the active tab
    Tab {
        id: String,
    },

    /// Show status and configuration
    Status,
}
