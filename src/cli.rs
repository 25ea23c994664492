use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "watchrelay")]
#[command(author, version, about = "Plex/Jellyfin watched-media webhook relay")]
pub struct Cli {
    /// Enable verbose logging (same as DEBUG=true)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the webhook receiver (default)
    Serve {
        /// Port to listen on, overrides PORT
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Load the configuration from the environment and print it
    CheckConfig,

    /// Display version information
    Version,
}
