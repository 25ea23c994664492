mod cli;

use watchrelay::{
    config::{self, Config},
    server,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging comes up before the config so its warnings are visible.
    // RUST_LOG wins, otherwise DEBUG / --verbose pick the level.
    let debug = std::env::var("DEBUG")
        .map(|v| config::parse_flag(&v))
        .unwrap_or(false);
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose || debug {
            "watchrelay=debug,tower_http=debug".to_string()
        } else {
            "watchrelay=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.port = port;
            }

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(server::start_server(config))
        }
        Commands::CheckConfig => check_config(&config),
        Commands::Version => {
            println!("watchrelay {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn check_config(config: &Config) -> Result<()> {
    println!("✓ Configuration is valid");
    println!("{}", serde_json::to_string_pretty(config)?);
    if let Err(e) = config.history_api() {
        println!("! Plex webhooks disabled: {e}");
    }
    Ok(())
}
