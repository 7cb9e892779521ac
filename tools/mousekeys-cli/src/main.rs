//! MouseKeys CLI: drive the mouse pointer from the keyboard.
//!
//! Usage:
//!   mousekeys [run]            Start MouseKeys (Caps Lock toggles it)
//!   mousekeys check            Check system capabilities
//!   mousekeys keys             Show the key bindings for this platform
//!   mousekeys config           Show or write the configuration
//!   mousekeys simulate         Print per-tick motion for a scripted key hold

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use mousekeys_common::config::{config_file_path, AppConfig};

mod commands;

#[derive(Parser)]
#[command(
    name = "mousekeys",
    about = "Move the mouse pointer with the keyboard",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the standard location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run MouseKeys until Ctrl+C
    Run {
        /// Keyboard device to capture (Linux evdev)
        #[arg(long)]
        device: Option<PathBuf>,

        /// Do not grab the keyboard; handled keys also reach other apps
        #[arg(long)]
        no_grab: bool,
    },

    /// Check system capabilities
    Check,

    /// Show the key bindings and platform key codes
    Keys {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        write: bool,
    },

    /// Simulate holding a key and print the resulting motion per tick
    Simulate {
        /// Logical key to hold (e.g. move_right, diag_up_left)
        #[arg(long, default_value = "move_right")]
        key: String,

        /// How long the key is held (ms)
        #[arg(long, default_value = "500")]
        hold_ms: u64,

        /// Print samples as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let path = cli.config.clone().unwrap_or_else(config_file_path);
    let loaded = if cli.config.is_some() || path.exists() {
        Some(AppConfig::load_from(&path))
    } else {
        None
    };

    let mut config = match loaded {
        Some(Ok(ref config)) => config.clone(),
        _ => AppConfig::default(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    mousekeys_common::logging::init_logging(&config.logging);

    match loaded {
        Some(Err(e)) if cli.config.is_some() => {
            return Err(anyhow::anyhow!("Failed to load config {}: {e}", path.display()));
        }
        Some(Err(e)) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid config, using defaults");
        }
        Some(Ok(_)) => tracing::debug!(path = %path.display(), "Loaded config"),
        None => tracing::debug!("No config file, using defaults"),
    }

    match cli.command.unwrap_or(Commands::Run {
        device: None,
        no_grab: false,
    }) {
        Commands::Run { device, no_grab } => {
            if device.is_some() {
                config.capture.device = device;
            }
            if no_grab {
                config.capture.grab = false;
            }
            commands::run::run(config).await
        }
        Commands::Check => commands::check::run(),
        Commands::Keys { json } => commands::keys::run(json),
        Commands::Config { write } => commands::config::run(&config, &path, write),
        Commands::Simulate { key, hold_ms, json } => {
            commands::simulate::run(&config, &key, hold_ms, json)
        }
    }
}
