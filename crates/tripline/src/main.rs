// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tripline - trip reports over Telegram.
//!
//! Binary entry point: parses the CLI, loads configuration, and hands
//! off to the selected command.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tripline_config::{ConfigError, TriplineConfig};

/// Tripline - trip reports over Telegram.
#[derive(Parser, Debug)]
#[command(name = "tripline", version, about, long_about = None)]
struct Cli {
    /// Explicit config file; otherwise the XDG hierarchy is searched.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Tripline report bot.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Config problems are rendered as diagnostics, not a panic backtrace.
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            tripline_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("tripline serve failed: {e}");
                std::process::exit(1);
            }
        }
        None => {
            println!("tripline: use --help for available commands");
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<TriplineConfig, Vec<ConfigError>> {
    match path {
        Some(path) => tripline_config::load_and_validate_path(path),
        None => tripline_config::load_and_validate(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Advancing the stats epoch only works under jemalloc; the system
        // allocator would error out here.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report live allocations");
    }

    #[test]
    fn serve_subcommand_parses() {
        let cli = Cli::try_parse_from(["tripline", "serve"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));
        assert!(cli.config.is_none());
    }

    #[test]
    fn config_flag_takes_a_path() {
        let cli =
            Cli::try_parse_from(["tripline", "--config", "/etc/tripline/tripline.toml", "serve"])
                .unwrap();
        assert_eq!(
            cli.config.as_deref(),
            Some(Path::new("/etc/tripline/tripline.toml"))
        );
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tripline.toml");
        std::fs::write(
            &path,
            r#"
[telegram]
bot_token = "123456:token"
allowed_chats = [-1001234]

[extractor]
api_key = "sk-test"

[store]
connection_string = "mongodb://localhost:27017"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.telegram.allowed_chats, vec![-1001234]);
    }
}
