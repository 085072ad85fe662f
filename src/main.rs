use anyhow::{Context, Result};
use clap::Parser;

use miqat::cli::args::{Cli, Commands};
use miqat::cli::handlers;
use miqat::config::AppConfig;
use miqat::{db, tui};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let conn = db::open(&AppConfig::db_path()?)?;

    match cli.command {
        Some(Commands::Times { json }) => {
            handlers::handle_times(&conn, &config, json)?;
        }
        Some(Commands::Next) => {
            handlers::handle_next(&conn, &config)?;
        }
        Some(Commands::Qibla) => {
            handlers::handle_qibla(&config)?;
        }
        Some(Commands::Locate { query }) => {
            handlers::handle_locate(&mut config, &query)?;
        }
        Some(Commands::Remind { prayer }) => {
            handlers::handle_remind(&conn, &prayer)?;
        }
        Some(Commands::Cache { action }) => {
            handlers::handle_cache(&conn, &action)?;
        }

        // No subcommand → live dashboard
        Some(Commands::Watch) | None => {
            tui::app::run(conn, config)?;
        }
    }

    Ok(())
}
