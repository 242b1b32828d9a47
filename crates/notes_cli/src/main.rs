//! `notes` command-line entry point.
//!
//! # Responsibility
//! - Load settings, start logging and open the database.
//! - Run the web server or one-off account administration.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use notes_core::db::open_db;
use notes_core::{init_logging, AuthService, SqliteUserRepository};
use notes_web::{AppState, Settings};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "notes", version, about = "Personal notes web service")]
struct Cli {
    /// TOML settings file; `notes.toml` is read when present otherwise.
    #[arg(long, global = true, env = "NOTES_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server.
    Serve {
        /// Listen address, overriding `server.addr`.
        #[arg(long)]
        addr: Option<String>,
    },
    /// Create an account.
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long, env = "NOTES_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Print version information.
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("notes ping={}", notes_core::ping());
            println!("notes_core version={}", notes_core::core_version());
            Ok(())
        }
        Commands::Serve { addr } => {
            let mut settings = load_settings(cli.config)?;
            if let Some(addr) = addr {
                settings.server.addr = addr;
            }
            start_logging(&settings)?;
            let addr = settings.socket_addr()?;
            let conn = open_db(&settings.database.path).with_context(|| {
                format!("open database `{}`", settings.database.path.display())
            })?;
            info!(
                "event=serve module=cli status=ok db={} addr={addr}",
                settings.database.path.display()
            );
            notes_web::serve(addr, AppState::new(conn, settings.session_ttl())).await
        }
        Commands::CreateUser { username, password } => {
            let settings = load_settings(cli.config)?;
            start_logging(&settings)?;
            let conn = open_db(&settings.database.path).with_context(|| {
                format!("open database `{}`", settings.database.path.display())
            })?;
            let user = AuthService::new(SqliteUserRepository::try_new(&conn)?)
                .create_user(&username, &password)?;
            println!("created user id={} username={}", user.id, user.username);
            Ok(())
        }
    }
}

fn load_settings(config: Option<PathBuf>) -> Result<Settings> {
    Settings::load(config.as_deref()).context("load settings")
}

fn start_logging(settings: &Settings) -> Result<()> {
    let target = settings.log_target()?;
    init_logging(&settings.logging.level, target).map_err(|err| anyhow!(err))
}
