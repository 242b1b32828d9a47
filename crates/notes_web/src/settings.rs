//! Layered runtime settings.
//!
//! Sources, later ones winning: built-in defaults, an optional TOML file
//! (`notes.toml` in the working directory unless a path is given), then
//! `NOTES_*` environment variables with `__` between sections, for example
//! `NOTES_SERVER__ADDR=0.0.0.0:8000`.

use config::{Config, ConfigError, Environment, File, FileFormat};
use notes_core::{default_log_level, LogTarget};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "notes.toml";
const ENV_PREFIX: &str = "NOTES";

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    pub level: String,
    /// Absolute directory for rolling log files; stderr when unset.
    #[serde(default)]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    pub session_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub logging: Logging,
    pub auth: Auth,
}

impl Settings {
    /// Loads settings; an explicit `config_file` must exist.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_prefix(config_file, ENV_PREFIX)
    }

    fn load_with_prefix(config_file: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        let file = match config_file {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE)
                .format(FileFormat::Toml)
                .required(false),
        };

        let config = Config::builder()
            .set_default("server.addr", "127.0.0.1:8000")?
            .set_default("database.path", "notes.sqlite3")?
            .set_default("logging.level", default_log_level())?
            .set_default("auth.session_ttl_seconds", 1_209_600_i64)?
            .add_source(file)
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.addr.parse().map_err(|err| {
            ConfigError::Message(format!("invalid server.addr `{}`: {err}", self.server.addr))
        })
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.auth.session_ttl_seconds)
    }

    pub fn log_target(&self) -> Result<LogTarget, ConfigError> {
        LogTarget::from_dir(self.logging.dir.as_deref()).map_err(ConfigError::Message)
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use notes_core::LogTarget;
    use std::env::set_var;
    use std::io::Write;
    use std::path::Path;
    use std::time::Duration;

    #[test]
    fn defaults_apply_without_file_or_env() {
        let settings = Settings::load_with_prefix(None, "NOTES_TEST_DEFAULTS").unwrap();
        assert_eq!(settings.server.addr, "127.0.0.1:8000");
        assert_eq!(settings.database.path, Path::new("notes.sqlite3"));
        assert_eq!(settings.session_ttl(), Duration::from_secs(14 * 24 * 60 * 60));
        assert_eq!(settings.log_target().unwrap(), LogTarget::Stderr);
        assert!(settings.socket_addr().is_ok());
    }

    #[test]
    fn file_then_env_override_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\naddr = \"0.0.0.0:9000\"\n\n[auth]\nsession_ttl_seconds = 60"
        )
        .unwrap();

        set_var("NOTES_TEST_LAYERS_DATABASE__PATH", "/tmp/notes-test.sqlite3");
        set_var("NOTES_TEST_LAYERS_AUTH__SESSION_TTL_SECONDS", "120");
        let settings = Settings::load_with_prefix(Some(file.path()), "NOTES_TEST_LAYERS").unwrap();

        assert_eq!(settings.server.addr, "0.0.0.0:9000");
        assert_eq!(settings.database.path, Path::new("/tmp/notes-test.sqlite3"));
        assert_eq!(settings.session_ttl(), Duration::from_secs(120));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(Settings::load_with_prefix(Some(&missing), "NOTES_TEST_MISSING").is_err());
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        set_var("NOTES_TEST_LOGDIR_LOGGING__DIR", "logs");
        let settings = Settings::load_with_prefix(None, "NOTES_TEST_LOGDIR").unwrap();
        assert!(settings.log_target().is_err());
    }
}
