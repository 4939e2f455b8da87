//! Command-line surface of the launcher.

use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use streakly_core::db::DEFAULT_DB_PATH;
use streakly_core::default_log_level;
use streakly_web::{ServeConfig, DEFAULT_BIND};

const DEFAULT_LOG_DIR: &str = "data/logs";

#[derive(Debug, Parser)]
#[command(name = "streakly", version, about = "Personal habit tracker")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Serve the habit tracker UI on a local address
    Serve(ServeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Args)]
pub(crate) struct ServeArgs {
    /// SQLite database file; created with its parent directory if missing
    #[arg(long = "db", env = "STREAKLY_DB_PATH", default_value = DEFAULT_DB_PATH)]
    pub(crate) db_path: PathBuf,
    /// Address the HTTP server binds to
    #[arg(long, env = "STREAKLY_BIND", default_value = DEFAULT_BIND)]
    pub(crate) bind: SocketAddr,
    /// trace|debug|info|warn|error; defaults to debug in debug builds, info otherwise
    #[arg(long, env = "STREAKLY_LOG_LEVEL")]
    pub(crate) log_level: Option<String>,
    /// Directory for rolling log files; relative paths resolve against the working directory
    #[arg(long, env = "STREAKLY_LOG_DIR", default_value = DEFAULT_LOG_DIR)]
    pub(crate) log_dir: PathBuf,
}

impl ServeArgs {
    pub(crate) fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or_else(|| default_log_level())
    }

    /// Absolute log directory, as the logger requires.
    pub(crate) fn resolved_log_dir(&self, cwd: &Path) -> PathBuf {
        if self.log_dir.is_absolute() {
            self.log_dir.clone()
        } else {
            cwd.join(&self.log_dir)
        }
    }

    pub(crate) fn serve_config(&self) -> ServeConfig {
        ServeConfig {
            db_path: self.db_path.clone(),
            bind: self.bind,
        }
    }
}
