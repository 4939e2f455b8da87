//! Browser UI for Streakly.
//!
//! # Responsibility
//! - Serve server-rendered HTML pages plus a small JSON surface over HTTP.
//! - Run each request against its own SQLite connection on a blocking worker.
//!
//! # Invariants
//! - Handlers keep no state between requests besides the database path.
//! - Every mutation answers with a redirect to a freshly loaded view.

mod http;
mod render;

use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use streakly_core::db::{open_db, DbError, DEFAULT_DB_PATH};
use tokio::net::TcpListener;

pub use http::build_router;

/// Default listen address for the local UI.
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    db_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
        }
    }

    pub fn db_path(&self) -> &Path {
        self.db_path.as_path()
    }
}

/// Resolved launcher settings for [`serve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub db_path: PathBuf,
    pub bind: SocketAddr,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            bind: SocketAddr::from(([127, 0, 0, 1], 8501)),
        }
    }
}

/// Failures that stop the server from starting or running.
#[derive(Debug)]
pub enum ServeError {
    Db(DbError),
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    Io(std::io::Error),
}

impl Display for ServeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database unavailable: {err}"),
            Self::Bind { addr, source } => write!(f, "failed to bind {addr}: {source}"),
            Self::Io(err) => write!(f, "server error: {err}"),
        }
    }
}

impl Error for ServeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Bind { source, .. } => Some(source),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<DbError> for ServeError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Opens the database once, then serves the UI until Ctrl-C.
///
/// # Errors
/// - The database cannot be opened or migrated.
/// - The bind address is unavailable.
pub async fn serve(config: ServeConfig) -> Result<(), ServeError> {
    let db_path = config.db_path.clone();
    tokio::task::spawn_blocking(move || open_db(&db_path).map(drop))
        .await
        .map_err(|err| ServeError::Io(std::io::Error::other(err)))??;

    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|source| ServeError::Bind {
            addr: config.bind,
            source,
        })?;
    let addr = listener.local_addr().map_err(ServeError::Io)?;
    info!(
        "event=server_start module=web status=ok addr={} db_path={}",
        addr,
        config.db_path.display()
    );

    axum::serve(listener, build_router(AppState::new(config.db_path)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServeError::Io)?;

    info!("event=server_stop module=web status=ok addr={addr}");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=shutdown_signal module=web status=error error={err}");
    }
}

#[cfg(test)]
mod tests {
    use super::{ServeConfig, DEFAULT_BIND};
    use std::path::Path;

    #[test]
    fn default_config_matches_documented_defaults() {
        let config = ServeConfig::default();
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.db_path, Path::new("data/habits.db"));
    }
}
