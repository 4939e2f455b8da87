//! Key/value settings persisted in the `settings` table.

use crate::repo::{ensure_connection_ready, RepoResult};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};

/// Repository interface for application settings.
pub trait SettingsRepository {
    fn get_setting(&self, key: &str) -> RepoResult<Option<String>>;
    fn set_setting(&self, key: &str, value: &str) -> RepoResult<()>;
}

impl<T: SettingsRepository + ?Sized> SettingsRepository for &T {
    fn get_setting(&self, key: &str) -> RepoResult<Option<String>> {
        (**self).get_setting(key)
    }

    fn set_setting(&self, key: &str, value: &str) -> RepoResult<()> {
        (**self).set_setting(key, value)
    }
}

/// SQLite-backed settings repository.
pub struct SqliteSettingsRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSettingsRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn get_setting(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM settings WHERE key = ?1;", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_setting(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value;",
            params![key, value],
        )?;
        info!("event=setting_set module=repo status=ok key={key}");
        Ok(())
    }
}
