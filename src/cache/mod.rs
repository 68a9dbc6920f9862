// Confetti - A wedding media-sharing gallery
// Copyright (C) 2026 Confetti Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Settings store for locally persisted state
//!
//! Uses SQLite for the handful of values that survive across sessions: the
//! submitter display name and the language preference. Read once at startup,
//! written on change.

use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Settings key for the submitter display name
pub const SUBMITTER_NAME_KEY: &str = "submitter_name";
/// Settings key for the UI language preference
pub const LANGUAGE_KEY: &str = "lng";
/// Languages the UI ships translations for
pub const SUPPORTED_LANGUAGES: &[&str] = &["it", "ro"];
/// Fallback language
pub const DEFAULT_LANGUAGE: &str = "it";

/// SQLite-backed settings store
pub struct SettingsStore {
    pool: SqlitePool,
}

impl SettingsStore {
    /// Open the store at its default location under the app data dir
    pub async fn new() -> Result<Self> {
        Self::with_path(default_db_path()).await
    }

    /// Open the store at `db_path`
    pub async fn with_path(db_path: PathBuf) -> Result<Self> {
        // Ensure the directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        info!("Opening settings database at {}", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;

        Ok(store)
    }

    /// Initialize the database schema
    async fn init_schema(&self) -> Result<()> {
        debug!("Initializing settings schema");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a setting value
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(v,)| v))
    }

    /// Set a setting value
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        debug!("Set setting {} = {}", key, value);
        Ok(())
    }

    /// Delete a setting
    pub async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Get all settings as a map
    pub async fn get_all(&self) -> Result<HashMap<String, String>> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().collect())
    }

    /// Submitter display name, if one was saved
    pub async fn submitter_name(&self) -> Result<Option<String>> {
        self.get(SUBMITTER_NAME_KEY).await
    }

    /// Persist the submitter display name; empty names are not saved
    pub async fn set_submitter_name(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        self.set(SUBMITTER_NAME_KEY, name).await
    }

    /// Language preference, falling back to the default when unset or
    /// unsupported
    pub async fn language(&self) -> Result<String> {
        let stored = self.get(LANGUAGE_KEY).await?;
        Ok(stored
            .filter(|lang| SUPPORTED_LANGUAGES.contains(&lang.as_str()))
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()))
    }

    /// Persist the language preference
    pub async fn set_language(&self, language: &str) -> Result<()> {
        if !SUPPORTED_LANGUAGES.contains(&language) {
            anyhow::bail!("unsupported language: {}", language);
        }
        self.set(LANGUAGE_KEY, language).await
    }
}

/// Default database file path
fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Confetti")
        .join("settings.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (tempfile::TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::with_path(dir.path().join("settings.db"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn values_round_trip_and_overwrite() {
        let (_dir, store) = temp_store().await;

        assert!(store.get("missing").await.unwrap().is_none());

        store.set("key", "first").await.unwrap();
        assert_eq!(store.get("key").await.unwrap().as_deref(), Some("first"));

        store.set("key", "second").await.unwrap();
        assert_eq!(store.get("key").await.unwrap().as_deref(), Some("second"));

        store.delete("key").await.unwrap();
        assert!(store.get("key").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn submitter_name_skips_empty_values() {
        let (_dir, store) = temp_store().await;

        store.set_submitter_name("  ").await.unwrap();
        assert!(store.submitter_name().await.unwrap().is_none());

        store.set_submitter_name("Ana").await.unwrap();
        assert_eq!(store.submitter_name().await.unwrap().as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn language_falls_back_to_the_default() {
        let (_dir, store) = temp_store().await;
        assert_eq!(store.language().await.unwrap(), "it");

        store.set_language("ro").await.unwrap();
        assert_eq!(store.language().await.unwrap(), "ro");

        assert!(store.set_language("en").await.is_err());
        assert_eq!(store.language().await.unwrap(), "ro");

        // A stale unsupported value degrades to the default on read.
        store.set(LANGUAGE_KEY, "de").await.unwrap();
        assert_eq!(store.language().await.unwrap(), "it");
    }
}
