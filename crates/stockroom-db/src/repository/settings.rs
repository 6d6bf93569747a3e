//! # Settings Repository
//!
//! Whole-document reads and upserts keyed by [`SettingsDocument::SECTION`].

use chrono::Utc;
use sqlx::SqlitePool;
use stockroom_core::settings::SettingsDocument;
use stockroom_core::CoreError;
use tracing::{debug, info};

use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// The stored document, or its defaults when the section was never saved.
    pub async fn get<T: SettingsDocument>(&self) -> DbResult<T> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT document FROM settings WHERE section = ?")
                .bind(T::SECTION)
                .fetch_optional(&self.pool)
                .await?;

        match stored {
            Some(document) => Ok(serde_json::from_str(&document)?),
            None => {
                debug!(section = T::SECTION, "Settings not saved yet, using defaults");
                Ok(T::default())
            }
        }
    }

    /// Validates and replaces the whole document.
    pub async fn put<T: SettingsDocument>(&self, document: &T) -> DbResult<()> {
        document.validate().map_err(CoreError::from)?;
        let json = serde_json::to_string(document)?;

        sqlx::query(
            r#"
            INSERT INTO settings (section, document, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(section) DO UPDATE SET
                document = excluded.document,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(T::SECTION)
        .bind(json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(section = T::SECTION, "Settings saved");
        Ok(())
    }
}
