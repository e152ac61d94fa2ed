//! Persisted per-column presentation overrides
//!
//! One auxiliary table maps (user id or null, database, table, column) to a
//! chosen presentation type. The MySQL data type recorded at save time is an
//! audit/staleness signal only. Rows are upserted, never deleted.

use std::collections::{BTreeMap, HashMap, HashSet};

use sqlx::{MySqlPool, Row};

use crate::presentation::{self, PresentationType};
use crate::schema::ColumnDescriptor;
use crate::Result;

/// Logical name of the auxiliary table; the configured table prefix is applied
/// the same way it is for inspected tables.
pub const PRESENTATION_TABLE: &str = "db_explorer_column_presentations";

/// A stored override row.
#[derive(Debug, Clone)]
pub struct ColumnPresentation {
    pub user_id: Option<u64>,
    pub database_name: String,
    pub table_name: String,
    pub column_name: String,
    pub mysql_data_type: Option<String>,
    pub presentation_type: String,
}

impl ColumnPresentation {
    /// Parsed presentation type; `None` when the stored string is not a member
    /// of the closed set (e.g. written by a newer version).
    pub fn presentation_type(&self) -> Option<PresentationType> {
        PresentationType::parse(&self.presentation_type)
    }
}

/// Store for presentation overrides, bound to one pool and table prefix.
pub struct ColumnPresentationStore {
    pool: MySqlPool,
    prefix: String,
}

impl ColumnPresentationStore {
    pub fn new(pool: MySqlPool, prefix: impl Into<String>) -> Self {
        Self {
            pool,
            prefix: prefix.into(),
        }
    }

    fn physical_table(&self) -> String {
        format!("{}{}", self.prefix, PRESENTATION_TABLE)
    }

    /// Whether the auxiliary table exists in the given database.
    pub async fn has_table(&self, database: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM information_schema.tables
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            "#,
        )
        .bind(database)
        .bind(self.physical_table())
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Create the auxiliary table when absent. Hosts call this once at startup
    /// instead of running a migration.
    pub async fn ensure_table(&self) -> Result<()> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
                user_id BIGINT UNSIGNED NULL,
                database_name VARCHAR(191) NOT NULL,
                table_name VARCHAR(191) NOT NULL,
                column_name VARCHAR(191) NOT NULL,
                mysql_data_type VARCHAR(64) NULL,
                presentation_type VARCHAR(64) NOT NULL,
                created_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
                UNIQUE KEY dbx_col_presentation_unique (user_id, database_name, table_name, column_name),
                KEY dbx_col_presentation_table_idx (database_name, table_name)
            )
            "#,
            crate::database::rows::quote_identifier(&self.physical_table())
        );

        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    pub async fn get(
        &self,
        user: Option<u64>,
        database: &str,
        table: &str,
        column: &str,
    ) -> Result<Option<ColumnPresentation>> {
        let sql = format!(
            r#"
            SELECT user_id, database_name, table_name, column_name, mysql_data_type, presentation_type
            FROM {}
            WHERE user_id <=> ? AND database_name = ? AND table_name = ? AND column_name = ?
            LIMIT 1
            "#,
            crate::database::rows::quote_identifier(&self.physical_table())
        );

        let row = sqlx::query(&sql)
            .bind(user)
            .bind(database)
            .bind(table)
            .bind(column)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::decode_row(&row)).transpose()
    }

    /// All overrides for one table, keyed by column name.
    pub async fn list_for_table(
        &self,
        user: Option<u64>,
        database: &str,
        table: &str,
    ) -> Result<HashMap<String, ColumnPresentation>> {
        let sql = format!(
            r#"
            SELECT user_id, database_name, table_name, column_name, mysql_data_type, presentation_type
            FROM {}
            WHERE user_id <=> ? AND database_name = ? AND table_name = ?
            "#,
            crate::database::rows::quote_identifier(&self.physical_table())
        );

        let rows = sqlx::query(&sql)
            .bind(user)
            .bind(database)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        let mut by_column = HashMap::with_capacity(rows.len());
        for row in &rows {
            let record = Self::decode_row(row)?;
            by_column.insert(record.column_name.clone(), record);
        }

        Ok(by_column)
    }

    /// Insert or update an override. The unique key on the tuple makes the
    /// concurrent-first-view race self-resolving.
    pub async fn upsert(
        &self,
        user: Option<u64>,
        database: &str,
        table: &str,
        column: &str,
        mysql_data_type: &str,
        presentation_type: PresentationType,
    ) -> Result<()> {
        let sql = format!(
            r#"
            INSERT INTO {}
                (user_id, database_name, table_name, column_name, mysql_data_type, presentation_type, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, NOW(), NOW())
            ON DUPLICATE KEY UPDATE
                mysql_data_type = VALUES(mysql_data_type),
                presentation_type = VALUES(presentation_type),
                updated_at = NOW()
            "#,
            crate::database::rows::quote_identifier(&self.physical_table())
        );

        sqlx::query(&sql)
            .bind(user)
            .bind(database)
            .bind(table)
            .bind(column)
            .bind(mysql_data_type)
            .bind(presentation_type.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Effective presentation type per column: stored override when present
    /// and allowed, else the detected default clamped into the allowed set.
    ///
    /// Columns seen for the first time get their detected type persisted as
    /// the initial override (write-through default). When the auxiliary table
    /// is missing the whole resolution degrades to detection only.
    pub async fn resolve_for_table(
        &self,
        user: Option<u64>,
        database: &str,
        table: &str,
        columns: &[ColumnDescriptor],
        foreign_key_columns: &HashSet<String>,
        allowed_by_column: &BTreeMap<String, Vec<PresentationType>>,
    ) -> Result<BTreeMap<String, PresentationType>> {
        let empty: Vec<PresentationType> = Vec::new();

        if !self.has_table(database).await? {
            let mut fallback = BTreeMap::new();
            for column in columns {
                let is_foreign_key = foreign_key_columns.contains(&column.name);
                let detected = presentation::detect(column, is_foreign_key);
                let allowed = allowed_by_column.get(&column.name).unwrap_or(&empty);
                fallback.insert(
                    column.name.clone(),
                    presentation::effective_type(None, detected, allowed),
                );
            }
            return Ok(fallback);
        }

        let existing = self.list_for_table(user, database, table).await?;

        let mut result = BTreeMap::new();
        for column in columns {
            let is_foreign_key = foreign_key_columns.contains(&column.name);
            let detected = presentation::detect(column, is_foreign_key);
            let allowed = allowed_by_column.get(&column.name).unwrap_or(&empty);

            if allowed.is_empty() {
                result.insert(column.name.clone(), detected);
                continue;
            }

            let saved = existing
                .get(&column.name)
                .and_then(|record| record.presentation_type());
            result.insert(
                column.name.clone(),
                presentation::effective_type(saved, detected, allowed),
            );

            if !existing.contains_key(&column.name) {
                if let Err(error) = self
                    .upsert(user, database, table, &column.name, &column.data_type, detected)
                    .await
                {
                    // A lost write-through only delays making the default
                    // explicit; the read path still has its answer.
                    tracing::warn!(
                        table,
                        column = %column.name,
                        %error,
                        "failed to persist detected presentation type"
                    );
                }
            }
        }

        Ok(result)
    }

    fn decode_row(row: &sqlx::mysql::MySqlRow) -> Result<ColumnPresentation> {
        Ok(ColumnPresentation {
            user_id: row.try_get("user_id")?,
            database_name: row.try_get("database_name")?,
            table_name: row.try_get("table_name")?,
            column_name: row.try_get("column_name")?,
            mysql_data_type: row.try_get("mysql_data_type")?,
            presentation_type: row.try_get("presentation_type")?,
        })
    }
}
