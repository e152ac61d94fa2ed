//! MySQL schema inspector
//!
//! Issues `information_schema` queries for tables, columns, foreign keys, and
//! indexes of the active database. Routes use logical (prefix-stripped) table
//! names; every query re-applies the prefix to get back to the physical name.
//! Nothing is cached; every call re-queries the metadata views.

use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::{MySqlPool, Row};

use crate::schema::{
    ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, KeyKind, TableDescriptor, TableType,
};
use crate::{Error, Result};

/// Schema inspector bound to one pool, database, and table-name prefix.
pub struct MySqlInspector {
    pool: MySqlPool,
    database: String,
    prefix: String,
}

/// Strip `prefix` from a physical table name, yielding the logical name.
/// Names that do not carry the prefix pass through unchanged.
pub(crate) fn strip_table_prefix<'a>(physical: &'a str, prefix: &str) -> &'a str {
    if !prefix.is_empty() {
        if let Some(stripped) = physical.strip_prefix(prefix) {
            return stripped;
        }
    }
    physical
}

/// Extract enum labels from a MySQL column_type definition.
///
/// `enum('draft','published','punch-in')` → `["draft", "published", "punch-in"]`.
/// Embedded quotes arrive backslash-escaped and are unescaped in the output.
pub(crate) fn extract_enum_values(column_type: &str) -> Vec<String> {
    static LABEL: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"'((?:\\'|[^'])*)'").expect("enum label pattern")
    });

    LABEL
        .captures_iter(column_type)
        .map(|captures| captures[1].replace("\\'", "'"))
        .collect()
}

impl MySqlInspector {
    pub fn new(pool: MySqlPool, database: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            pool,
            database: database.into(),
            prefix: prefix.into(),
        }
    }

    /// Resolve the active database via `SELECT DATABASE()` and build an
    /// inspector for it. Errors when the connection has no default schema.
    pub async fn connect(pool: &MySqlPool, prefix: impl Into<String>) -> Result<Self> {
        let database: Option<String> = sqlx::query_scalar("SELECT DATABASE()")
            .fetch_one(pool)
            .await?;

        let database = database.ok_or_else(|| {
            Error::Conflict("connection has no default database selected".into())
        })?;

        Ok(Self::new(pool.clone(), database, prefix))
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Physical table name for a logical one (prefix re-applied).
    pub fn physical_name(&self, logical: &str) -> String {
        format!("{}{}", self.prefix, logical)
    }

    /// All tables and views in the active schema, ordered by name ascending.
    pub async fn tables(&self) -> Result<Vec<TableDescriptor>> {
        let rows = sqlx::query(
            r#"
            SELECT TABLE_NAME AS table_name, TABLE_TYPE AS table_type
            FROM information_schema.tables
            WHERE TABLE_SCHEMA = ?
            ORDER BY TABLE_NAME ASC
            "#,
        )
        .bind(&self.database)
        .fetch_all(&self.pool)
        .await?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in rows {
            let physical: String = row.try_get("table_name")?;
            let table_type: String = row.try_get("table_type")?;

            tables.push(TableDescriptor {
                name: strip_table_prefix(&physical, &self.prefix).to_string(),
                display_name: physical,
                table_type: TableType::parse(&table_type),
            });
        }

        Ok(tables)
    }

    /// Look up one table by logical name. `None` when absent (caller 404s).
    pub async fn table(&self, logical: &str) -> Result<Option<TableDescriptor>> {
        let physical = self.physical_name(logical);

        let row = sqlx::query(
            r#"
            SELECT TABLE_NAME AS table_name, TABLE_TYPE AS table_type
            FROM information_schema.tables
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            LIMIT 1
            "#,
        )
        .bind(&self.database)
        .bind(&physical)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row
            .map(|row| -> std::result::Result<TableDescriptor, sqlx::Error> {
                let physical: String = row.try_get("table_name")?;
                let table_type: String = row.try_get("table_type")?;
                Ok(TableDescriptor {
                    name: strip_table_prefix(&physical, &self.prefix).to_string(),
                    display_name: physical,
                    table_type: TableType::parse(&table_type),
                })
            })
            .transpose()?)
    }

    /// Column descriptors for a logical table, in ordinal position order.
    /// Enum labels and character lengths are captured here so downstream logic
    /// never re-parses the raw type string.
    pub async fn columns(&self, logical: &str) -> Result<Vec<ColumnDescriptor>> {
        let physical = self.physical_name(logical);

        let rows = sqlx::query(
            r#"
            SELECT
                COLUMN_NAME AS column_name,
                DATA_TYPE AS data_type,
                COLUMN_TYPE AS column_type,
                IS_NULLABLE AS is_nullable,
                COLUMN_KEY AS column_key,
                EXTRA AS extra,
                CAST(CHARACTER_MAXIMUM_LENGTH AS SIGNED) AS character_maximum_length
            FROM information_schema.columns
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION ASC
            "#,
        )
        .bind(&self.database)
        .bind(&physical)
        .fetch_all(&self.pool)
        .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("column_name")?;
            let data_type: String = row.try_get::<String, _>("data_type")?.to_lowercase();
            let column_type: String = row.try_get::<String, _>("column_type")?.to_lowercase();
            let is_nullable: String = row.try_get("is_nullable")?;
            let column_key: String = row.try_get("column_key")?;
            let extra: String = row.try_get("extra")?;
            let character_maximum_length: Option<i64> = row.try_get("character_maximum_length")?;

            let enum_values = if data_type == "enum" {
                extract_enum_values(&column_type)
            } else {
                Vec::new()
            };

            columns.push(ColumnDescriptor {
                name,
                nullable: is_nullable == "YES",
                key: KeyKind::parse(&column_key),
                auto_increment: extra.to_lowercase().contains("auto_increment"),
                unsigned: column_type.contains("unsigned"),
                character_maximum_length: character_maximum_length
                    .and_then(|len| u32::try_from(len).ok()),
                enum_values,
                data_type,
                column_type,
            });
        }

        Ok(columns)
    }

    /// Foreign keys owned by columns of a logical table. The referenced table
    /// name is prefix-stripped for routing, with the physical name preserved
    /// for display.
    pub async fn foreign_keys(&self, logical: &str) -> Result<Vec<ForeignKeyDescriptor>> {
        let physical = self.physical_name(logical);

        let rows = sqlx::query(
            r#"
            SELECT
                COLUMN_NAME AS column_name,
                REFERENCED_TABLE_NAME AS referenced_table_name,
                REFERENCED_COLUMN_NAME AS referenced_column_name
            FROM information_schema.key_column_usage
            WHERE TABLE_SCHEMA = ?
              AND TABLE_NAME = ?
              AND REFERENCED_TABLE_NAME IS NOT NULL
            "#,
        )
        .bind(&self.database)
        .bind(&physical)
        .fetch_all(&self.pool)
        .await?;

        let mut keys = Vec::with_capacity(rows.len());
        for row in rows {
            let column: String = row.try_get("column_name")?;
            let referenced_physical: String = row.try_get("referenced_table_name")?;
            let referenced_column: String = row.try_get("referenced_column_name")?;

            keys.push(ForeignKeyDescriptor {
                column,
                referenced_table: strip_table_prefix(&referenced_physical, &self.prefix)
                    .to_string(),
                referenced_table_display_name: referenced_physical,
                referenced_column,
            });
        }

        Ok(keys)
    }

    /// Index member rows for a logical table, ordered for grouping by index
    /// name then sequence position.
    pub async fn indexes(&self, logical: &str) -> Result<Vec<IndexDescriptor>> {
        let physical = self.physical_name(logical);

        let rows = sqlx::query(
            r#"
            SELECT
                INDEX_NAME AS index_name,
                COLUMN_NAME AS column_name,
                CAST(NON_UNIQUE AS SIGNED) AS non_unique,
                CAST(SEQ_IN_INDEX AS UNSIGNED) AS seq_in_index,
                INDEX_TYPE AS index_type
            FROM information_schema.statistics
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY INDEX_NAME ASC, SEQ_IN_INDEX ASC
            "#,
        )
        .bind(&self.database)
        .bind(&physical)
        .fetch_all(&self.pool)
        .await?;

        let mut indexes = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("index_name")?;
            let column: String = row.try_get("column_name")?;
            let non_unique: i64 = row.try_get("non_unique")?;
            let sequence: u64 = row.try_get("seq_in_index")?;
            let index_type: String = row.try_get("index_type")?;

            indexes.push(IndexDescriptor {
                name,
                column,
                unique: non_unique == 0,
                sequence: sequence as u32,
                index_type,
            });
        }

        Ok(indexes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_stripped_only_when_present() {
        assert_eq!(strip_table_prefix("wp_users", "wp_"), "users");
        assert_eq!(strip_table_prefix("sessions", "wp_"), "sessions");
        assert_eq!(strip_table_prefix("wp_users", ""), "wp_users");
        // A name equal to the prefix strips to the empty string, as the raw
        // substring rule dictates.
        assert_eq!(strip_table_prefix("wp_", "wp_"), "");
    }

    #[tokio::test]
    async fn physical_names_reapply_the_prefix() {
        let pool = sqlx::MySqlPool::connect_lazy("mysql://root@localhost/app")
            .expect("lazy pool");
        let inspector = MySqlInspector::new(pool, "app", "wp_");

        assert_eq!(inspector.physical_name("users"), "wp_users");
        assert_eq!(strip_table_prefix(&inspector.physical_name("users"), inspector.prefix()), "users");
        assert_eq!(inspector.database(), "app");
    }

    #[test]
    fn enum_labels_are_extracted_in_order() {
        assert_eq!(
            extract_enum_values("enum('authorization','global_settings','punch-in')"),
            vec!["authorization", "global_settings", "punch-in"]
        );
    }

    #[test]
    fn enum_extraction_handles_escaped_quotes_and_empty_input() {
        assert_eq!(
            extract_enum_values(r"enum('it\'s','plain')"),
            vec!["it's", "plain"]
        );
        assert_eq!(extract_enum_values(""), Vec::<String>::new());
        assert_eq!(extract_enum_values("int(11)"), Vec::<String>::new());
    }
}
