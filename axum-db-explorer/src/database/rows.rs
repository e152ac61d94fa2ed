//! Row browsing: search, sort, pagination, and record lookup
//!
//! All sorting and searching is delegated to MySQL; this module only assembles
//! the SQL (with every identifier backtick-quoted and every value bound) and
//! decodes result rows into JSON.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, MySqlPool, Row, TypeInfo, ValueRef};

use crate::database::inspector::MySqlInspector;
use crate::schema::{
    BrowseParams, ColumnDescriptor, ForeignKeyDescriptor, Pagination, SortDirection,
};
use crate::Result;

/// Data types whose columns participate in text search.
const SEARCHABLE_TYPES: &[&str] = &[
    "char",
    "varchar",
    "text",
    "tinytext",
    "mediumtext",
    "longtext",
    "enum",
    "set",
    "json",
    "date",
    "datetime",
    "timestamp",
];

const STRING_DISPLAY_TYPES: &[&str] = &["varchar", "char", "text", "tinytext", "mediumtext", "longtext"];
const DATE_DISPLAY_TYPES: &[&str] = &["date", "datetime", "timestamp"];

/// Cap on rows fetched for a foreign-key dropdown.
const FIELD_OPTION_LIMIT: u32 = 200;

/// Quote an identifier with backticks to prevent SQL injection.
pub(crate) fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Escape `\`, `%`, and `_` so a LIKE pattern matches them literally.
pub(crate) fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

pub(crate) fn searchable_columns(columns: &[ColumnDescriptor]) -> Vec<&str> {
    columns
        .iter()
        .filter(|column| SEARCHABLE_TYPES.contains(&column.data_type.as_str()))
        .map(|column| column.name.as_str())
        .collect()
}

pub(crate) fn find_auto_increment_column(columns: &[ColumnDescriptor]) -> Option<&str> {
    columns
        .iter()
        .find(|column| column.auto_increment)
        .map(|column| column.name.as_str())
}

pub(crate) fn find_primary_key_column(columns: &[ColumnDescriptor]) -> Option<&str> {
    columns
        .iter()
        .find(|column| column.key == crate::schema::KeyKind::Primary)
        .map(|column| column.name.as_str())
}

/// Resolve the ORDER BY chain for a browse request.
///
/// An explicit `sort` naming an existing column is honored (with the primary
/// key, else the auto-increment column, as a stabilizing secondary key);
/// anything else falls back to the auto-increment column, then `id`, then no
/// ordering at all.
pub(crate) fn resolve_order_by(
    column_names: &[String],
    sort: Option<&str>,
    direction: Option<SortDirection>,
    default_direction: SortDirection,
    auto_increment: Option<&str>,
    primary_key: Option<&str>,
) -> Vec<(String, SortDirection)> {
    let direction = direction.unwrap_or(default_direction);

    if let Some(sort) = sort {
        if column_names.iter().any(|name| name == sort) {
            let mut chain = vec![(sort.to_string(), direction)];
            if let Some(pk) = primary_key.filter(|pk| *pk != sort) {
                chain.push((pk.to_string(), direction));
            } else if let Some(ai) = auto_increment.filter(|ai| *ai != sort) {
                chain.push((ai.to_string(), direction));
            }
            return chain;
        }
    }

    if let Some(ai) = auto_increment {
        if column_names.iter().any(|name| name == ai) {
            return vec![(ai.to_string(), default_direction)];
        }
    }

    if column_names.iter().any(|name| name == "id") {
        return vec![("id".to_string(), default_direction)];
    }

    Vec::new()
}

/// Decode one MySQL row into a JSON object keyed by column name.
pub(crate) fn row_to_json(row: &MySqlRow) -> Result<Value> {
    let mut map = serde_json::Map::new();

    for column in row.columns() {
        let name = column.name();
        map.insert(name.to_string(), extract_column_value(row, name, column.type_info().name())?);
    }

    Ok(Value::Object(map))
}

fn extract_column_value(row: &MySqlRow, name: &str, type_name: &str) -> Result<Value> {
    if row.try_get_raw(name)?.is_null() {
        return Ok(Value::Null);
    }

    let value = match type_name {
        "BOOLEAN" => {
            let value: bool = row.try_get(name)?;
            Value::Bool(value)
        }
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            let value: i64 = row.try_get(name)?;
            Value::Number(value.into())
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "BIT" => {
            let value: u64 = row.try_get(name)?;
            Value::Number(value.into())
        }
        "YEAR" => {
            let value: u16 = row.try_get(name)?;
            Value::Number(u64::from(value).into())
        }
        "FLOAT" => {
            let value: f32 = row.try_get(name)?;
            serde_json::Number::from_f64(f64::from(value))
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }
        "DOUBLE" => {
            let value: f64 = row.try_get(name)?;
            serde_json::Number::from_f64(value)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }
        // Kept as a string to preserve precision.
        "DECIMAL" => {
            let value: rust_decimal::Decimal = row.try_get(name)?;
            Value::String(value.to_string())
        }
        "DATE" => {
            let value: chrono::NaiveDate = row.try_get(name)?;
            Value::String(value.format("%Y-%m-%d").to_string())
        }
        "TIME" => {
            let value: chrono::NaiveTime = row.try_get(name)?;
            Value::String(value.format("%H:%M:%S").to_string())
        }
        "DATETIME" => {
            let value: chrono::NaiveDateTime = row.try_get(name)?;
            Value::String(value.format("%Y-%m-%d %H:%M:%S").to_string())
        }
        "TIMESTAMP" => {
            let value: chrono::DateTime<chrono::Utc> = row.try_get(name)?;
            Value::String(value.format("%Y-%m-%d %H:%M:%S").to_string())
        }
        "JSON" => {
            let value: Value = row.try_get(name)?;
            value
        }
        "CHAR" | "VARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" => {
            let value: String = row.try_get(name)?;
            Value::String(value)
        }
        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            let value: Vec<u8> = row.try_get(name)?;
            Value::String(format!("[BLOB: {} bytes]", value.len()))
        }
        _ => {
            // Fallback: try to get as string.
            let value: Option<String> = row.try_get(name).ok().flatten();
            value.map(Value::String).unwrap_or(Value::Null)
        }
    };

    Ok(value)
}

/// Plain string form of a JSON scalar, for binding and for keying lookups.
pub(crate) fn value_to_plain_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).ok(),
    }
}

/// Fetch one page of rows with search and ordering applied.
pub(crate) async fn fetch_page(
    pool: &MySqlPool,
    physical_table: &str,
    columns: &[ColumnDescriptor],
    params: &BrowseParams,
    per_page: u32,
    default_direction: SortDirection,
) -> Result<(Vec<Value>, Pagination)> {
    let column_names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
    let quoted_table = quote_identifier(physical_table);

    let searchable = searchable_columns(columns);
    let pattern = params
        .search
        .as_deref()
        .filter(|_| !searchable.is_empty())
        .map(|term| format!("%{}%", escape_like(term)));

    let where_clause = if pattern.is_some() {
        let conditions: Vec<String> = searchable
            .iter()
            .map(|column| format!("{} LIKE ?", quote_identifier(column)))
            .collect();
        format!(" WHERE ({})", conditions.join(" OR "))
    } else {
        String::new()
    };

    // Total count with the same filter applied.
    let count_sql = format!("SELECT COUNT(*) FROM {quoted_table}{where_clause}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(pattern) = &pattern {
        for _ in &searchable {
            count_query = count_query.bind(pattern.clone());
        }
    }
    let total = count_query.fetch_one(pool).await?.max(0) as u64;

    let order_by = resolve_order_by(
        &column_names,
        params.sort.as_deref(),
        params.direction,
        default_direction,
        find_auto_increment_column(columns),
        find_primary_key_column(columns),
    );
    let order_clause = if order_by.is_empty() {
        String::new()
    } else {
        let parts: Vec<String> = order_by
            .iter()
            .map(|(column, direction)| {
                format!("{} {}", quote_identifier(column), direction.as_sql())
            })
            .collect();
        format!(" ORDER BY {}", parts.join(", "))
    };

    let offset = u64::from(params.page.saturating_sub(1)) * u64::from(per_page);
    let sql = format!(
        "SELECT * FROM {quoted_table}{where_clause}{order_clause} LIMIT {per_page} OFFSET {offset}"
    );

    let mut query = sqlx::query(&sql);
    if let Some(pattern) = &pattern {
        for _ in &searchable {
            query = query.bind(pattern.clone());
        }
    }

    let rows = query.fetch_all(pool).await?;
    let items = rows.iter().map(row_to_json).collect::<Result<Vec<_>>>()?;

    Ok((items, Pagination::new(total, per_page, params.page)))
}

/// Fetch a single record by key column value. `None` when absent.
pub(crate) async fn fetch_record(
    pool: &MySqlPool,
    physical_table: &str,
    key_column: &str,
    id: &str,
) -> Result<Option<serde_json::Map<String, Value>>> {
    let sql = format!(
        "SELECT * FROM {} WHERE {} = ? LIMIT 1",
        quote_identifier(physical_table),
        quote_identifier(key_column)
    );

    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

    match row {
        Some(row) => match row_to_json(&row)? {
            Value::Object(map) => Ok(Some(map)),
            _ => Ok(None),
        },
        None => Ok(None),
    }
}

/// First column suitable for labeling rows of a table: string types win, then
/// date types. `None` means the table has no usable display column.
pub(crate) fn find_display_column(columns: &[ColumnDescriptor]) -> Option<&str> {
    columns
        .iter()
        .find(|column| STRING_DISPLAY_TYPES.contains(&column.data_type.as_str()))
        .or_else(|| {
            columns
                .iter()
                .find(|column| DATE_DISPLAY_TYPES.contains(&column.data_type.as_str()))
        })
        .map(|column| column.name.as_str())
}

struct DisplayBatch {
    referenced_column: String,
    display_column: String,
    /// Distinct referenced values, keyed by their plain string form.
    values: BTreeMap<String, String>,
    /// Owning column → referenced value (plain string form).
    mapping: Vec<(String, String)>,
}

/// Resolve human-readable labels for a record's foreign-key values, batching
/// one query per referenced table. Columns with no resolvable display column
/// are silently omitted (best-effort for a read-only convenience feature).
pub(crate) async fn foreign_key_display_values(
    inspector: &MySqlInspector,
    pool: &MySqlPool,
    foreign_keys: &[ForeignKeyDescriptor],
    record: &serde_json::Map<String, Value>,
) -> Result<BTreeMap<String, Value>> {
    let mut batches: BTreeMap<String, DisplayBatch> = BTreeMap::new();
    let mut display_column_cache: BTreeMap<String, Option<String>> = BTreeMap::new();

    for fk in foreign_keys {
        let Some(value) = record.get(&fk.column) else {
            continue;
        };
        let Some(plain) = value_to_plain_string(value).filter(|plain| !plain.is_empty()) else {
            continue;
        };

        if !display_column_cache.contains_key(&fk.referenced_table) {
            let columns = inspector.columns(&fk.referenced_table).await?;
            display_column_cache.insert(
                fk.referenced_table.clone(),
                find_display_column(&columns).map(String::from),
            );
        }
        let Some(display_column) = display_column_cache[&fk.referenced_table].clone() else {
            continue;
        };

        let batch = batches
            .entry(fk.referenced_table.clone())
            .or_insert_with(|| DisplayBatch {
                referenced_column: fk.referenced_column.clone(),
                display_column,
                values: BTreeMap::new(),
                mapping: Vec::new(),
            });

        batch.values.insert(plain.clone(), plain.clone());
        batch.mapping.push((fk.column.clone(), plain));
    }

    let mut display = BTreeMap::new();
    for (referenced_table, batch) in batches {
        let physical = inspector.physical_name(&referenced_table);
        let placeholders = vec!["?"; batch.values.len()].join(", ");
        let sql = format!(
            "SELECT {key} AS ref_value, {label} AS display_value FROM {table} WHERE {key} IN ({placeholders})",
            key = quote_identifier(&batch.referenced_column),
            label = quote_identifier(&batch.display_column),
            table = quote_identifier(&physical),
        );

        let mut query = sqlx::query(&sql);
        for value in batch.values.keys() {
            query = query.bind(value.clone());
        }

        let rows = query.fetch_all(pool).await?;
        let mut labels: BTreeMap<String, Value> = BTreeMap::new();
        for row in &rows {
            let key = extract_column_value(row, "ref_value", row.column(0).type_info().name())?;
            let label = extract_column_value(row, "display_value", row.column(1).type_info().name())?;
            if let Some(key) = value_to_plain_string(&key) {
                labels.insert(key, label);
            }
        }

        for (column, plain) in batch.mapping {
            if let Some(label) = labels.get(&plain) {
                display.insert(column, label.clone());
            }
        }
    }

    Ok(display)
}

/// One choice in a select widget.
#[derive(Debug, Clone, Serialize)]
pub struct FieldOption {
    pub value: Value,
    pub label: String,
}

/// Options for editor widgets: enum labels per enum column and referenced
/// rows (capped) per foreign-key column.
pub(crate) async fn field_options(
    inspector: &MySqlInspector,
    pool: &MySqlPool,
    columns: &[ColumnDescriptor],
    foreign_keys: &[ForeignKeyDescriptor],
) -> Result<BTreeMap<String, Vec<FieldOption>>> {
    let mut options: BTreeMap<String, Vec<FieldOption>> = BTreeMap::new();

    for column in columns {
        if column.data_type == "enum" && !column.enum_values.is_empty() {
            options.insert(
                column.name.clone(),
                column
                    .enum_values
                    .iter()
                    .map(|value| FieldOption {
                        value: Value::String(value.clone()),
                        label: value.clone(),
                    })
                    .collect(),
            );
        }
    }

    for fk in foreign_keys {
        let referenced_columns = inspector.columns(&fk.referenced_table).await?;
        let display_column = find_display_column(&referenced_columns)
            .unwrap_or(fk.referenced_column.as_str())
            .to_string();

        let physical = inspector.physical_name(&fk.referenced_table);
        let sql = format!(
            "SELECT {key} AS ref_value, {label} AS display_value FROM {table} LIMIT {limit}",
            key = quote_identifier(&fk.referenced_column),
            label = quote_identifier(&display_column),
            table = quote_identifier(&physical),
            limit = FIELD_OPTION_LIMIT,
        );

        let rows = sqlx::query(&sql).fetch_all(pool).await?;
        let mut choices = Vec::with_capacity(rows.len());
        for row in &rows {
            let value = extract_column_value(row, "ref_value", row.column(0).type_info().name())?;
            let label_value =
                extract_column_value(row, "display_value", row.column(1).type_info().name())?;
            let label = value_to_plain_string(&label_value)
                .or_else(|| value_to_plain_string(&value))
                .unwrap_or_default();
            choices.push(FieldOption { value, label });
        }

        options.insert(fk.column.clone(), choices);
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::KeyKind;

    fn column(name: &str, data_type: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.into(),
            data_type: data_type.into(),
            column_type: data_type.into(),
            nullable: true,
            key: KeyKind::None,
            auto_increment: false,
            unsigned: false,
            character_maximum_length: None,
            enum_values: Vec::new(),
        }
    }

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn identifiers_are_backtick_quoted() {
        assert_eq!(quote_identifier("users"), "`users`");
        assert_eq!(quote_identifier("weird`name"), "`weird``name`");
    }

    #[test]
    fn like_wildcards_are_escaped_literally() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn searchable_columns_cover_string_and_date_families() {
        let columns = vec![
            column("id", "bigint"),
            column("name", "varchar"),
            column("bio", "text"),
            column("status", "enum"),
            column("settings", "json"),
            column("created_at", "timestamp"),
            column("score", "double"),
        ];
        assert_eq!(
            searchable_columns(&columns),
            vec!["name", "bio", "status", "settings", "created_at"]
        );
    }

    #[test]
    fn unknown_sort_falls_back_to_auto_increment_then_id() {
        let columns = names(&["id", "name", "created_at"]);

        let chain = resolve_order_by(
            &columns,
            Some("unknown_column"),
            Some(SortDirection::Asc),
            SortDirection::Desc,
            Some("id"),
            Some("id"),
        );
        assert_eq!(chain, vec![("id".to_string(), SortDirection::Desc)]);

        let chain = resolve_order_by(
            &columns,
            Some("unknown_column"),
            None,
            SortDirection::Desc,
            None,
            None,
        );
        assert_eq!(chain, vec![("id".to_string(), SortDirection::Desc)]);

        let chain = resolve_order_by(
            &names(&["uuid", "name"]),
            Some("unknown_column"),
            None,
            SortDirection::Desc,
            None,
            None,
        );
        assert!(chain.is_empty());
    }

    #[test]
    fn explicit_sort_gets_a_stable_secondary_key() {
        let columns = names(&["id", "name", "created_at"]);

        let chain = resolve_order_by(
            &columns,
            Some("name"),
            Some(SortDirection::Asc),
            SortDirection::Desc,
            Some("id"),
            Some("id"),
        );
        assert_eq!(
            chain,
            vec![
                ("name".to_string(), SortDirection::Asc),
                ("id".to_string(), SortDirection::Asc),
            ]
        );

        // Sorting by the key itself must not duplicate it.
        let chain = resolve_order_by(
            &columns,
            Some("id"),
            Some(SortDirection::Asc),
            SortDirection::Desc,
            Some("id"),
            Some("id"),
        );
        assert_eq!(chain, vec![("id".to_string(), SortDirection::Asc)]);
    }

    #[test]
    fn display_column_prefers_strings_over_dates() {
        let columns = vec![
            column("id", "bigint"),
            column("created_at", "timestamp"),
            column("title", "varchar"),
        ];
        assert_eq!(find_display_column(&columns), Some("title"));

        let columns = vec![column("id", "bigint"), column("created_at", "timestamp")];
        assert_eq!(find_display_column(&columns), Some("created_at"));

        let columns = vec![column("id", "bigint"), column("score", "double")];
        assert_eq!(find_display_column(&columns), None);
    }

    #[test]
    fn plain_string_form_of_json_scalars() {
        assert_eq!(value_to_plain_string(&Value::Null), None);
        assert_eq!(value_to_plain_string(&Value::from(42)), Some("42".into()));
        assert_eq!(value_to_plain_string(&Value::from("x")), Some("x".into()));
        assert_eq!(value_to_plain_string(&Value::from(true)), Some("1".into()));
    }
}
