//! HTTP endpoints
//!
//! Each request is stateless: the table context (metadata, presentation types,
//! and the current page of rows) is resolved from scratch, then rendered as
//! JSON or HTML depending on what the client asked for.

use std::collections::{BTreeMap, HashSet};

use axum::http::{header, HeaderMap};
use serde_json::Value;

use crate::database::inspector::MySqlInspector;
use crate::database::rows::{self, FieldOption};
use crate::layer::ExplorerState;
use crate::presentation::{self, PresentationType};
use crate::schema::{
    BrowseParams, ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, Pagination, TableType,
};
use crate::{Error, Result};

pub mod browse;
pub mod presentation_type;
pub mod records;
pub mod tables;

// Re-export handlers for convenience
pub use browse::{browse_table_handler, show_record_handler};
pub use presentation_type::update_presentation_type_handler;
pub use records::{delete_record_handler, store_record_handler, update_record_handler};
pub use tables::{dashboard_handler, schema_report_handler};

/// Whether the client asked for JSON (explicit Accept or an XHR marker);
/// everything else gets server-rendered HTML.
pub(crate) fn wants_json(headers: &HeaderMap) -> bool {
    let accepts_json = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(|accept| accept.contains("application/json") || accept.contains("text/json"))
        .unwrap_or(false);

    let is_xhr = headers
        .get("x-requested-with")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.eq_ignore_ascii_case("XMLHttpRequest"))
        .unwrap_or(false);

    accepts_json || is_xhr
}

/// Everything a table request needs, resolved fresh per request.
pub(crate) struct TableContext {
    pub table: String,
    pub physical_table: String,
    pub table_type: TableType,
    pub columns: Vec<ColumnDescriptor>,
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
    pub indexes: Vec<IndexDescriptor>,
    pub primary_key_column: Option<String>,
    pub allowed_types_by_column: BTreeMap<String, Vec<PresentationType>>,
    pub presentation_types: BTreeMap<String, PresentationType>,
    pub field_options: BTreeMap<String, Vec<FieldOption>>,
    pub rows: Vec<Value>,
    pub pagination: Pagination,
}

impl TableContext {
    /// The column a record lookup keys on: the primary key, else `id`.
    pub fn record_key_column(&self) -> &str {
        self.primary_key_column.as_deref().unwrap_or("id")
    }

    pub fn presentation_type_options_by_column(
        &self,
    ) -> BTreeMap<String, Vec<presentation::PresentationTypeOption>> {
        self.allowed_types_by_column
            .iter()
            .map(|(column, types)| (column.clone(), presentation::options_for_types(types)))
            .collect()
    }
}

/// Resolve the full context for one table or fail with NotFound.
pub(crate) async fn build_table_context(
    state: &ExplorerState,
    inspector: &MySqlInspector,
    table: &str,
    params: &BrowseParams,
) -> Result<TableContext> {
    // The logical name must come from the accessible table list; this also
    // keeps prefix-bypassing physical names out of the routes.
    let all_tables = inspector.tables().await?;
    if !all_tables.iter().any(|t| t.name == table) {
        return Err(Error::NotFound("Table not found".into()));
    }

    let table_meta = inspector
        .table(table)
        .await?
        .ok_or_else(|| Error::NotFound("Table not found".into()))?;

    let columns = inspector.columns(table).await?;
    let foreign_keys = inspector.foreign_keys(table).await?;
    let indexes = inspector.indexes(table).await?;
    let physical_table = inspector.physical_name(table);

    let primary_key_column = rows::find_primary_key_column(&columns).map(String::from);
    let foreign_key_columns: HashSet<String> =
        foreign_keys.iter().map(|fk| fk.column.clone()).collect();

    let allowed_types_by_column =
        presentation::allowed_types_by_column(&columns, &foreign_key_columns);
    let presentation_types = state
        .store()
        .resolve_for_table(
            state.config.user_scope,
            inspector.database(),
            table,
            &columns,
            &foreign_key_columns,
            &allowed_types_by_column,
        )
        .await?;

    let field_options =
        rows::field_options(inspector, &state.pool, &columns, &foreign_keys).await?;

    let (rows, pagination) = rows::fetch_page(
        &state.pool,
        &physical_table,
        &columns,
        params,
        state.config.per_page(),
        state.config.default_sort_direction,
    )
    .await?;

    Ok(TableContext {
        table: table.to_string(),
        physical_table,
        table_type: table_meta.table_type,
        columns,
        foreign_keys,
        indexes,
        primary_key_column,
        allowed_types_by_column,
        presentation_types,
        field_options,
        rows,
        pagination,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn json_is_negotiated_from_accept_or_xhr() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json(&headers));

        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html"));
        assert!(!wants_json(&headers));

        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );
        assert!(wants_json(&headers));

        let mut headers = HeaderMap::new();
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        assert!(wants_json(&headers));
    }
}
