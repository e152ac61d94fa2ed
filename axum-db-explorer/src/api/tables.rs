//! Dashboard and schema report endpoints

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Json, Response};
use serde_json::json;

use crate::api::wants_json;
use crate::layer::ExplorerState;
use crate::views;
use crate::Result;

/// Handler for GET /
///
/// Lists every table and view in the active database.
pub async fn dashboard_handler(
    State(state): State<ExplorerState>,
    headers: HeaderMap,
) -> Result<Response> {
    let inspector = state.inspector().await?;
    let tables = inspector.tables().await?;

    if wants_json(&headers) {
        return Ok(Json(json!({
            "database": inspector.database(),
            "tables": tables,
        }))
        .into_response());
    }

    Ok(Html(views::render_dashboard(
        &state.base_path,
        inspector.database(),
        &tables,
    ))
    .into_response())
}

/// Handler for GET /schema
///
/// A printable report: every table with its columns and foreign keys.
pub async fn schema_report_handler(
    State(state): State<ExplorerState>,
    headers: HeaderMap,
) -> Result<Response> {
    let inspector = state.inspector().await?;
    let tables = inspector.tables().await?;

    let mut entries = Vec::with_capacity(tables.len());
    for table in &tables {
        let columns = inspector.columns(&table.name).await?;
        let foreign_keys = inspector.foreign_keys(&table.name).await?;
        entries.push(views::SchemaEntry {
            table: table.clone(),
            columns,
            foreign_keys,
        });
    }

    if wants_json(&headers) {
        let payload: Vec<_> = entries
            .iter()
            .map(|entry| {
                json!({
                    "table_name": entry.table.name,
                    "display_name": entry.table.display_name,
                    "table_type": entry.table.table_type,
                    "columns": entry.columns,
                    "foreignKeys": entry.foreign_keys,
                })
            })
            .collect();
        return Ok(Json(json!({
            "database": inspector.database(),
            "schema": payload,
        }))
        .into_response());
    }

    Ok(Html(views::render_schema_report(
        &state.base_path,
        inspector.database(),
        &tables,
        &entries,
    ))
    .into_response())
}
