//! Table browsing and record detail endpoints

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Json, Response};
use serde_json::json;

use crate::api::{build_table_context, wants_json, TableContext};
use crate::database::rows;
use crate::layer::ExplorerState;
use crate::presentation::{options_for_types, PresentationType};
use crate::schema::BrowseQuery;
use crate::views;
use crate::{Error, Result};

fn browse_json(state: &ExplorerState, ctx: &TableContext) -> serde_json::Value {
    json!({
        "table": ctx.table,
        "physical_table": ctx.physical_table,
        "table_type": ctx.table_type,
        "columns": ctx.columns,
        "foreignKeys": ctx.foreign_keys,
        "indexes": ctx.indexes,
        "primaryKeyColumn": ctx.primary_key_column,
        "writeEnabled": state.config.write_enabled(),
        "presentationTypes": ctx.presentation_types,
        "presentationTypeOptions": options_for_types(&PresentationType::ALL),
        "presentationTypeOptionsByColumn": ctx.presentation_type_options_by_column(),
        "fieldOptions": ctx.field_options,
        "data": ctx.rows,
        "pagination": ctx.pagination,
    })
}

/// Handler for GET /table/{table}
///
/// One page of rows plus everything the table view needs: column metadata,
/// foreign keys, indexes, and presentation data. Query parameters: `page`,
/// `search`, `sort`, `direction`.
pub async fn browse_table_handler(
    State(state): State<ExplorerState>,
    Path(table): Path<String>,
    Query(query): Query<BrowseQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let params = query.validate().map_err(Error::Validation)?;
    let inspector = state.inspector().await?;
    let ctx = build_table_context(&state, &inspector, &table, &params).await?;

    if wants_json(&headers) {
        return Ok(Json(browse_json(&state, &ctx)).into_response());
    }

    let all_tables = inspector.tables().await?;
    Ok(Html(views::render_table(
        &state.base_path,
        &state.config,
        &all_tables,
        &ctx,
        &params,
        None,
        &Default::default(),
    ))
    .into_response())
}

/// Handler for GET /table/{table}/record/{id}
///
/// The browse context plus the selected record and human-readable labels for
/// its foreign-key values.
pub async fn show_record_handler(
    State(state): State<ExplorerState>,
    Path((table, id)): Path<(String, String)>,
    Query(query): Query<BrowseQuery>,
    headers: HeaderMap,
) -> Result<Response> {
    let params = query.validate().map_err(Error::Validation)?;
    let inspector = state.inspector().await?;
    let ctx = build_table_context(&state, &inspector, &table, &params).await?;

    let record = rows::fetch_record(
        &state.pool,
        &ctx.physical_table,
        ctx.record_key_column(),
        &id,
    )
    .await?
    .ok_or_else(|| Error::NotFound("Record not found".into()))?;

    let foreign_key_display =
        rows::foreign_key_display_values(&inspector, &state.pool, &ctx.foreign_keys, &record)
            .await?;

    if wants_json(&headers) {
        let mut payload = browse_json(&state, &ctx);
        payload["selectedRecord"] = serde_json::Value::Object(record);
        payload["foreignKeyDisplay"] = json!(foreign_key_display);
        return Ok(Json(payload).into_response());
    }

    let all_tables = inspector.tables().await?;
    Ok(Html(views::render_table(
        &state.base_path,
        &state.config,
        &all_tables,
        &ctx,
        &params,
        Some(&record),
        &foreign_key_display,
    ))
    .into_response())
}
