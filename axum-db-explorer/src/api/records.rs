//! Record write endpoints: create, update, delete
//!
//! Every handler fails fast on the write-enabled flag before touching the
//! validator, and refuses to write through a view.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;

use crate::api::{build_table_context, TableContext};
use crate::layer::ExplorerState;
use crate::records::{self, RecordMode};
use crate::schema::{BrowseParams, TableType};
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
pub struct RecordBody {
    pub record: serde_json::Map<String, serde_json::Value>,
}

fn ensure_write_enabled(state: &ExplorerState) -> Result<()> {
    if !state.config.write_enabled() {
        return Err(Error::Forbidden("Write operations are disabled".into()));
    }
    Ok(())
}

fn default_params() -> BrowseParams {
    BrowseParams {
        page: 1,
        search: None,
        sort: None,
        direction: None,
    }
}

async fn validate_record(
    state: &ExplorerState,
    inspector: &crate::database::MySqlInspector,
    ctx: &TableContext,
    body: &RecordBody,
    mode: RecordMode,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    let rules = records::derive_rules(
        &ctx.columns,
        &ctx.presentation_types,
        mode,
        ctx.primary_key_column.as_deref(),
    );

    let mut errors = records::validate(&rules, &body.record);
    let referential =
        records::check_referential_integrity(&state.pool, inspector, &ctx.foreign_keys, &body.record)
            .await?;
    for (column, messages) in referential {
        errors.entry(column).or_default().extend(messages);
    }

    if !errors.is_empty() {
        return Err(Error::Validation(errors));
    }

    Ok(records::build_payload(
        &ctx.columns,
        &body.record,
        &ctx.presentation_types,
        mode,
        ctx.primary_key_column.as_deref(),
    ))
}

/// Handler for POST /table/{table}
pub async fn store_record_handler(
    State(state): State<ExplorerState>,
    Path(table): Path<String>,
    Json(body): Json<RecordBody>,
) -> Result<Response> {
    ensure_write_enabled(&state)?;

    let inspector = state.inspector().await?;
    let ctx = build_table_context(&state, &inspector, &table, &default_params()).await?;

    if ctx.table_type == TableType::View {
        return Err(Error::Conflict("Cannot create records in a view".into()));
    }

    let payload = validate_record(&state, &inspector, &ctx, &body, RecordMode::Create).await?;
    let record_id = records::insert_record(&state.pool, &ctx.physical_table, &payload).await?;

    tracing::info!(table = %ctx.table, record_id, "record created");

    Ok(Json(json!({
        "ok": true,
        "message": "Record created successfully",
        "recordId": record_id,
    }))
    .into_response())
}

/// Handler for PUT /table/{table}/record/{id}
pub async fn update_record_handler(
    State(state): State<ExplorerState>,
    Path((table, id)): Path<(String, String)>,
    Json(body): Json<RecordBody>,
) -> Result<Response> {
    ensure_write_enabled(&state)?;

    let inspector = state.inspector().await?;
    let ctx = build_table_context(&state, &inspector, &table, &default_params()).await?;

    if ctx.table_type == TableType::View {
        return Err(Error::Conflict("Cannot update records in a view".into()));
    }
    let Some(primary_key) = ctx.primary_key_column.clone() else {
        return Err(Error::Conflict("Table has no primary key".into()));
    };

    let payload = validate_record(&state, &inspector, &ctx, &body, RecordMode::Update).await?;
    if payload.is_empty() {
        return Err(Error::Conflict("No fields to update".into()));
    }

    let updated =
        records::update_record(&state.pool, &ctx.physical_table, &primary_key, &id, &payload)
            .await?;
    if updated == 0 {
        return Err(Error::NotFound("Record not found".into()));
    }

    tracing::info!(table = %ctx.table, id = %id, "record updated");

    Ok(Json(json!({
        "ok": true,
        "message": "Record updated successfully",
    }))
    .into_response())
}

/// Handler for DELETE /table/{table}/record/{id}
pub async fn delete_record_handler(
    State(state): State<ExplorerState>,
    Path((table, id)): Path<(String, String)>,
) -> Result<Response> {
    ensure_write_enabled(&state)?;

    let inspector = state.inspector().await?;
    let ctx = build_table_context(&state, &inspector, &table, &default_params()).await?;

    if ctx.table_type == TableType::View {
        return Err(Error::Conflict("Cannot delete records from a view".into()));
    }
    let Some(primary_key) = ctx.primary_key_column.clone() else {
        return Err(Error::Conflict("Table has no primary key".into()));
    };

    let deleted =
        records::delete_record(&state.pool, &ctx.physical_table, &primary_key, &id).await?;
    if deleted == 0 {
        return Err(Error::NotFound("Record not found".into()));
    }

    tracing::info!(table = %ctx.table, id = %id, "record deleted");

    Ok(Json(json!({
        "ok": true,
        "message": "Record deleted successfully",
    }))
    .into_response())
}
