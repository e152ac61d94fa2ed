//! Presentation type override endpoint

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::json;

use crate::api::build_table_context;
use crate::layer::ExplorerState;
use crate::presentation::PresentationType;
use crate::schema::BrowseParams;
use crate::{Error, Result, ValidationErrors};

#[derive(Debug, Deserialize)]
pub struct PresentationTypeBody {
    pub presentation_type: String,
}

/// Handler for PUT /table/{table}/column/{column}/presentation-type
///
/// Stores an override for one column. The requested type must be a member of
/// the column's allowed set; anything else is rejected before persistence.
pub async fn update_presentation_type_handler(
    State(state): State<ExplorerState>,
    Path((table, column)): Path<(String, String)>,
    Json(body): Json<PresentationTypeBody>,
) -> Result<Response> {
    if !state.config.write_enabled() {
        return Err(Error::Forbidden("Write operations are disabled".into()));
    }

    let inspector = state.inspector().await?;
    let store = state.store();
    if !store.has_table(inspector.database()).await? {
        return Err(Error::Conflict(
            "Presentation mapping table is missing. Create it with ensure_table first.".into(),
        ));
    }

    let params = BrowseParams {
        page: 1,
        search: None,
        sort: None,
        direction: None,
    };
    let ctx = build_table_context(&state, &inspector, &table, &params).await?;

    let Some(column_meta) = ctx.columns.iter().find(|c| c.name == column) else {
        return Err(Error::NotFound("Column not found".into()));
    };

    let allowed = ctx
        .allowed_types_by_column
        .get(&column)
        .cloned()
        .unwrap_or_else(|| vec![PresentationType::Text]);
    if allowed.is_empty() {
        return Err(Error::Conflict(
            "Presentation type cannot be configured for this column".into(),
        ));
    }

    let requested = PresentationType::parse(&body.presentation_type).filter(|t| allowed.contains(t));
    let Some(requested) = requested else {
        let mut errors = ValidationErrors::new();
        errors.entry("presentation_type".into()).or_default().push(format!(
            "must be one of: {}",
            allowed
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
        return Err(Error::Validation(errors));
    };

    store
        .upsert(
            state.config.user_scope,
            inspector.database(),
            &table,
            &column,
            &column_meta.data_type,
            requested,
        )
        .await?;

    tracing::info!(table = %table, column = %column, presentation_type = %requested, "presentation type updated");

    Ok(Json(json!({
        "ok": true,
        "presentationType": requested,
    }))
    .into_response())
}
