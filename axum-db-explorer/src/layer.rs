//! DbExplorerLayer - Main Axum integration layer
//!
//! This module provides the main entry point for integrating axum-db-explorer
//! into an Axum application.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::Router;
use sqlx::MySqlPool;
use tower_http::cors::CorsLayer;

use crate::api::{
    browse_table_handler, dashboard_handler, delete_record_handler, schema_report_handler,
    show_record_handler, store_record_handler, update_presentation_type_handler,
    update_record_handler,
};
use crate::config::ExplorerConfig;
use crate::database::MySqlInspector;
use crate::frontend::serve_static_asset;
use crate::presentation::ColumnPresentationStore;
use crate::Result;

/// Shared request state: connection pool, injected configuration, and the
/// mount path (used to build links in HTML views).
#[derive(Clone)]
pub struct ExplorerState {
    pub(crate) pool: MySqlPool,
    pub(crate) config: Arc<ExplorerConfig>,
    pub(crate) base_path: String,
}

impl ExplorerState {
    /// Build an inspector for the connection's active database. Resolved per
    /// request; schema metadata is never cached.
    pub(crate) async fn inspector(&self) -> Result<MySqlInspector> {
        MySqlInspector::connect(&self.pool, self.config.table_prefix.clone()).await
    }

    pub(crate) fn store(&self) -> ColumnPresentationStore {
        ColumnPresentationStore::new(self.pool.clone(), self.config.table_prefix.clone())
    }
}

/// Main layer for mounting the explorer into an Axum application.
///
/// # Example
///
/// ```rust,no_run
/// use axum::Router;
/// use axum_db_explorer::{DbExplorerLayer, ExplorerConfig};
/// use sqlx::MySqlPool;
///
/// # async fn example() {
/// let pool = MySqlPool::connect("mysql://root@localhost/app").await.unwrap();
/// let config = ExplorerConfig {
///     enabled: true,
///     environment: "local".into(),
///     ..Default::default()
/// };
/// let app = Router::new()
///     .merge(DbExplorerLayer::new("/db-explorer", pool, config).into_router());
/// # }
/// ```
pub struct DbExplorerLayer {
    base_path: String,
    pool: MySqlPool,
    config: ExplorerConfig,
}

impl DbExplorerLayer {
    /// Create a new explorer at the given base path (e.g. "/db-explorer").
    pub fn new(base_path: impl Into<String>, pool: MySqlPool, config: ExplorerConfig) -> Self {
        Self {
            base_path: base_path.into(),
            pool,
            config,
        }
    }

    /// Convert into an Axum Router that can be merged into the host router.
    ///
    /// All routes sit behind the enabled/environment gate; write endpoints are
    /// additionally checked against the write-enabled flag in their handlers.
    pub fn into_router(self) -> Router {
        let state = ExplorerState {
            pool: self.pool,
            config: Arc::new(self.config),
            base_path: self.base_path.clone(),
        };

        // Note: Axum 0.8 uses {param} syntax instead of :param
        let routes = Router::new()
            .route("/", get(dashboard_handler))
            .route("/schema", get(schema_report_handler))
            .route(
                "/table/{table}",
                get(browse_table_handler).post(store_record_handler),
            )
            .route("/table/{table}/records", get(browse_table_handler))
            .route("/table/{table}/schema", get(browse_table_handler))
            .route(
                "/table/{table}/record/{id}",
                get(show_record_handler)
                    .put(update_record_handler)
                    .delete(delete_record_handler),
            )
            .route(
                "/table/{table}/column/{column}/presentation-type",
                put(update_presentation_type_handler),
            )
            .route("/assets/{*path}", get(serve_static_asset))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                ensure_explorer_allowed,
            ))
            .with_state(state);

        Router::new()
            .nest(&self.base_path, routes)
            .layer(CorsLayer::permissive()) // Permissive CORS for development
    }
}

/// Gate every route on the enabled flag and the allowed-environment list.
/// A plain 404 keeps a disabled explorer indistinguishable from an absent one.
async fn ensure_explorer_allowed(
    State(state): State<ExplorerState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.enabled || !state.config.environment_allowed() {
        return StatusCode::NOT_FOUND.into_response();
    }

    next.run(request).await
}
