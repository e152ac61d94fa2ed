//! # axum-db-explorer
//!
//! A development tool for browsing MySQL schemas and editing records in web
//! browsers, easily integrable as an Axum layer.
//!
//! ## Features
//!
//! - Table and view listing driven by `information_schema`
//! - Column metadata, foreign keys, and indexes per table
//! - Row browsing with pagination, search, and sorting
//! - Optional create/update/delete of records
//! - Per-column presentation type (input widget) overrides persisted in an
//!   auxiliary table
//! - Table-name prefix handling: routes use logical names, queries use
//!   physical names
//!
//! ## Security Warning
//!
//! **This is a development tool only!**
//!
//! - No authentication/authorization built-in
//! - Exposes full database schema and data
//! - Write mode allows modifying any table
//! - Should never be exposed in production or public networks
//!
//! The layer 404s unless it is explicitly enabled and the configured
//! environment is in the allowed list; write endpoints are additionally gated
//! by the write-enabled flag.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use axum::Router;
//! use axum_db_explorer::{DbExplorerLayer, ExplorerConfig};
//! use sqlx::MySqlPool;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = MySqlPool::connect("mysql://root@localhost/app")
//!         .await
//!         .unwrap();
//!
//!     let config = ExplorerConfig {
//!         enabled: true,
//!         environment: "local".into(),
//!         ..Default::default()
//!     };
//!
//!     let app = Router::new()
//!         .merge(DbExplorerLayer::new("/db-explorer", pool, config).into_router());
//!
//!     // Serve the application...
//! }
//! ```

// Public modules
pub mod api;
pub mod config;
pub mod database;
pub mod frontend;
pub mod layer;
pub mod presentation;
pub mod records;
pub mod schema;
pub mod views;

// Public exports
pub use config::ExplorerConfig;
pub use database::MySqlInspector;
pub use layer::DbExplorerLayer;
pub use presentation::{ColumnPresentationStore, PresentationType};
pub use schema::{
    ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, SortDirection, TableDescriptor,
    TableType,
};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

/// Field name → messages, for 422 responses.
pub type ValidationErrors = BTreeMap<String, Vec<String>>;

/// Request-scoped, terminal failures. Every variant maps to one HTTP status
/// in [`IntoResponse`]; nothing is retried.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Unknown table, record, or column.
    #[error("{0}")]
    NotFound(String),

    /// Malformed query parameters or record fields.
    #[error("validation failed")]
    Validation(ValidationErrors),

    /// Write attempted while writes are disabled.
    #[error("{0}")]
    Forbidden(String),

    /// Request conflicts with the current schema state (writing to a view,
    /// missing primary key, missing presentation table).
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),
            Error::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({
                    "error": "validation failed",
                    "errors": errors,
                })),
            )
                .into_response(),
            Error::Forbidden(message) => (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),
            Error::Conflict(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),
            Error::Database(error) => {
                tracing::error!(%error, "database error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "database error" })),
                )
                    .into_response()
            }
            Error::Serialization(error) => {
                tracing::error!(%error, "serialization error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "serialization error" })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_statuses_follow_the_taxonomy() {
        let cases: Vec<(Error, StatusCode)> = vec![
            (Error::NotFound("Table not found".into()), StatusCode::NOT_FOUND),
            (
                Error::Validation(ValidationErrors::new()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                Error::Forbidden("Write operations are disabled".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                Error::Conflict("Cannot update records in a view".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
