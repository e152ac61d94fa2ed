use axum::{extract::State, http::StatusCode, routing::get, Router};
use axum_db_explorer::{ColumnPresentationStore, DbExplorerLayer, ExplorerConfig};
use sqlx::mysql::MySqlPool;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

mod database;

#[derive(Clone)]
struct ApplicationState {
    pool: MySqlPool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "mysql://root@127.0.0.1:3306/db_explorer_demo".to_string());
    let pool = MySqlPool::connect(&database_url)
        .await
        .expect("Failed to connect to MySQL database");

    // Create and seed the demo schema
    database::setup(&pool)
        .await
        .expect("Failed to setup database");

    // Create the presentation override table so widget overrides persist
    ColumnPresentationStore::new(pool.clone(), "")
        .ensure_table()
        .await
        .expect("Failed to create presentation table");

    let config = ExplorerConfig {
        enabled: true,
        environment: "local".into(),
        ..Default::default()
    };

    let application_state = ApplicationState { pool: pool.clone() };

    // Note: DbExplorerLayer must be merged before with_state() since it returns a stateless Router
    let app = Router::new()
        .route("/", get(root_handler))
        .route("/api/health", get(health_handler))
        .with_state(application_state)
        .merge(DbExplorerLayer::new("/db-explorer", pool, config).into_router())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000")
        .await
        .expect("Failed to bind to port 3000");

    tracing::info!("Server running at http://127.0.0.1:3000");
    tracing::info!("DB Explorer available at http://127.0.0.1:3000/db-explorer");

    axum::serve(listener, app).await.expect("Server error");
}

async fn root_handler() -> &'static str {
    "Welcome to axum-db-explorer example server"
}

async fn health_handler(
    State(state): State<ApplicationState>,
) -> Result<(StatusCode, &'static str), StatusCode> {
    sqlx::query("SELECT 1")
        .fetch_one(&state.pool)
        .await
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)?;

    Ok((StatusCode::OK, "Server is healthy"))
}
