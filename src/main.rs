use axum::Router;
use carbook::auth::{HeaderSessions, RoleAccess};
use carbook::store::{MemStore, PgStore, Store};
use carbook::{api_routes, health_routes, AppState, Config};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .init();

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await?;
            carbook::store::pg::ensure_tables(&pool).await?;
            tracing::info!("connected to database");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            Arc::new(MemStore::new())
        }
    };

    let state = AppState {
        store,
        sessions: Arc::new(HeaderSessions),
        access: Arc::new(RoleAccess::new(config.write_roles.clone())),
    };

    let app = Router::new()
        .merge(health_routes())
        .nest("/api", api_routes(state))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
