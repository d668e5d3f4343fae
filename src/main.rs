use std::net::SocketAddr;

use psytest_backend::{
    build_router,
    config::{get_config, init_config},
    database::pool::{create_pool, run_migrations},
    AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("psytest_backend=info,tower_http=info")),
        )
        .init();

    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    run_migrations(&pool).await?;
    info!("Database migrations applied");

    let app = build_router(AppState::new(pool), config.api_rps);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
