//! Demo host: loads the customer module from the factory table, creates its tables, and serves it with health routes.

use axum::Router;
use customer_module::host::SharedModule;
use customer_module::{common_routes, ensure_tables, find_module, module_router, ModuleConfig};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("customer_module=info".parse()?))
        .init();

    let config = ModuleConfig::from_env()?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    ensure_tables(&pool).await?;

    let factory = find_module("customer").ok_or("customer module is not registered")?;
    let mut module = (factory.create)(&config);
    let span = tracing::info_span!("module", code = module.module_code(), version = module.module_version());
    module.initialize(pool.clone(), span)?;

    let mut module: SharedModule = Arc::from(module);
    let app = Router::new()
        .merge(common_routes(pool))
        .merge(module_router(module.clone()));

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    match Arc::get_mut(&mut module) {
        Some(module) => module.cleanup()?,
        None => tracing::warn!("module still referenced at shutdown; skipping cleanup"),
    }
    Ok(())
}
