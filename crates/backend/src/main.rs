pub mod api;
pub mod dashboards;
pub mod domain;
pub mod routes;
pub mod shared;
pub mod system;
pub mod usecases;

use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::shared::config;
use crate::shared::data::db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    system::tracing::initialize()?;

    let config = config::load_config()?;
    let db_path = config::get_database_path(&config)?;
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    if let Err(e) = shared::supabase::initialize(&config.supabase) {
        tracing::warn!("Supabase client not initialized: {:#}", e);
    }
    config::set_global(config);

    db::initialize_database(Some(&db_path.to_string_lossy()))
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    let app = routes::configure_routes();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!("Error: {} is already in use", addr);
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    shared::logger::log("startup", &format!("Servidor iniciado em {}", addr));
    axum::serve(listener, app).await?;

    Ok(())
}
