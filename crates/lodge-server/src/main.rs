use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lodge=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let store_path = std::env::var("LODGE_STORE_PATH").unwrap_or_else(|_| "lodge.json".into());
    let host = std::env::var("LODGE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("LODGE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init store
    let store = Arc::new(lodge_store::Store::open(&PathBuf::from(&store_path))?);

    let app = lodge_api::router(store)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Lodge server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
