use mock_server::{RouteLayout, ServerConfig};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let layout = std::env::var("ROUTE_LAYOUT")
        .ok()
        .and_then(|v| v.parse::<RouteLayout>().ok())
        .unwrap_or_default();
    let daily_post_limit = std::env::var("DAILY_POST_LIMIT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(ServerConfig::default().daily_post_limit);

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, prefix = layout.prefix(), daily_post_limit, "listening");
    mock_server::run_with(listener, ServerConfig { layout, daily_post_limit }).await
}
