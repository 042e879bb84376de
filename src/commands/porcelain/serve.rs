use crate::artifacts::protocol::server::Server;
use std::path::Path;
use tokio::net::TcpListener;

/// Run the sync server over every repository directly under `root`
pub async fn serve(root: &Path, port: u16) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    Server::new(root.to_path_buf()).run(listener).await
}
