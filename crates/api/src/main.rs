use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    edgegate_observability::init();

    let config = edgegate_api::config::ServerConfig::from_env();
    let app = edgegate_api::app::build_app(&config).context("failed to build HTTP clients")?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        upstream = %config.upstream_url,
        backend = %config.backend.base_url,
        "listening on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await?;
    Ok(())
}
