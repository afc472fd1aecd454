use anyhow::Context;

use dashgate_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env()?;
    dashgate_observability::init_with(config.log_format);

    if config.uses_dev_secret() {
        tracing::warn!("DASHGATE_JWT_SECRET not set; using insecure dev default");
    }

    let app = dashgate_api::app::build_app(&config).context("failed to build router")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
