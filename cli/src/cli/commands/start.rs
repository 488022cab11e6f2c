use image_gateway_core::config::Config;
use image_gateway_core::gateway::GatewayServer;
use image_gateway_core::store::build_store;

pub async fn run(
    mut config: Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host_override {
        config.server.host = host;
    }
    if let Some(port) = port_override {
        config.server.port = port;
    }

    tracing::info!("Starting image gateway...");
    tracing::info!("  Host: {}", config.server.host);
    tracing::info!("  Port: {}", config.server.port);
    tracing::info!("  Prefix: {}", config.gateway.prefix);
    tracing::info!("  CORS: {}", if config.gateway.cors_enabled { "enabled" } else { "disabled" });
    if config.gateway.debug_endpoint_enabled {
        tracing::warn!("Debug listing endpoint is enabled at /debug-list");
    }

    let store = build_store(&config.store).await?;

    let server = GatewayServer::new(
        config.server.host.clone(),
        config.server.port,
        store,
        config.gateway.clone(),
    );

    tracing::info!("Gateway starting on http://{}:{}", config.server.host, config.server.port);
    tracing::info!("Press Ctrl+C to stop");

    // Run server (blocks until shutdown)
    server.run().await?;

    Ok(())
}
