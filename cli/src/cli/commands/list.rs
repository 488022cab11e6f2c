use image_gateway_core::config::Config;
use image_gateway_core::store::build_store;

pub async fn run(config: Config, prefix: Option<String>, limit: usize) -> anyhow::Result<()> {
    let store = build_store(&config.store).await?;

    let prefix = prefix.unwrap_or(config.gateway.debug_list_prefix);
    let keys = store.list(&prefix, limit).await?;

    if keys.is_empty() {
        println!("No objects under {:?}", prefix);
        return Ok(());
    }

    for key in &keys {
        println!("{}", key);
    }
    tracing::debug!("Listed {} key(s) under {:?}", keys.len(), prefix);

    Ok(())
}
