use chat_proxy::config::ProxyConfig;
use chat_proxy::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ProxyConfig::from_env();
    log::info!("starting chat proxy on {}", config.bind_addr);

    if let Err(e) = server::run(config).await {
        log::error!("chat proxy failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}
