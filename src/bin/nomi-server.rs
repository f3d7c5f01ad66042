use nomi_piacenza::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    log::info!("Serving names from {}", config.dataset_path.display());

    nomi_piacenza::server::run(config).await
}
