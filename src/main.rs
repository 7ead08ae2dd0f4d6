use clap::Parser;

use photo_post_client::{cli, config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(config::load_log_level())
        .init();

    log::info!("Starting photo post client");

    // Migrate configuration if needed
    if let Err(e) = config::migrate_config() {
        log::error!("Failed to migrate configuration: {}", e);
    }

    cli::run(cli).await?;

    Ok(())
}
