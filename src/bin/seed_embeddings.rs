use tracing_subscriber::EnvFilter;

use game_search::catalog::SupabaseCatalog;
use game_search::config::Config;
use game_search::llm::HttpEmbedder;
use game_search::seed::seed_catalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    config.validate()?;

    let client = config.http_client()?;
    let catalog = SupabaseCatalog::new(client.clone(), config.catalog.clone());
    let embedder = HttpEmbedder::new(client, config.llm.clone());

    let report = seed_catalog(&catalog, &embedder, &config.retry_policy()).await?;
    tracing::info!(
        "Seeding finished: {} embedded, {} failed",
        report.embedded,
        report.failed
    );

    if report.failed > 0 {
        anyhow::bail!("{} rows could not be embedded", report.failed);
    }
    Ok(())
}
