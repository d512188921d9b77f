use anyhow::{Context, Error};
use github_explorer::{
    config::Config, telemetry, web, FileKeyValueStore, GithubClient, RepositoryListController,
    SlotRepositoryStore,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init_local_telemetry()?;

    let config = Config::from_env()?;

    let store = FileKeyValueStore::open(&config.data_dir).with_context(|| {
        format!(
            "Failed to open the data directory: {}",
            config.data_dir.display()
        )
    })?;
    info!("Storing repositories in [{}]", store.dir().display());

    let client = GithubClient::new(&config.api_url)?;
    let controller = RepositoryListController::initialize(client, SlotRepositoryStore::new(store))
        .context("Failed to restore the stored repository list")?;

    let app = web::router(controller)?;

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
