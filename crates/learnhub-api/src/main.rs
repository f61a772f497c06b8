use learnhub_core::Config;

// mimalloc as the global allocator, mainly for musl-based container images.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (_state, router) = learnhub_api::setup::initialize_app(config.clone()).await?;

    learnhub_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
