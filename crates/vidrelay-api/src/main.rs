use vidrelay_core::Config;

// Use mimalloc as the global allocator; large uploads churn through many buffers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (store, publishers, routes)
    let (_state, router) = vidrelay_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    vidrelay_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
