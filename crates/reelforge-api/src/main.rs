use reelforge_core::Config;

// Use mimalloc as the global allocator for better performance and lower
// fragmentation, especially when running on musl-based systems inside
// containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load .env before reading configuration
    dotenvy::dotenv().ok();

    reelforge_api::telemetry::init_telemetry();

    let config = Config::from_env()?;

    // Initialize the application (storage, providers, routes)
    let (_state, router) = reelforge_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    reelforge_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
