use dialogue_viewer::configuration::get_configuration;
use dialogue_viewer::server::configure_app;
use dialogue_viewer::telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let settings = get_configuration()?;
    init_tracing(settings.debug);
    settings.log_summary();

    match settings.masked_api_key() {
        Some(masked) => info!("API key found: {}", masked),
        None => warn!("No OpenAI API key found in environment variables!"),
    }

    let host = settings.server_host.clone();
    let port = settings.server_port;
    let app = configure_app(settings);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("✨ Server ready:");
    info!("  🌎 http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
