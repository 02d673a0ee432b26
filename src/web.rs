use clap::Parser;
use gumbira::app;
use gumbira::config::ServerArgs;

/// Main entry point for the web application
///
/// Reads flags and environment, opens the configured data store and serves
/// the pages and API.
///
/// # Returns
/// * `Result<(), Box<dyn std::error::Error>>` - Success or error object
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = ServerArgs::parse();
    app::run(args).await
}
