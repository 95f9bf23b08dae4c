//! Album thumbnail server (albumd)

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod album;
mod api;
mod config;
mod dav;
mod imaging;

use config::Config;

#[derive(Parser)]
#[command(name = "albumd")]
#[command(about = "Serves a remote photo album as an image listing and random thumbnails", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the listing and random-image services
    Serve,
    /// List the album once and print the image URLs and ETag
    List,
    /// Pick one random JPEG, transcode it and write it to a file
    Random {
        /// Output file
        #[arg(long, short)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "albumd=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    match cli.command {
        Commands::Serve => run_server(config).await?,
        Commands::List => print_listing(config).await?,
        Commands::Random { output } => write_random(config, output).await?,
    }

    Ok(())
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let listing_addr: SocketAddr = format!("{}:{}", config.listen_host, config.listing_port).parse()?;
    let random_addr: SocketAddr = format!("{}:{}", config.listen_host, config.random_port).parse()?;

    let state = api::AppState::new(config)?;
    tracing::info!(album = %state.config.album, "serving album");

    let listing_state = state.clone();
    let listing_handle = tokio::spawn(async move {
        tracing::info!("listing service on {}", listing_addr);
        api::rest::serve(listing_addr, api::rest::listing_app(listing_state)).await
    });

    let random_handle = tokio::spawn(async move {
        tracing::info!("random image service on {}", random_addr);
        api::rest::serve(random_addr, api::rest::random_app(state)).await
    });

    let aborts = [listing_handle.abort_handle(), random_handle.abort_handle()];

    // First service to fail ends the process, the other one is stopped
    let result = tokio::try_join!(service_result(listing_handle), service_result(random_handle));
    if let Err(e) = &result {
        tracing::error!("service stopped: {:#}", e);
        aborts.iter().for_each(|h| h.abort());
    }
    result.map(|_| ())
}

async fn service_result(handle: JoinHandle<anyhow::Result<()>>) -> anyhow::Result<()> {
    handle.await?
}

async fn print_listing(config: Config) -> anyhow::Result<()> {
    let service = album::AlbumService::new(&config)?;
    let listing = service.list_images().await?;

    let urls: Vec<api::rest::ImageUrls> = listing.images.iter().map(Into::into).collect();
    println!("{}", serde_json::to_string_pretty(&urls)?);
    println!("etag: {}", listing.tag);
    Ok(())
}

async fn write_random(config: Config, output: PathBuf) -> anyhow::Result<()> {
    let service = album::AlbumService::new(&config)?;
    let jpeg = service.random_jpeg().await?;

    tokio::fs::write(&output, &jpeg).await?;
    println!("wrote {} bytes to {}", jpeg.len(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_server_fails_when_port_taken() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();

        let mut config = Config::for_test("http://127.0.0.1:9");
        config.listing_port = 0;
        config.random_port = taken.local_addr().unwrap().port();

        let result = tokio::time::timeout(Duration::from_secs(5), run_server(config)).await;
        let err = result.expect("run_server kept running").unwrap_err();
        assert!(err.to_string().to_lowercase().contains("address"), "{}", err);
    }
}
