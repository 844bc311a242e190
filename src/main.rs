//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This is the main entry point for the tweet fan-out server.
// It loads the configuration, wires the store and brokers together, and serves the API until
// Ctrl-C, at which point every open stream is closed before the server drains.
//--------------------------------------------------------------------------------------------------
// cargo run -- --bind 127.0.0.1:8080 --capacity 256 --feed-delivery author

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tweet_fanout::{
    config::parse_capacity, Api, AppState, Config, FeedDelivery, InMemorySocialStore,
};

/// CLI options for the application. Each flag overrides its environment variable.
#[derive(Parser, Debug)]
#[command(name = "tweet-fanout", about = "Real-time feed and notification server")]
struct Opt {
    /// Address to listen on
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Per-subscriber channel buffer size
    #[arg(long, value_parser = parse_capacity)]
    capacity: Option<usize>,

    /// Feed routing policy: broadcast or author
    #[arg(long)]
    feed_delivery: Option<FeedDelivery>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opt = Opt::parse();
    let mut config = Config::try_from_env().map_err(anyhow::Error::msg)?;
    if let Some(bind) = opt.bind {
        config.bind_addr = bind;
    }
    if let Some(capacity) = opt.capacity {
        config.channel_capacity = capacity;
    }
    if let Some(feed_delivery) = opt.feed_delivery {
        config.feed_delivery = feed_delivery;
    }

    info!(
        bind = %config.bind_addr,
        capacity = config.channel_capacity,
        feed_delivery = %config.feed_delivery,
        "Starting tweet fan-out server"
    );

    let store = Arc::new(InMemorySocialStore::new());
    let state = Arc::new(AppState::new(store, &config));
    let api = Api::new(&config, state);

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    };

    api.serve(shutdown).await
}
