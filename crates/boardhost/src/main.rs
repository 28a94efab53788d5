//! Pixelboard Host
//!
//! Collaborative pixel-board simulator: HTTP for board queries and paints,
//! WebSocket push channel for change notifications.

mod error;
mod push;
mod web;

use anyhow::{Context, Result};
use clap::Parser;
use pixelboard_core::{Board, Broadcaster, PaintPipeline, RateLimiterStore};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::push::PushServer;
use crate::web::{PageParams, WebServer, WebState};

/// Pixelboard Host - Pixel board simulator for client testing
#[derive(Parser, Debug)]
#[command(name = "boardhost")]
#[command(author = "Pixelboard Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Simulated collaborative pixel board", long_about = None)]
struct Args {
    /// Bind address for both listeners
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    bind: IpAddr,

    /// HTTP port
    #[arg(long, default_value_t = 3000)]
    http_port: u16,

    /// WebSocket push channel port
    #[arg(long, default_value_t = 3001)]
    push_port: u16,

    /// Cooldown between paints per token, in milliseconds
    #[arg(long, default_value_t = 5000)]
    cooldown_ms: u64,

    /// Board width (columns)
    #[arg(long, default_value_t = 100)]
    width: usize,

    /// Board height (rows)
    #[arg(long, default_value_t = 100)]
    height: usize,

    /// Initial color index of every cell
    #[arg(long, default_value_t = 31)]
    default_color: usize,

    /// Disable rate limiting (tokens become optional)
    #[arg(long, default_value = "false")]
    no_restriction: bool,

    /// Seconds between sweeps of expired cooldown entries
    #[arg(long, default_value_t = 3600, value_parser = clap::value_parser!(u64).range(1..))]
    sweep_secs: u64,

    /// Debug-level diagnostic output
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    info!("Starting Pixelboard Host v{}", env!("CARGO_PKG_VERSION"));

    let board = Board::new(args.width, args.height, args.default_color)
        .context("Invalid board configuration")?;
    info!(
        "Board {}x{}, default color {}",
        board.width(),
        board.height(),
        args.default_color
    );

    let cooldown = Duration::from_millis(args.cooldown_ms);
    let limiter = RateLimiterStore::new(cooldown, !args.no_restriction);
    if limiter.is_enabled() {
        info!("Cooldown: {:?} per token", cooldown);
    } else {
        info!("Rate limiting disabled");
    }

    let broadcaster = Broadcaster::new();
    let (pipeline, worker) =
        PaintPipeline::spawn(Arc::new(board), limiter.clone(), broadcaster.clone());

    // Spawn cooldown sweep task
    let sweep_every = Duration::from_secs(args.sweep_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_every);
        loop {
            interval.tick().await;
            let before = limiter.tracked_tokens();
            limiter.sweep();
            let swept = before.saturating_sub(limiter.tracked_tokens());
            if swept > 0 {
                info!("Swept {} expired cooldown entries", swept);
            }
        }
    });

    let (push_addr, push_server) = PushServer::new(broadcaster)
        .start(SocketAddr::new(args.bind, args.push_port))
        .await
        .context("Failed to start push server")?;

    let page = PageParams {
        push_port: push_addr.port(),
        cooldown,
        restricted: !args.no_restriction,
    };
    let (http_addr, http_server) = WebServer::new(WebState::new(pipeline, page))
        .start(SocketAddr::new(args.bind, args.http_port))
        .await
        .context("Failed to start HTTP server")?;

    println!("============================================");
    println!("Board:  http://{}", http_addr);
    println!("Push:   ws://{}", push_addr);
    println!("============================================");

    // Wait for shutdown signal
    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
        .context("Failed to setup SIGTERM handler")?;

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
        }
        result = http_server => {
            result.context("HTTP server task failed")?.context("HTTP server error")?;
        }
        result = push_server => {
            result.context("Push server task failed")?.context("Push server error")?;
        }
        result = worker => {
            result.context("Paint worker failed")?;
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Setup logging with tracing
fn setup_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}
