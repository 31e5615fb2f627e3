//! `guessduel` binary: parses flags, sets up logging, runs the server.

use std::time::Duration;

use clap::Parser;
use guessduel::prelude::*;
use guessduel::{DEFAULT_HANDSHAKE_TIMEOUT, DEFAULT_MAX_DECODE_FAILURES};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
    /// Port to listen on
    #[arg(short, long, default_value_t = 55555)]
    port: u16,
    /// Smallest possible secret (inclusive)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    lower: i64,
    /// Largest possible secret (inclusive)
    #[arg(long, default_value_t = 500, allow_negative_numbers = true)]
    upper: i64,
    /// Don't reveal the secret to both players when the game starts
    #[arg(long)]
    hide_secret: bool,
    /// Seconds a new connection has to send its nickname
    #[arg(long, default_value_t = DEFAULT_HANDSHAKE_TIMEOUT.as_secs())]
    handshake_timeout: u64,
    /// Consecutive malformed messages tolerated before disconnecting
    #[arg(long, default_value_t = DEFAULT_MAX_DECODE_FAILURES)]
    max_decode_failures: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let bind_addr = format!("{}:{}", args.host, args.port);

    let server = GuessDuelServer::builder()
        .bind(&bind_addr)
        .room_config(RoomConfig::new(args.lower, args.upper)?)
        .reveal_secret_on_start(!args.hide_secret)
        .handshake_timeout(Duration::from_secs(args.handshake_timeout))
        .max_decode_failures(args.max_decode_failures)
        .build()
        .await?;

    tracing::info!(addr = %bind_addr, "listening");

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }
    Ok(())
}
