//! planpoker server binary.
//!
//! # Usage
//!
//! ```bash
//! planpoker-server --bind 0.0.0.0:3001
//!
//! # Smaller tables, five-minute timer cap
//! planpoker-server --max-participants 8 --max-timer-secs 300
//! ```

use std::time::Duration;

use clap::Parser;
use planpoker::prelude::*;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Planning-poker room server
#[derive(Parser, Debug)]
#[command(name = "planpoker-server")]
#[command(about = "Real-time planning-poker room server")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:3001")]
    bind: String,

    /// Maximum participants per room
    #[arg(long, default_value_t = RoomConfig::DEFAULT_MAX_PARTICIPANTS)]
    max_participants: usize,

    /// Longest countdown a host may start, in seconds
    #[arg(long, default_value = "3600")]
    max_timer_secs: u64,

    /// Close connections that send nothing for this many seconds
    #[arg(long, default_value = "60")]
    idle_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let room_config = RoomConfig {
        max_participants: args.max_participants,
        max_timer_secs: args.max_timer_secs,
    };

    let server = PlanPokerServer::builder()
        .bind(&args.bind)
        .room_config(room_config)
        .idle_timeout(Duration::from_secs(args.idle_timeout_secs))
        .build()
        .await?;

    tracing::info!("Server listening on {}", server.local_addr()?);

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("shutting down"),
    }

    Ok(())
}
