mod cli;
mod client;
mod config;
mod datagram;
mod error;
mod frame_io;
mod gamepad_source;
mod handshake;
mod keysink;
mod multiplexer;
mod registry;
mod server;
mod session;
mod state_store;
mod tick;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        format!("{}=debug", env!("CARGO_CRATE_NAME"))
    } else {
        format!("{}=info", env!("CARGO_CRATE_NAME"))
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .init();

    let result = if cli.listen {
        server::run(&cli).await
    } else {
        client::run(&cli).await
    };

    if let Err(error) = result {
        tracing::error!(%error, "fatal error");
        std::process::exit(1);
    }
}
