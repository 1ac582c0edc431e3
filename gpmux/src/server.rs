//! Server role: bind the control listener and the datagram socket,
//! then run the accept loop, datagram ingestion, and tick loop
//! concurrently until Ctrl-C.

use std::sync::Arc;

use tokio::net::{TcpListener, UdpSocket};
use tracing::{error, info};

use crate::cli::Cli;
use crate::config;
use crate::datagram;
use crate::error::AppError;
use crate::handshake::run_control_session;
use crate::keysink::LoggingKeySink;
use crate::registry::ClientRegistry;
use crate::state_store::StateStore;
use crate::tick;

pub async fn run(cli: &Cli) -> Result<(), AppError> {
    let config = Arc::new(config::load(&cli.config)?);
    let addr = format!("{}:{}", cli.domain, cli.port);

    let listener = TcpListener::bind(&addr).await?;
    let udp_socket = UdpSocket::bind(&addr).await?;
    info!(%addr, "listening");

    let registry = Arc::new(ClientRegistry::new());
    let store = Arc::new(StateStore::new());
    let sink: Arc<dyn crate::keysink::KeySink> = Arc::new(LoggingKeySink);

    let accept_task = tokio::spawn(accept_loop(listener, registry.clone(), config.clone()));
    let datagram_task = tokio::spawn(datagram::run(udp_socket, registry.clone(), store.clone()));
    let tick_task = tokio::spawn(tick::run(registry.clone(), store.clone(), config.clone(), sink));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received Ctrl-C, shutting down");
        }
        result = accept_task => {
            if let Err(error) = result {
                error!(%error, "accept loop task panicked");
            }
        }
        result = datagram_task => {
            match result {
                Ok(Err(error)) => error!(%error, "datagram ingestion failed"),
                Err(error) => error!(%error, "datagram task panicked"),
                Ok(Ok(())) => {}
            }
        }
        result = tick_task => {
            if let Err(error) = result {
                error!(%error, "tick loop task panicked");
            }
        }
    }

    Ok(())
}

async fn accept_loop(listener: TcpListener, registry: Arc<ClientRegistry>, config: Arc<config::Config>) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(error) => {
                error!(%error, "failed to accept connection");
                continue;
            }
        };
        info!(%peer, "accepted control connection");

        let registry = registry.clone();
        let config = config.clone();
        tokio::spawn(async move {
            run_control_session(stream, peer, registry, config).await;
        });
    }
}
