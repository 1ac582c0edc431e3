//! Client role: REGISTER over TCP, then sample local controllers and
//! stream UDP datagrams at 100ms cadence until Ctrl-C, at which point a
//! DONE frame is sent before exit (spec.md §4.7).

use std::time::Duration;

use tokio::net::{TcpStream, UdpSocket};
use tokio::time::interval;
use tracing::{error, info};

use protocol::{ControlFrame, FrameType, encode_datagram};

use crate::cli::Cli;
use crate::error::AppError;
use crate::frame_io::write_frame;
use crate::gamepad_source::{GamepadSource, NullGamepadSource};
use crate::handshake::register_client;

pub async fn run(cli: &Cli) -> Result<(), AppError> {
    let addr = format!("{}:{}", cli.domain, cli.port);

    let mut control_stream = TcpStream::connect(&addr).await?;
    let (client_id, rules) = register_client(&mut control_stream, &cli.name)
        .await
        .map_err(AppError::Handshake)?;
    info!(client_id, controllers = rules.len(), "registered");

    let datagram_socket = UdpSocket::bind("0.0.0.0:0").await?;
    datagram_socket.connect(&addr).await?;

    let mut source = NullGamepadSource;
    let mut ticker = interval(Duration::from_millis(100));
    let mut packet_id: u32 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for event in source.poll_events() {
                    if let Err(error) = report_peripheral_event(&mut control_stream, event).await {
                        error!(%error, "failed to report peripheral event");
                    }
                }

                for controller_index in source.connected_controllers() {
                    let state = source.sample(controller_index);
                    let datagram = encode_datagram(packet_id, controller_index, &state);
                    if let Err(error) = datagram_socket.send(&datagram).await {
                        error!(%error, "send failed, aborting");
                        return Err(AppError::Io(error));
                    }
                    packet_id = packet_id.wrapping_add(1);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down, sending DONE");
                let _ = write_frame(&mut control_stream, &ControlFrame::empty(FrameType::Done)).await;
                return Ok(());
            }
        }
    }
}

async fn report_peripheral_event(
    stream: &mut TcpStream,
    event: crate::gamepad_source::PeripheralEvent,
) -> Result<(), protocol::WireError> {
    use crate::gamepad_source::PeripheralEvent;
    let frame = match event {
        PeripheralEvent::Connected(descriptor) => {
            ControlFrame::new(FrameType::PeripheralConnect, descriptor.into_bytes())
        }
        PeripheralEvent::Disconnected(descriptor) => {
            ControlFrame::new(FrameType::PeripheralDisconnect, descriptor.into_bytes())
        }
    };
    write_frame(stream, &frame).await
}
