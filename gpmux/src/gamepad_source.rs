//! The client-side sender loop's input collaborator: samples physical
//! controllers. Real hardware access is platform-specific and out of
//! scope; [`NullGamepadSource`] always reports a neutral, single
//! controller so the client binary runs end to end without hardware.

use protocol::GamepadState;

/// A peripheral connect/disconnect event surfaced between samples.
pub enum PeripheralEvent {
    Connected(String),
    Disconnected(String),
}

pub trait GamepadSource: Send {
    /// The local controller indices currently present.
    fn connected_controllers(&self) -> Vec<u8>;

    /// The current reading for one connected controller.
    fn sample(&mut self, controller_index: u8) -> GamepadState;

    /// Peripheral events observed since the last call, drained.
    fn poll_events(&mut self) -> Vec<PeripheralEvent>;
}

/// Reports exactly one controller, always at rest, and no peripheral
/// events — a stand-in until real hardware sampling is wired up.
#[derive(Default)]
pub struct NullGamepadSource;

impl GamepadSource for NullGamepadSource {
    fn connected_controllers(&self) -> Vec<u8> {
        vec![0]
    }

    fn sample(&mut self, _controller_index: u8) -> GamepadState {
        GamepadState::neutral()
    }

    fn poll_events(&mut self) -> Vec<PeripheralEvent> {
        Vec::new()
    }
}
