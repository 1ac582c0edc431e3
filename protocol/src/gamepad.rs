//! Gamepad state snapshot and its fixed 31-byte datagram encoding.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::WireError;

/// Number of buttons in a [`GamepadState`] (see the button-index vocabulary
/// in the glossary: A, B, X, Y, LB, RB, Back, Start, Guide, LThumb,
/// RThumb, DPad Up/Right/Down/Left).
pub const BUTTON_COUNT: usize = 15;

/// Number of axes: left stick X/Y, right stick X/Y, left trigger, right
/// trigger.
pub const AXIS_COUNT: usize = 6;

/// Axis indices 0..=3 are analog sticks resting at 0.0.
const STICK_AXES: std::ops::Range<usize> = 0..4;

/// Deadzone magnitude below which a stick axis reading is ignored (not
/// even added to the averaging denominator).
pub const STICK_DEADZONE: f32 = 0.20;

/// Deadzone above the resting value (-1.0) below which a trigger axis
/// reading is treated as fully released.
pub const TRIGGER_DEADZONE: f32 = 0.40;

/// Exact wire size of one gamepad datagram.
pub const DATAGRAM_LEN: usize = 31;

/// A snapshot of one physical (or virtual) controller: 15 buttons and 6
/// axes. Sticks rest at 0.0 in `[-1, 1]`; triggers rest at -1.0 in
/// `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamepadState {
    pub buttons: [bool; BUTTON_COUNT],
    pub axes: [f32; AXIS_COUNT],
}

impl GamepadState {
    /// All buttons released, sticks centered, triggers at rest.
    pub fn neutral() -> Self {
        let mut axes = [0.0; AXIS_COUNT];
        for axis in axes.iter_mut().skip(STICK_AXES.end) {
            *axis = -1.0;
        }
        GamepadState {
            buttons: [false; BUTTON_COUNT],
            axes,
        }
    }

    /// True if `axis` is one of the two analog sticks (0..=3).
    pub fn is_stick_axis(axis: usize) -> bool {
        STICK_AXES.contains(&axis)
    }
}

impl Default for GamepadState {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Decode a 31-byte UDP datagram into `(packet_id, controller_index, state)`.
/// Fails with [`WireError::Malformed`] if `buf.len() != 31`.
pub fn decode_datagram(buf: &[u8]) -> Result<(u32, u8, GamepadState), WireError> {
    if buf.len() != DATAGRAM_LEN {
        return Err(WireError::Malformed("datagram length must be exactly 31 bytes"));
    }

    let mut cursor = Bytes::copy_from_slice(buf);
    let packet_id = cursor.get_u32();
    let controller_index = cursor.get_u8();

    let button_bytes = [cursor.get_u8(), cursor.get_u8()];
    let mut buttons = [false; BUTTON_COUNT];
    for (i, button) in buttons.iter_mut().enumerate() {
        let byte = button_bytes[i / 8];
        *button = (byte >> (7 - (i % 8))) & 1 == 1;
    }

    let mut axes = [0.0f32; AXIS_COUNT];
    for axis in axes.iter_mut() {
        *axis = f32::from_bits(cursor.get_u32());
    }

    Ok((packet_id, controller_index, GamepadState { buttons, axes }))
}

/// Encode `(packet_id, controller_index, state)` into a 31-byte datagram.
pub fn encode_datagram(packet_id: u32, controller_index: u8, state: &GamepadState) -> Bytes {
    let mut buf = BytesMut::with_capacity(DATAGRAM_LEN);
    buf.put_u32(packet_id);
    buf.put_u8(controller_index);

    let mut button_bytes = [0u8; 2];
    for (i, &pressed) in state.buttons.iter().enumerate() {
        if pressed {
            button_bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    buf.put_slice(&button_bytes);

    for &axis in &state.axes {
        buf.put_u32(axis.to_bits());
    }

    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_state_matches_spec_resting_values() {
        let neutral = GamepadState::neutral();
        assert_eq!(neutral.axes[0..4], [0.0, 0.0, 0.0, 0.0]);
        assert_eq!(neutral.axes[4..6], [-1.0, -1.0]);
        assert!(neutral.buttons.iter().all(|&b| !b));
    }

    #[test]
    fn datagram_round_trips() {
        let mut state = GamepadState::neutral();
        state.buttons[0] = true;
        state.buttons[14] = true;
        state.axes = [0.5, -0.25, 1.0, -1.0, 0.3, -0.8];

        let encoded = encode_datagram(42, 3, &state);
        assert_eq!(encoded.len(), DATAGRAM_LEN);

        let (packet_id, controller_index, decoded) = decode_datagram(&encoded).unwrap();
        assert_eq!(packet_id, 42);
        assert_eq!(controller_index, 3);
        assert_eq!(decoded, state);
    }

    #[test]
    fn datagram_rejects_wrong_length() {
        assert!(decode_datagram(&[0u8; 30]).is_err());
        assert!(decode_datagram(&[0u8; 32]).is_err());
    }

    #[test]
    fn button_bit_packing_matches_byte_boundary() {
        let mut state = GamepadState::neutral();
        // Button 7 is the last bit of the first byte, button 8 the first
        // bit of the second.
        state.buttons[7] = true;
        state.buttons[8] = true;
        let encoded = encode_datagram(0, 0, &state);
        assert_eq!(encoded[5], 0b0000_0001);
        assert_eq!(encoded[6], 0b1000_0000);
    }
}
