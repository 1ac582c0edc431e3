//! Wire protocol for gpmux: the control-frame codec, the fixed-size gamepad
//! datagram codec, the compiled multiplex-rule table, and the in-memory
//! rule/config model shared between the client and server sides of the one
//! `gpmux` binary.

mod config_model;
mod error;
mod frame;
mod gamepad;
mod rules;

pub use config_model::{
    AxisMap, ButtonMap, ClientRules, OutputKeyMap, ServerRules, is_joystick_axis, parse_rule_name,
    rule_name,
};
pub use error::WireError;
pub use frame::{ControlFrame, FrameType, HEADER_LEN};
pub use gamepad::{
    AXIS_COUNT, BUTTON_COUNT, DATAGRAM_LEN, GamepadState, STICK_DEADZONE, TRIGGER_DEADZONE,
    decode_datagram, encode_datagram,
};
pub use rules::{Rule, RuleList, decode_rule_table, encode_rule_table};
