//! Multiplex rules and their compiled wire encoding (the payload of a
//! CONFIGURATION frame).

use std::collections::HashMap;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::config_model::ClientRules;
use crate::error::WireError;

/// Byte that terminates a controller block in the compiled rule table.
/// Also the largest representable button/axis index (7 bits), which the
/// 15-button/6-axis domain never reaches — see spec.md §4.1's open
/// question about this collision being benign in practice.
const BLOCK_TERMINATOR: u8 = 0xFF;

/// Bit 7 of a rule byte selects button (0) vs axis (1); bits 0..6 hold the
/// index.
const AXIS_TAG: u8 = 0b1000_0000;

/// A single input dimension of a source controller that contributes to
/// the same dimension of the virtual gamepad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Button(u8),
    Axis(u8),
}

impl Rule {
    fn to_byte(self) -> u8 {
        match self {
            Rule::Button(index) => index,
            Rule::Axis(index) => index | AXIS_TAG,
        }
    }

    fn from_byte(byte: u8) -> Rule {
        if byte & AXIS_TAG != 0 {
            Rule::Axis(byte & !AXIS_TAG)
        } else {
            Rule::Button(byte)
        }
    }
}

/// Ordered list of rules for one controller. Order carries no semantic
/// meaning (rules are idempotent) but is preserved across the wire for
/// the round-trip property in spec.md §8.
pub type RuleList = Vec<Rule>;

/// Encode a client's per-controller rules as the compiled rule table:
/// repeated `controller-index, rule-byte..., 0xFF` blocks concatenated
/// to end of payload.
pub fn encode_rule_table(rules: &ClientRules) -> Bytes {
    let mut buf = BytesMut::new();
    // Iterate in controller-index order so re-encoding the same rules is
    // deterministic even though the map itself is unordered.
    let mut controllers: Vec<&u8> = rules.keys().collect();
    controllers.sort_unstable();

    for &controller_index in controllers {
        buf.put_u8(controller_index);
        for rule in &rules[&controller_index] {
            buf.put_u8(rule.to_byte());
        }
        buf.put_u8(BLOCK_TERMINATOR);
    }
    buf.freeze()
}

/// Decode a compiled rule table back into per-controller rule lists.
pub fn decode_rule_table(buf: &[u8]) -> Result<ClientRules, WireError> {
    let mut cursor = Bytes::copy_from_slice(buf);
    let mut rules: ClientRules = HashMap::new();

    while cursor.has_remaining() {
        if !cursor.has_remaining() {
            return Err(WireError::Malformed("rule table truncated before controller index"));
        }
        let controller_index = cursor.get_u8();
        let mut list = RuleList::new();
        loop {
            if !cursor.has_remaining() {
                return Err(WireError::Malformed("rule table truncated before block terminator"));
            }
            let byte = cursor.get_u8();
            if byte == BLOCK_TERMINATOR {
                break;
            }
            list.push(Rule::from_byte(byte));
        }
        rules.insert(controller_index, list);
    }

    Ok(rules)
}
