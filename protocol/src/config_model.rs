//! In-memory representation of routing rules and output key mappings.
//! Populated by the YAML config loader in the `gpmux` binary; this module
//! only owns the types and the rule-name vocabulary, not file I/O.

use std::collections::HashMap;

use crate::rules::{Rule, RuleList};

/// Per-controller rule lists for one client, keyed by controller index
/// (0..15).
pub type ClientRules = HashMap<u8, RuleList>;

/// Server-wide rules: client name -> that client's per-controller rules.
/// Loaded once at server start, immutable for the process lifetime.
pub type ServerRules = HashMap<String, ClientRules>;

/// button-index -> (key0, key1). `key1` is always empty for buttons.
pub type ButtonMap = HashMap<u8, (String, String)>;

/// axis-index -> (key0, key1). Trigger axes (4, 5) only use `key0`.
pub type AxisMap = HashMap<u8, (String, String)>;

/// The two output mappings the config loader produces: which keyboard
/// key(s) each button/axis drives.
#[derive(Debug, Clone, Default)]
pub struct OutputKeyMap {
    pub buttons: ButtonMap,
    pub axes: AxisMap,
}

/// True if `axis` is a joystick axis (requires two output keys): 0..=3.
pub fn is_joystick_axis(axis: u8) -> bool {
    (0..4).contains(&axis)
}

/// Parse one rule-name string from spec.md §6's vocabulary into a [`Rule`].
/// Returns `None` for an unrecognized name — the caller (the config
/// loader) turns that into a fatal `ConfigError`.
pub fn parse_rule_name(name: &str) -> Option<Rule> {
    let rule = match name {
        "BUTTON_A" | "BUTTON_CROSS" => Rule::Button(0),
        "BUTTON_B" | "BUTTON_CIRCLE" => Rule::Button(1),
        "BUTTON_X" | "BUTTON_SQUARE" => Rule::Button(2),
        "BUTTON_Y" | "BUTTON_TRIANGLE" => Rule::Button(3),
        "BUTTON_LEFT_BUMPER" => Rule::Button(4),
        "BUTTON_RIGHT_BUMPER" => Rule::Button(5),
        "BUTTON_BACK" => Rule::Button(6),
        "BUTTON_START" => Rule::Button(7),
        "BUTTON_GUIDE" => Rule::Button(8),
        "BUTTON_LEFT_THUMB" => Rule::Button(9),
        "BUTTON_RIGHT_THUMB" => Rule::Button(10),
        "BUTTON_DPAD_UP" => Rule::Button(11),
        "BUTTON_DPAD_RIGHT" => Rule::Button(12),
        "BUTTON_DPAD_DOWN" => Rule::Button(13),
        "BUTTON_DPAD_LEFT" => Rule::Button(14),
        "AXIS_LEFT_X" => Rule::Axis(0),
        "AXIS_LEFT_Y" => Rule::Axis(1),
        "AXIS_RIGHT_X" => Rule::Axis(2),
        "AXIS_RIGHT_Y" => Rule::Axis(3),
        "AXIS_LEFT_TRIGGER" => Rule::Axis(4),
        "AXIS_RIGHT_TRIGGER" => Rule::Axis(5),
        _ => return None,
    };
    Some(rule)
}

/// The rule-name string a [`Rule`] maps to, used when the loader needs to
/// key the output maps by the same rule name that named the dimension
/// (the canonical, non-alias spelling).
pub fn rule_name(rule: Rule) -> &'static str {
    match rule {
        Rule::Button(0) => "BUTTON_A",
        Rule::Button(1) => "BUTTON_B",
        Rule::Button(2) => "BUTTON_X",
        Rule::Button(3) => "BUTTON_Y",
        Rule::Button(4) => "BUTTON_LEFT_BUMPER",
        Rule::Button(5) => "BUTTON_RIGHT_BUMPER",
        Rule::Button(6) => "BUTTON_BACK",
        Rule::Button(7) => "BUTTON_START",
        Rule::Button(8) => "BUTTON_GUIDE",
        Rule::Button(9) => "BUTTON_LEFT_THUMB",
        Rule::Button(10) => "BUTTON_RIGHT_THUMB",
        Rule::Button(11) => "BUTTON_DPAD_UP",
        Rule::Button(12) => "BUTTON_DPAD_RIGHT",
        Rule::Button(13) => "BUTTON_DPAD_DOWN",
        Rule::Button(14) => "BUTTON_DPAD_LEFT",
        Rule::Axis(0) => "AXIS_LEFT_X",
        Rule::Axis(1) => "AXIS_LEFT_Y",
        Rule::Axis(2) => "AXIS_RIGHT_X",
        Rule::Axis(3) => "AXIS_RIGHT_Y",
        Rule::Axis(4) => "AXIS_LEFT_TRIGGER",
        Rule::Axis(5) => "AXIS_RIGHT_TRIGGER",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_map_to_the_same_rule() {
        assert_eq!(parse_rule_name("BUTTON_A"), parse_rule_name("BUTTON_CROSS"));
        assert_eq!(parse_rule_name("BUTTON_Y"), parse_rule_name("BUTTON_TRIANGLE"));
    }

    #[test]
    fn unknown_rule_name_is_none() {
        assert!(parse_rule_name("BUTTON_DOES_NOT_EXIST").is_none());
    }

    #[test]
    fn joystick_axes_are_0_through_3() {
        assert!(is_joystick_axis(0));
        assert!(is_joystick_axis(3));
        assert!(!is_joystick_axis(4));
        assert!(!is_joystick_axis(5));
    }
}
