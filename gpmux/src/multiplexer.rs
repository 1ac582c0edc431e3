//! Combines every contributing controller's current state into one
//! virtual gamepad, per spec.md §4.5: deadzone-filtered per-axis
//! averaging and per-button OR reduction.

use std::collections::HashMap;

use protocol::{ClientRules, GamepadState, Rule, STICK_DEADZONE, TRIGGER_DEADZONE};

use crate::state_store::{ClientIdentity, StoreKey};

/// One tick of the multiplexer: `assignments` maps a connected client's
/// id to its rule list (spec.md's "server-wide rules", narrowed to
/// clients currently registered); `store` is the state-store snapshot.
pub fn multiplex(
    assignments: &HashMap<u8, ClientRules>,
    store: &HashMap<StoreKey, GamepadState>,
) -> GamepadState {
    let mut virtual_gamepad = GamepadState::neutral();
    let mut axes_used = [0u32; 6];

    for (&client_id, client_rules) in assignments {
        for (&controller_index, rule_list) in client_rules {
            let key = (ClientIdentity::Registered(client_id), controller_index);
            let Some(state) = store.get(&key) else {
                continue;
            };

            for &rule in rule_list {
                match rule {
                    Rule::Button(button) => {
                        let button = button as usize;
                        virtual_gamepad.buttons[button] |= state.buttons[button];
                    }
                    Rule::Axis(axis) if GamepadState::is_stick_axis(axis as usize) => {
                        let axis = axis as usize;
                        let value = state.axes[axis];
                        if value.abs() > STICK_DEADZONE {
                            virtual_gamepad.axes[axis] += value;
                            axes_used[axis] += 1;
                        }
                    }
                    Rule::Axis(axis) => {
                        let axis = axis as usize;
                        let value = state.axes[axis];
                        if value > -1.0 + TRIGGER_DEADZONE {
                            virtual_gamepad.axes[axis] += value;
                        } else {
                            virtual_gamepad.axes[axis] += -1.0;
                        }
                        axes_used[axis] += 1;
                    }
                }
            }
        }
    }

    for axis in 0..4 {
        virtual_gamepad.axes[axis] = if axes_used[axis] == 0 {
            0.0
        } else {
            virtual_gamepad.axes[axis] / axes_used[axis] as f32
        };
    }
    for axis in 4..6 {
        virtual_gamepad.axes[axis] = if axes_used[axis] == 0 {
            -1.0
        } else {
            virtual_gamepad.axes[axis] / axes_used[axis] as f32
        };
    }

    virtual_gamepad
}
