//! The 100ms server tick: snapshot the registry and state store, run
//! the multiplexer, and translate the resulting virtual gamepad into
//! key-down/key-up events on the configured [`KeySink`] (spec.md §4.6).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use protocol::{ClientRules, GamepadState, is_joystick_axis};
use tokio::time::interval;

use crate::config::Config;
use crate::keysink::KeySink;
use crate::multiplexer::multiplex;
use crate::registry::ClientRegistry;
use crate::state_store::StateStore;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

pub async fn run(registry: Arc<ClientRegistry>, store: Arc<StateStore>, config: Arc<Config>, sink: Arc<dyn KeySink>) {
    let mut ticker = interval(TICK_INTERVAL);
    let mut previous = GamepadState::neutral();

    loop {
        ticker.tick().await;

        let assignments: HashMap<u8, ClientRules> = registry
            .snapshot()
            .await
            .into_iter()
            .map(|session| (session.id, session.rules))
            .collect();
        let snapshot = store.snapshot().await;

        let current = multiplex(&assignments, &snapshot);
        emit_transitions(&previous, &current, &config, sink.as_ref());
        previous = current;
    }
}

fn emit_transitions(previous: &GamepadState, current: &GamepadState, config: &Config, sink: &dyn KeySink) {
    for (&button, (key, _)) in &config.output.buttons {
        let button = button as usize;
        match (previous.buttons[button], current.buttons[button]) {
            (false, true) => sink.key_down(key),
            (true, false) => sink.key_up(key),
            _ => {}
        }
    }

    for (&axis, (key0, key1)) in &config.output.axes {
        let value = current.axes[axis as usize];
        if is_joystick_axis(axis) {
            match value.partial_cmp(&0.0) {
                Some(std::cmp::Ordering::Greater) => {
                    sink.key_up(key0);
                    sink.key_down(key1);
                }
                Some(std::cmp::Ordering::Less) => {
                    sink.key_down(key0);
                    sink.key_up(key1);
                }
                _ => {
                    sink.key_up(key0);
                    sink.key_up(key1);
                }
            }
        } else if value != -1.0 {
            sink.key_down(key0);
        } else {
            sink.key_up(key0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::OutputKeyMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<(bool, String)>>,
    }

    impl KeySink for RecordingSink {
        fn key_down(&self, key: &str) {
            self.events.lock().unwrap().push((true, key.to_string()));
        }
        fn key_up(&self, key: &str) {
            self.events.lock().unwrap().push((false, key.to_string()));
        }
    }

    fn config_with(output: OutputKeyMap) -> Config {
        Config {
            rules: HashMap::new(),
            output,
        }
    }

    #[test]
    fn button_press_emits_key_down_once() {
        let mut output = OutputKeyMap::default();
        output.buttons.insert(0, ("space".into(), String::new()));
        let config = config_with(output);
        let sink = RecordingSink::default();

        let mut previous = GamepadState::neutral();
        let mut current = GamepadState::neutral();
        current.buttons[0] = true;
        emit_transitions(&previous, &current, &config, &sink);
        previous = current;
        emit_transitions(&previous, &previous.clone(), &config, &sink);

        let events = sink.events.lock().unwrap();
        assert_eq!(*events, vec![(true, "space".to_string())]);
    }

    #[test]
    fn joystick_axis_direction_selects_key() {
        let mut output = OutputKeyMap::default();
        output.axes.insert(0, ("left".into(), "right".into()));
        let config = config_with(output);
        let sink = RecordingSink::default();

        let previous = GamepadState::neutral();
        let mut current = GamepadState::neutral();
        current.axes[0] = 0.9;
        emit_transitions(&previous, &current, &config, &sink);

        let events = sink.events.lock().unwrap();
        assert!(events.contains(&(false, "left".to_string())));
        assert!(events.contains(&(true, "right".to_string())));
    }

    #[test]
    fn trigger_at_rest_emits_key_up() {
        let mut output = OutputKeyMap::default();
        output.axes.insert(4, ("shift".into(), String::new()));
        let config = config_with(output);
        let sink = RecordingSink::default();

        let previous = GamepadState::neutral();
        let current = GamepadState::neutral();
        emit_transitions(&previous, &current, &config, &sink);

        let events = sink.events.lock().unwrap();
        assert_eq!(*events, vec![(false, "shift".to_string())]);
    }
}
