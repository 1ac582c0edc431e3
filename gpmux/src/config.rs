//! YAML configuration loader. Turns a human-written `clients`/`mapping`
//! document into the in-memory [`protocol::ServerRules`] and
//! [`protocol::OutputKeyMap`] that drive the multiplexer and the tick
//! loop. Mirrors `examples/original_source/multiplex.go` and
//! `argparser.go`'s `readConfig`/`stringToRule`, translated from a
//! fatal-on-bad-rule `log.Fatalf` into a typed error the caller decides
//! how to report.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use protocol::{ClientRules, OutputKeyMap, Rule, ServerRules, is_joystick_axis, parse_rule_name};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unrecognized rule name `{0}`")]
    UnknownRule(String),

    #[error("controller index `{0}` is not a valid integer in 0..15")]
    BadControllerIndex(String),

    #[error("mapping for `{rule}` must name one or two keys, found {count}")]
    BadKeyCount { rule: String, count: usize },
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    clients: HashMap<String, HashMap<String, Vec<String>>>,
    mapping: HashMap<String, String>,
}

/// The loaded, validated configuration: server-wide routing rules plus
/// the keyboard key each rule drives.
pub struct Config {
    pub rules: ServerRules,
    pub output: OutputKeyMap,
}

/// Load and validate a configuration file at `path`.
pub fn load(path: &str) -> Result<Config, ConfigError> {
    let raw_text = std::fs::read_to_string(path)?;
    let raw: RawConfig = serde_yaml::from_str(&raw_text)?;

    let mut rules: ServerRules = HashMap::new();
    for (client_name, controllers) in raw.clients {
        let mut client_rules: ClientRules = HashMap::new();
        for (controller_key, rule_names) in controllers {
            let controller_index: u8 = controller_key
                .parse()
                .map_err(|_| ConfigError::BadControllerIndex(controller_key.clone()))?;
            let mut rule_list = Vec::with_capacity(rule_names.len());
            for rule_name in rule_names {
                let rule = parse_rule_name(&rule_name)
                    .ok_or_else(|| ConfigError::UnknownRule(rule_name.clone()))?;
                rule_list.push(rule);
            }
            client_rules.insert(controller_index, rule_list);
        }
        rules.insert(client_name, client_rules);
    }

    let mut output = OutputKeyMap::default();
    for (rule_name, keys) in raw.mapping {
        let rule = parse_rule_name(&rule_name).ok_or_else(|| ConfigError::UnknownRule(rule_name.clone()))?;
        let parts: Vec<&str> = keys.split_whitespace().collect();

        match rule {
            Rule::Button(index) => {
                if parts.len() != 1 {
                    return Err(ConfigError::BadKeyCount {
                        rule: rule_name,
                        count: parts.len(),
                    });
                }
                output.buttons.insert(index, (parts[0].to_string(), String::new()));
            }
            Rule::Axis(index) if is_joystick_axis(index) => {
                if parts.len() != 2 {
                    return Err(ConfigError::BadKeyCount {
                        rule: rule_name,
                        count: parts.len(),
                    });
                }
                output
                    .axes
                    .insert(index, (parts[0].to_string(), parts[1].to_string()));
            }
            Rule::Axis(index) => {
                if parts.len() != 1 {
                    return Err(ConfigError::BadKeyCount {
                        rule: rule_name,
                        count: parts.len(),
                    });
                }
                output.axes.insert(index, (parts[0].to_string(), String::new()));
            }
        }
    }

    Ok(Config { rules, output })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_clients_and_mapping() {
        let file = write_temp_config(
            r#"
clients:
  alice:
    "0": [BUTTON_A, AXIS_LEFT_X]
mapping:
  BUTTON_A: space
  AXIS_LEFT_X: left right
"#,
        );
        let config = load(file.path().to_str().unwrap()).unwrap();
        assert!(config.rules.contains_key("alice"));
        let alice_rules = &config.rules["alice"][&0];
        assert_eq!(alice_rules.len(), 2);
        assert_eq!(config.output.buttons[&0].0, "space");
        assert_eq!(config.output.axes[&0], ("left".to_string(), "right".to_string()));
    }

    #[test]
    fn unknown_rule_name_is_an_error() {
        let file = write_temp_config(
            r#"
clients:
  alice:
    "0": [BUTTON_NOT_A_THING]
mapping: {}
"#,
        );
        assert!(matches!(
            load(file.path().to_str().unwrap()),
            Err(ConfigError::UnknownRule(_))
        ));
    }

    #[test]
    fn joystick_axis_requires_two_keys() {
        let file = write_temp_config(
            r#"
clients: {}
mapping:
  AXIS_LEFT_X: onlyone
"#,
        );
        assert!(matches!(
            load(file.path().to_str().unwrap()),
            Err(ConfigError::BadKeyCount { .. })
        ));
    }

    #[test]
    fn trigger_axis_requires_one_key() {
        let file = write_temp_config(
            r#"
clients: {}
mapping:
  AXIS_LEFT_TRIGGER: shift
"#,
        );
        let config = load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.output.axes[&4].0, "shift");
    }
}
