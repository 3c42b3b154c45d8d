//! Build script for platter-daemon
//!
//! Validates the embedded platter.toml at compile time so a broken default
//! configuration never ships.

use std::fs;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=platter.toml");
    println!("cargo:rerun-if-changed=build.rs");

    let config_path = Path::new("platter.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => panic!("failed to read platter.toml: {}", e),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => panic!("invalid TOML syntax in platter.toml:\n{}", e),
    };

    let errors = validate_channels(&config);
    if !errors.is_empty() {
        panic!(
            "invalid platter.toml:\n{}",
            errors
                .iter()
                .map(|e| format!("  - {}", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

/// Check the `[[channel]]` array: required keys and no reused pins
fn validate_channels(config: &toml::Value) -> Vec<String> {
    let channels = match config.get("channel") {
        Some(toml::Value::Array(channels)) if !channels.is_empty() => channels,
        _ => return vec!["at least one [[channel]] is required".to_string()],
    };

    let mut errors = Vec::new();
    let mut ids = Vec::new();
    let mut pins = Vec::new();

    for (index, channel) in channels.iter().enumerate() {
        let Some(table) = channel.as_table() else {
            errors.push(format!("channel #{} must be a table", index + 1));
            continue;
        };

        match table.get("id").and_then(|v| v.as_integer()) {
            Some(id) if ids.contains(&id) => errors.push(format!("channel id {} defined twice", id)),
            Some(id) => ids.push(id),
            None => errors.push(format!("channel #{} missing 'id'", index + 1)),
        }

        for key in ["speed_pin", "brake_pin", "direction_pin"] {
            match table.get(key).and_then(|v| v.as_integer()) {
                Some(pin) if pins.contains(&pin) => {
                    errors.push(format!("pin {} assigned twice", pin))
                }
                Some(pin) => pins.push(pin),
                None => errors.push(format!("channel #{} missing '{}'", index + 1, key)),
            }
        }
    }

    errors
}
