//! KeyCode name conversion for manifests and the command line

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use winit::keyboard::KeyCode;

/// Key names accepted in manifests, in display order
const KEY_NAMES: &[(&str, KeyCode)] = &[
    // Letters
    ("A", KeyCode::KeyA),
    ("B", KeyCode::KeyB),
    ("C", KeyCode::KeyC),
    ("D", KeyCode::KeyD),
    ("E", KeyCode::KeyE),
    ("F", KeyCode::KeyF),
    ("G", KeyCode::KeyG),
    ("H", KeyCode::KeyH),
    ("I", KeyCode::KeyI),
    ("J", KeyCode::KeyJ),
    ("K", KeyCode::KeyK),
    ("L", KeyCode::KeyL),
    ("M", KeyCode::KeyM),
    ("N", KeyCode::KeyN),
    ("O", KeyCode::KeyO),
    ("P", KeyCode::KeyP),
    ("Q", KeyCode::KeyQ),
    ("R", KeyCode::KeyR),
    ("S", KeyCode::KeyS),
    ("T", KeyCode::KeyT),
    ("U", KeyCode::KeyU),
    ("V", KeyCode::KeyV),
    ("W", KeyCode::KeyW),
    ("X", KeyCode::KeyX),
    ("Y", KeyCode::KeyY),
    ("Z", KeyCode::KeyZ),
    // Numbers
    ("0", KeyCode::Digit0),
    ("1", KeyCode::Digit1),
    ("2", KeyCode::Digit2),
    ("3", KeyCode::Digit3),
    ("4", KeyCode::Digit4),
    ("5", KeyCode::Digit5),
    ("6", KeyCode::Digit6),
    ("7", KeyCode::Digit7),
    ("8", KeyCode::Digit8),
    ("9", KeyCode::Digit9),
    // Arrow keys
    ("ArrowUp", KeyCode::ArrowUp),
    ("ArrowDown", KeyCode::ArrowDown),
    ("ArrowLeft", KeyCode::ArrowLeft),
    ("ArrowRight", KeyCode::ArrowRight),
    // Special keys
    ("Space", KeyCode::Space),
    ("Enter", KeyCode::Enter),
    ("Escape", KeyCode::Escape),
    ("Backspace", KeyCode::Backspace),
    ("Tab", KeyCode::Tab),
];

/// Name of a key as written in manifests
pub fn key_name(key: KeyCode) -> Option<&'static str> {
    KEY_NAMES
        .iter()
        .find(|(_, code)| *code == key)
        .map(|(name, _)| *name)
}

/// Parse a key name; letters are case-insensitive
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let name = name.trim();
    KEY_NAMES
        .iter()
        .find(|(known, _)| {
            if known.len() == 1 {
                known.eq_ignore_ascii_case(name)
            } else {
                *known == name
            }
        })
        .map(|(_, code)| *code)
}

/// Serde adapter for `Vec<KeyCode>` fields
pub(crate) mod key_list {
    use super::*;

    pub fn serialize<S: Serializer>(keys: &[KeyCode], serializer: S) -> Result<S::Ok, S::Error> {
        let names: Vec<&str> = keys.iter().filter_map(|key| key_name(*key)).collect();
        names.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<KeyCode>, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        names
            .iter()
            .map(|name| {
                parse_key(name)
                    .ok_or_else(|| serde::de::Error::custom(format!("unknown key name '{}'", name)))
            })
            .collect()
    }
}
