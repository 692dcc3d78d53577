//! Keyboard to module action mapping

use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

use super::keycode::key_list;

/// Movement direction forwarded to the module as a small integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// What a key press asks the host to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Move(Direction),
    /// Full re-initialization of the module
    Reset,
}

/// Keys bound to each action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardMapping {
    #[serde(default = "default_up", with = "key_list")]
    pub up: Vec<KeyCode>,
    #[serde(default = "default_down", with = "key_list")]
    pub down: Vec<KeyCode>,
    #[serde(default = "default_left", with = "key_list")]
    pub left: Vec<KeyCode>,
    #[serde(default = "default_right", with = "key_list")]
    pub right: Vec<KeyCode>,
    #[serde(default = "default_reset", with = "key_list")]
    pub reset: Vec<KeyCode>,
}

fn default_up() -> Vec<KeyCode> {
    vec![KeyCode::KeyW, KeyCode::ArrowUp]
}
fn default_down() -> Vec<KeyCode> {
    vec![KeyCode::KeyS, KeyCode::ArrowDown]
}
fn default_left() -> Vec<KeyCode> {
    vec![KeyCode::KeyA, KeyCode::ArrowLeft]
}
fn default_right() -> Vec<KeyCode> {
    vec![KeyCode::KeyD, KeyCode::ArrowRight]
}
fn default_reset() -> Vec<KeyCode> {
    vec![KeyCode::KeyR]
}

impl Default for KeyboardMapping {
    fn default() -> Self {
        Self {
            up: default_up(),
            down: default_down(),
            left: default_left(),
            right: default_right(),
            reset: default_reset(),
        }
    }
}

impl KeyboardMapping {
    /// Action bound to `key`, if any. Reset wins over movement on conflicts.
    pub fn action_for(&self, key: KeyCode) -> Option<KeyAction> {
        if self.reset.contains(&key) {
            return Some(KeyAction::Reset);
        }
        let bindings = [
            (&self.up, Direction::Up),
            (&self.down, Direction::Down),
            (&self.left, Direction::Left),
            (&self.right, Direction::Right),
        ];
        bindings
            .into_iter()
            .find(|(keys, _)| keys.contains(&key))
            .map(|(_, direction)| KeyAction::Move(direction))
    }
}
