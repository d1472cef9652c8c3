//! Keyboard emulation of the controller

use std::collections::HashSet;

use super::snapshot::{encode_buttons, ControllerSnapshot, AXIS_NEUTRAL};

/// Keys the client listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Shift,
    Space,
    /// Number row key, 0..=9
    Digit(u8),
}

impl Key {
    /// Parse a key name as browsers spell `KeyboardEvent.key`
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            " " => Self::Space,
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            _ => match name.to_ascii_lowercase().as_str() {
                "w" => Self::W,
                "a" => Self::A,
                "s" => Self::S,
                "d" => Self::D,
                "shift" => Self::Shift,
                "space" => Self::Space,
                "up" => Self::ArrowUp,
                "down" => Self::ArrowDown,
                "left" => Self::ArrowLeft,
                "right" => Self::ArrowRight,
                digit if digit.len() == 1 && digit.as_bytes()[0].is_ascii_digit() => {
                    Self::Digit(digit.as_bytes()[0] - b'0')
                }
                _ => return None,
            },
        };
        Some(key)
    }

    /// Button bit for number keys: "1" is bit 0, "9" bit 8, "0" bit 9
    pub fn button_bit(self) -> Option<usize> {
        match self {
            Self::Digit(0) => Some(9),
            Self::Digit(d @ 1..=9) => Some(d as usize - 1),
            _ => None,
        }
    }
}

/// (negative key, positive key) for each axis
const AXIS_KEYS: [(Key, Key); 4] = [
    (Key::A, Key::D),
    (Key::W, Key::S),
    (Key::ArrowLeft, Key::ArrowRight),
    (Key::ArrowUp, Key::ArrowDown),
];

/// Currently held keys
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<Key>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        self.held.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Overwrite every byte of `snapshot` from the held keys
    pub fn fill(&self, snapshot: &mut ControllerSnapshot) {
        for (axis, (negative, positive)) in AXIS_KEYS.iter().enumerate() {
            snapshot.set_axis(axis, axis_value(self.is_held(*negative), self.is_held(*positive)));
        }

        snapshot.set_triggers(
            if self.is_held(Key::Shift) { 255 } else { 0 },
            if self.is_held(Key::Space) { 255 } else { 0 },
        );

        snapshot.set_buttons(encode_buttons(
            self.held.iter().filter_map(|key| key.button_bit()),
        ));
    }
}

/// Three-way axis policy; opposite keys cancel to center
pub fn axis_value(negative: bool, positive: bool) -> u8 {
    match (negative, positive) {
        (true, false) => 0,
        (false, true) => 255,
        _ => AXIS_NEUTRAL,
    }
}
