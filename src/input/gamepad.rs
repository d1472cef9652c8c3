//! Gamepad readings and their mapping onto the controller snapshot

use super::snapshot::{
    encode_buttons, scale_axis, scale_trigger, ControllerSnapshot, AXIS_COUNT, BUTTON_COUNT,
};

/// Button index of the left analog trigger
pub const LEFT_TRIGGER_BUTTON: usize = 6;
/// Button index of the right analog trigger
pub const RIGHT_TRIGGER_BUTTON: usize = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ButtonReading {
    pub pressed: bool,
    /// Analog value in [0, 1]
    pub value: f32,
}

/// One poll of a gamepad. Devices may report fewer axes or buttons than
/// the snapshot carries; missing entries read as centered / released.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamepadReading {
    pub axes: Vec<f32>,
    pub buttons: Vec<ButtonReading>,
}

impl GamepadReading {
    fn axis(&self, index: usize) -> f32 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }

    fn trigger(&self, index: usize) -> u8 {
        self.buttons
            .get(index)
            .map(|b| scale_trigger(b.value))
            .unwrap_or(0)
    }

    /// Overwrite every byte of `snapshot` from this reading
    pub fn fill(&self, snapshot: &mut ControllerSnapshot) {
        for axis in 0..AXIS_COUNT {
            snapshot.set_axis(axis, scale_axis(self.axis(axis)));
        }

        snapshot.set_triggers(
            self.trigger(LEFT_TRIGGER_BUTTON),
            self.trigger(RIGHT_TRIGGER_BUTTON),
        );

        snapshot.set_buttons(encode_buttons(
            self.buttons
                .iter()
                .take(BUTTON_COUNT)
                .enumerate()
                .filter(|(_, b)| b.pressed)
                .map(|(i, _)| i),
        ));
    }
}

/// A polled gamepad device
pub trait GamepadSource: Send {
    /// Latest reading, or `None` when no gamepad is connected
    fn poll(&mut self) -> Option<GamepadReading>;
}

/// Source for machines without a gamepad
#[derive(Debug, Default)]
pub struct NoGamepad;

impl GamepadSource for NoGamepad {
    fn poll(&mut self) -> Option<GamepadReading> {
        None
    }
}
