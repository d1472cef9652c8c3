//! Local input sampling: gamepad first, keyboard emulation otherwise

pub mod gamepad;
#[cfg(feature = "gamepad")]
pub mod gilrs_pad;
pub mod keyboard;
pub mod snapshot;

pub use gamepad::{ButtonReading, GamepadReading, GamepadSource, NoGamepad};
#[cfg(feature = "gamepad")]
pub use gilrs_pad::GilrsGamepad;
pub use keyboard::{Key, KeyboardState};
pub use snapshot::ControllerSnapshot;

use std::sync::Arc;

use parking_lot::Mutex;

/// Which device produced the latest sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Gamepad,
    Keyboard,
}

/// Samples the active input device into a controller snapshot
pub struct InputSampler {
    gamepad: Box<dyn GamepadSource>,
    keyboard: Arc<Mutex<KeyboardState>>,
    last_source: Option<InputSource>,
}

impl InputSampler {
    pub fn new(gamepad: Box<dyn GamepadSource>, keyboard: Arc<Mutex<KeyboardState>>) -> Self {
        Self {
            gamepad,
            keyboard,
            last_source: None,
        }
    }

    /// Fully repopulate `snapshot` from whichever device is present
    pub fn sample(&mut self, snapshot: &mut ControllerSnapshot) -> InputSource {
        let source = match self.gamepad.poll() {
            Some(reading) => {
                reading.fill(snapshot);
                InputSource::Gamepad
            }
            None => {
                self.keyboard.lock().fill(snapshot);
                InputSource::Keyboard
            }
        };

        if self.last_source != Some(source) {
            tracing::info!(source = ?source, "Input source changed");
            self.last_source = Some(source);
        }

        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Gamepad that is plugged in for a fixed number of polls
    struct FlakyPad {
        polls_left: usize,
    }

    impl GamepadSource for FlakyPad {
        fn poll(&mut self) -> Option<GamepadReading> {
            if self.polls_left == 0 {
                return None;
            }
            self.polls_left -= 1;
            Some(GamepadReading {
                axes: vec![1.0, 1.0, 1.0, 1.0],
                buttons: Vec::new(),
            })
        }
    }

    #[test]
    fn gamepad_wins_then_keyboard_takes_over() {
        let keyboard = Arc::new(Mutex::new(KeyboardState::new()));
        keyboard.lock().press(Key::A);

        let mut sampler = InputSampler::new(Box::new(FlakyPad { polls_left: 1 }), keyboard);
        let mut snap = ControllerSnapshot::neutral();

        assert_eq!(sampler.sample(&mut snap), InputSource::Gamepad);
        assert_eq!(snap.axis(0), 255);

        assert_eq!(sampler.sample(&mut snap), InputSource::Keyboard);
        assert_eq!(snap.axis(0), 0);
        assert_eq!(snap.axis(1), 127);
    }

    #[test]
    fn keyboard_changes_are_seen_on_next_sample() {
        let keyboard = Arc::new(Mutex::new(KeyboardState::new()));
        let mut sampler = InputSampler::new(Box::new(NoGamepad), keyboard.clone());
        let mut snap = ControllerSnapshot::neutral();

        sampler.sample(&mut snap);
        assert_eq!(snap, ControllerSnapshot::neutral());

        keyboard.lock().press(Key::Shift);
        sampler.sample(&mut snap);
        assert_eq!(snap.triggers(), (255, 0));
    }
}
