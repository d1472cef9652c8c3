//! Physical gamepads through gilrs, mapped onto the standard browser layout

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use gilrs::{Axis, Button, EventType, Gamepad, Gilrs};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{info, warn};

use super::gamepad::{ButtonReading, GamepadReading, GamepadSource};

/// Standard axis order with the sign that turns gilrs' Y-up into Y-down
const STANDARD_AXES: [(Axis, f32); 4] = [
    (Axis::LeftStickX, 1.0),
    (Axis::LeftStickY, -1.0),
    (Axis::RightStickX, 1.0),
    (Axis::RightStickY, -1.0),
];

/// Standard button order; indices 6 and 7 are the analog triggers
const STANDARD_BUTTONS: [Button; 16] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
];

/// Build a reading in standard layout order from per-control lookups
pub fn standard_reading(
    axis: impl Fn(Axis) -> f32,
    button: impl Fn(Button) -> ButtonReading,
) -> GamepadReading {
    GamepadReading {
        axes: STANDARD_AXES
            .iter()
            .map(|&(a, sign)| axis(a) * sign)
            .collect(),
        buttons: STANDARD_BUTTONS.iter().map(|&b| button(b)).collect(),
    }
}

fn read_pad(pad: &Gamepad<'_>) -> GamepadReading {
    standard_reading(
        |axis| pad.value(axis),
        |button| {
            let pressed = pad.is_pressed(button);
            let value = pad
                .button_data(button)
                .map(|data| data.value())
                .unwrap_or(if pressed { 1.0 } else { 0.0 });
            ButtonReading { pressed, value }
        },
    )
}

/// Gamepad source fed by a dedicated polling thread. gilrs handles are not
/// `Send` on every platform, so they never leave that thread; the render
/// loop only sees the latest reading.
pub struct GilrsGamepad {
    latest: Arc<Mutex<Option<GamepadReading>>>,
}

impl GilrsGamepad {
    /// Start polling every `poll_every`. Fails when the platform has no
    /// gamepad backend. The thread stops once the source is dropped.
    pub async fn spawn(poll_every: Duration) -> Result<Self, GamepadError> {
        let latest = Arc::new(Mutex::new(None));
        let (ready_tx, ready_rx) = oneshot::channel();

        let shared = latest.clone();
        thread::Builder::new()
            .name("gamepad".to_string())
            .spawn(move || poll_thread(shared, poll_every, ready_tx))?;

        match ready_rx.await {
            Ok(Ok(())) => Ok(Self { latest }),
            Ok(Err(reason)) => Err(GamepadError::Backend(reason)),
            Err(_) => Err(GamepadError::Backend("gamepad thread exited".to_string())),
        }
    }
}

impl GamepadSource for GilrsGamepad {
    fn poll(&mut self) -> Option<GamepadReading> {
        self.latest.lock().clone()
    }
}

fn poll_thread(
    latest: Arc<Mutex<Option<GamepadReading>>>,
    poll_every: Duration,
    ready: oneshot::Sender<Result<(), String>>,
) {
    let mut gilrs = match Gilrs::new() {
        Ok(gilrs) => gilrs,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    for (id, pad) in gilrs.gamepads() {
        info!(gamepad = ?id, name = pad.name(), "Gamepad present");
    }

    // the source holds the other reference
    while Arc::strong_count(&latest) > 1 {
        while let Some(event) = gilrs.next_event() {
            match event.event {
                EventType::Connected => {
                    info!(gamepad = ?event.id, name = gilrs.gamepad(event.id).name(), "Gamepad connected")
                }
                EventType::Disconnected => warn!(gamepad = ?event.id, "Gamepad disconnected"),
                _ => {}
            }
        }

        let reading = gilrs.gamepads().next().map(|(_, pad)| read_pad(&pad));
        *latest.lock() = reading;

        thread::sleep(poll_every);
    }
}

/// Gamepad backend errors
#[derive(Debug, thiserror::Error)]
pub enum GamepadError {
    #[error("Gamepad backend unavailable: {0}")]
    Backend(String),

    #[error("Failed to start gamepad thread: {0}")]
    Thread(#[from] std::io::Error),
}
