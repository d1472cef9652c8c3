//! The 8-byte controller snapshot sent to the vehicle
//!
//! Layout:
//! - bytes 0..4: analog axes, 0..=255 with 127 as center
//! - byte 4: left trigger
//! - byte 5: right trigger
//! - bytes 6..8: button mask, little-endian (bit i = button i)

/// Number of analog axes carried in the snapshot
pub const AXIS_COUNT: usize = 4;

/// Number of buttons carried in the mask
pub const BUTTON_COUNT: usize = 16;

/// Wire size of a snapshot
pub const SNAPSHOT_LEN: usize = 8;

/// Centered axis value
pub const AXIS_NEUTRAL: u8 = 127;

const LEFT_TRIGGER: usize = 4;
const RIGHT_TRIGGER: usize = 5;
const BUTTONS_LO: usize = 6;
const BUTTONS_HI: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSnapshot {
    bytes: [u8; SNAPSHOT_LEN],
}

impl ControllerSnapshot {
    /// Centered sticks, released triggers, no buttons
    pub fn neutral() -> Self {
        let mut bytes = [0u8; SNAPSHOT_LEN];
        bytes[..AXIS_COUNT].fill(AXIS_NEUTRAL);
        Self { bytes }
    }

    pub fn from_bytes(bytes: [u8; SNAPSHOT_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; SNAPSHOT_LEN] {
        &self.bytes
    }

    pub fn axis(&self, index: usize) -> u8 {
        self.bytes[index]
    }

    /// Panics if `index >= AXIS_COUNT`
    pub fn set_axis(&mut self, index: usize, value: u8) {
        assert!(index < AXIS_COUNT, "axis index out of range: {}", index);
        self.bytes[index] = value;
    }

    pub fn triggers(&self) -> (u8, u8) {
        (self.bytes[LEFT_TRIGGER], self.bytes[RIGHT_TRIGGER])
    }

    pub fn set_triggers(&mut self, left: u8, right: u8) {
        self.bytes[LEFT_TRIGGER] = left;
        self.bytes[RIGHT_TRIGGER] = right;
    }

    pub fn buttons(&self) -> u16 {
        u16::from_le_bytes([self.bytes[BUTTONS_LO], self.bytes[BUTTONS_HI]])
    }

    pub fn set_buttons(&mut self, mask: u16) {
        let [lo, hi] = mask.to_le_bytes();
        self.bytes[BUTTONS_LO] = lo;
        self.bytes[BUTTONS_HI] = hi;
    }

    pub fn is_pressed(&self, button: usize) -> bool {
        button < BUTTON_COUNT && self.buttons() & (1 << button) != 0
    }

    /// Indices of pressed buttons, ascending
    pub fn pressed_buttons(&self) -> impl Iterator<Item = usize> {
        let mask = self.buttons();
        (0..BUTTON_COUNT).filter(move |i| mask & (1 << i) != 0)
    }
}

impl Default for ControllerSnapshot {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Map a stick axis from [-1, 1] to [0, 255]: `floor((axis + 1) / 2 * 255)`.
/// Center lands on 127. Out-of-range and NaN input is clamped first.
pub fn scale_axis(axis: f32) -> u8 {
    let axis = if axis.is_nan() { 0.0 } else { axis.clamp(-1.0, 1.0) };
    (((axis + 1.0) / 2.0) * 255.0).floor() as u8
}

/// Map a trigger from [0, 1] to [0, 255]: `floor(value * 255)`
pub fn scale_trigger(value: f32) -> u8 {
    let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    (value * 255.0).floor() as u8
}

/// Build a button mask from pressed indices; indices past the mask are ignored
pub fn encode_buttons<I>(pressed: I) -> u16
where
    I: IntoIterator<Item = usize>,
{
    pressed
        .into_iter()
        .filter(|&i| i < BUTTON_COUNT)
        .fold(0u16, |mask, i| mask | (1 << i))
}
