/// Number of keys on the hex keypad.
pub const KEY_COUNT: usize = 16;

/// Input state for the `Chip8`. This keeps track of the pressed state of all 16 keys.
///
/// The state is written by whatever delivers host key events and only read
/// by the processor.
#[derive(Default, Clone, Copy)]
pub struct Keypad {
    state: [bool; KEY_COUNT],
}

impl Keypad {
    /// Create a new [`Keypad`] with every key released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the pressed state of the given key code.
    ///
    /// Key codes outside `0x0..=0xF` are ignored.
    pub fn update(&mut self, key_code: u8, pressed: bool) {
        match self.state.get_mut(usize::from(key_code)) {
            Some(state) => *state = pressed,
            None => log::warn!("Ignoring state update for invalid key code {key_code:#X}"),
        }
    }

    /// Returns whether the given key is currently pressed.
    ///
    /// Only the low nibble of `key_code` is used.
    pub fn is_key_pressed(&self, key_code: u8) -> bool {
        self.state[usize::from(key_code & 0xF)]
    }

    /// The lowest key code that is currently pressed, if any.
    pub fn lowest_pressed(&self) -> Option<u8> {
        self.state
            .iter()
            .position(|&pressed| pressed)
            .and_then(|key| u8::try_from(key).ok())
    }
}
