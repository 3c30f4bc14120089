use chip8::KEY_COUNT;

/// The left-hand side of a qwerty keyboard mapped onto the hex keypad.
const CONVENTIONAL_KEYMAP: [(char, u8); KEY_COUNT] = [
    ('1', 0x1),
    ('2', 0x2),
    ('3', 0x3),
    ('4', 0xC),
    ('q', 0x4),
    ('w', 0x5),
    ('e', 0x6),
    ('r', 0xD),
    ('a', 0x7),
    ('s', 0x8),
    ('d', 0x9),
    ('f', 0xE),
    ('z', 0xA),
    ('x', 0x0),
    ('c', 0xB),
    ('v', 0xF),
];

/// Get the keypad key code for a host key, if it's mapped.
pub fn key_code(key: char) -> Option<u8> {
    let key = key.to_ascii_lowercase();
    CONVENTIONAL_KEYMAP
        .iter()
        .find(|(host, _)| *host == key)
        .map(|&(_, code)| code)
}

/// Tracks which keypad keys are held down.
///
/// Terminals only report key presses (and repeats), never releases, so a
/// press keeps its key held for a fixed number of frames, renewed by
/// every repeat.
pub struct HeldKeys {
    frames_left: [u32; KEY_COUNT],
    hold_frames: u32,
}

impl HeldKeys {
    pub fn new(hold_frames: u32) -> Self {
        Self {
            frames_left: [0; KEY_COUNT],
            hold_frames,
        }
    }

    /// Record a press of `key_code`.
    /// Returns `true` if the key was not already held.
    pub fn press(&mut self, key_code: u8) -> bool {
        let frames = &mut self.frames_left[usize::from(key_code) % KEY_COUNT];
        let newly_pressed = *frames == 0;
        *frames = self.hold_frames;
        newly_pressed
    }

    /// Advance one frame, returning the key codes released by it.
    pub fn end_frame(&mut self) -> Vec<u8> {
        let mut released = Vec::new();
        for (key_code, frames) in (0u8..).zip(self.frames_left.iter_mut()) {
            if *frames == 0 {
                continue;
            }
            *frames -= 1;
            if *frames == 0 {
                released.push(key_code);
            }
        }
        released
    }

    pub fn is_held(&self, key_code: u8) -> bool {
        self.frames_left[usize::from(key_code) % KEY_COUNT] > 0
    }
}
