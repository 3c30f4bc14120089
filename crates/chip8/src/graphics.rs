use std::fmt;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;
pub const PIXEL_COUNT: usize = WIDTH * HEIGHT;

/// Width of every sprite row, in pixels.
pub const SPRITE_WIDTH: usize = 8;

/// A copy of the framebuffer, one `0`/`1` byte per pixel, indexed `[row][column]`.
pub type DisplaySnapshot = [[u8; WIDTH]; HEIGHT];

/// Handles the graphics state of the `Chip8`.
#[derive(Clone, Copy)]
pub struct Framebuffer {
    vram: [bool; PIXEL_COUNT],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            vram: [false; PIXEL_COUNT],
        }
    }
}

impl Framebuffer {
    /// Create a new empty `Framebuffer`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws a byte as a sprite row with its leftmost pixel at the given coordinates.
    /// Returns whether or not any set pixel was turned off.
    ///
    /// Both coordinates wrap around the screen edges, so every `(x, y)` is valid.
    pub fn draw_byte(&mut self, x: usize, y: usize, data: u8) -> bool {
        let row = y % HEIGHT;

        let mut collision = false;
        // iterate bits, most significant first
        for b in 0..SPRITE_WIDTH {
            if data & (0x80 >> b) == 0 {
                continue;
            }
            let pos = row * WIDTH + (x + b) % WIDTH;
            collision |= self.vram[pos];
            self.vram[pos] ^= true;
        }
        collision
    }

    /// Draws a whole sprite, one byte per row, starting at `(x, y)`.
    /// Returns whether any pixel collided.
    pub fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8]) -> bool {
        rows.iter()
            .enumerate()
            .fold(false, |collision, (i, &data)| {
                self.draw_byte(x, y + i, data) | collision
            })
    }

    /// Whether the pixel at the given (wrapped) coordinates is set.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.vram[(y % HEIGHT) * WIDTH + x % WIDTH]
    }

    /// Get a `[row][column]` copy of the framebuffer for rendering.
    pub fn snapshot(&self) -> DisplaySnapshot {
        let mut snapshot = [[0; WIDTH]; HEIGHT];
        for (row, pixels) in snapshot.iter_mut().zip(self.vram.chunks_exact(WIDTH)) {
            for (out, &on) in row.iter_mut().zip(pixels) {
                *out = u8::from(on);
            }
        }
        snapshot
    }

    /// Whether no pixel is set.
    pub fn is_blank(&self) -> bool {
        self.vram.iter().all(|&on| !on)
    }

    /// Turn every pixel off.
    #[inline]
    pub fn clear(&mut self) {
        self.vram = [false; PIXEL_COUNT];
    }
}

/// Text dump of the screen, `#` for set pixels and `.` for unset ones.
impl fmt::Display for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.vram.chunks_exact(WIDTH) {
            for &on in row {
                f.write_str(if on { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
