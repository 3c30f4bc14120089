/// Rate, in Hz, at which the delay and sound timers count down.
pub const TIMER_FREQUENCY: u32 = 60;

/// The `Chip8` delay and sound timers.
///
/// Both count down by `1` per call to [`Timers::tick`], which the driver is
/// expected to call at [`TIMER_FREQUENCY`], and stop at zero.
#[derive(Default, Clone, Copy)]
pub struct Timers {
    pub delay_timer: u8,
    pub sound_timer: u8,
}

impl Timers {
    /// Create a new [`Timers`] with both timers at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decrement both timers, saturating at zero.
    pub fn tick(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Whether the buzzer should currently be sounding.
    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }
}
