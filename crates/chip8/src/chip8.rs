mod clock;
mod error;
pub mod graphics;
mod input;
mod instruction;
mod memory;
mod processor;
mod stack;

pub use clock::{Timers, TIMER_FREQUENCY};
pub use error::{ExecError, LoadError};
pub use graphics::{DisplaySnapshot, Framebuffer};
pub use input::{Keypad, KEY_COUNT};
pub use instruction::Instruction;
pub use memory::{Memory, FONT, MAX_PROGRAM_SIZE, MEMORY_SIZE, PROGRAM_START};
pub use processor::{ExecState, Processor, StepOutcome};
pub use stack::{CallStack, STACK_DEPTH};

/// Contains all the different components of the `Chip8` system, excluding the `Processor`.
#[derive(Default)]
pub struct Bus {
    pub timers: Timers,
    pub graphics: Framebuffer,
    pub input: Keypad,
    pub memory: Memory,
}

/// The main CHIP-8 interpreter state, contains all the components of the
/// CHIP-8 and procedures to interact with them at a high level.
///
/// Nothing here runs on its own: a driver calls [`Chip8::step`] at the
/// instruction rate and [`Chip8::tick_timers`] at [`TIMER_FREQUENCY`].
#[derive(Default)]
pub struct Chip8 {
    pub processor: Processor,
    pub bus: Bus,
}

impl Chip8 {
    /// Create a new Chip8 instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Performs one execution step in the interpreter, cycling
    /// the processor and updating all state accordingly.
    ///
    /// While blocked on a key wait this returns [`StepOutcome::WaitingForKey`]
    /// without doing anything else.
    pub fn step(&mut self) -> Result<StepOutcome, ExecError> {
        self.processor.cycle(&mut self.bus)
    }

    /// Load the given program into memory at [`PROGRAM_START`].
    pub fn load_program(&mut self, data: &[u8]) -> Result<(), LoadError> {
        self.bus.memory.load_program(data)?;
        log::debug!("Loaded {} byte program", data.len());
        Ok(())
    }

    /// Count the delay and sound timers down by one, stopping at zero.
    pub fn tick_timers(&mut self) {
        self.bus.timers.tick();
    }

    /// Update the input state for the given key code.
    pub fn set_key(&mut self, key_code: u8, pressed: bool) {
        self.bus.input.update(key_code, pressed);
    }

    /// Get a copy of the current screen contents.
    pub fn snapshot_display(&self) -> DisplaySnapshot {
        self.bus.graphics.snapshot()
    }

    pub fn delay_timer(&self) -> u8 {
        self.bus.timers.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.bus.timers.sound_timer
    }

    /// Reset the state of the `Chip8` instance, dropping the loaded program.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Convenience method for resetting the `Chip8` and loading the given program.
    pub fn reset_and_load(&mut self, data: &[u8]) -> Result<(), LoadError> {
        self.reset();
        self.load_program(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let chip8 = Chip8::new();
        assert_eq!(chip8.processor.pc, 0x200);
        assert_eq!(chip8.processor.i, 0);
        assert_eq!(chip8.processor.v, [0; 16]);
        assert!(chip8.processor.stack.is_empty());
        assert_eq!(chip8.processor.state, ExecState::Running);
        assert_eq!(chip8.delay_timer(), 0);
        assert_eq!(chip8.sound_timer(), 0);
        assert!(chip8.bus.graphics.is_blank());
    }

    #[test]
    fn test_default_matches_new() {
        let mut chip8 = Chip8::default();
        assert_eq!(chip8.processor.pc, 0x200);
        chip8.load_program(&[0x60, 0x0A]).unwrap();
        assert_eq!(chip8.step(), Ok(StepOutcome::Executed));
        assert_eq!(chip8.processor.v[0], 0x0A);
        assert_eq!(chip8.processor.pc, 0x202);
    }

    #[test]
    fn test_timers_through_opcodes() {
        let mut chip8 = Chip8::new();
        // V0 = 3; delay = V0; sound = V0
        chip8
            .load_program(&[0x60, 0x03, 0xF0, 0x15, 0xF0, 0x18])
            .unwrap();
        for _ in 0..3 {
            chip8.step().unwrap();
        }
        chip8.tick_timers();
        assert_eq!(chip8.delay_timer(), 2);
        assert_eq!(chip8.sound_timer(), 2);
        for _ in 0..5 {
            chip8.tick_timers();
        }
        assert_eq!(chip8.delay_timer(), 0);
        assert_eq!(chip8.sound_timer(), 0);
    }

    #[test]
    fn test_reset_and_load() {
        let mut chip8 = Chip8::new();
        chip8.load_program(&[0x6A, 0x12]).unwrap();
        chip8.step().unwrap();
        chip8.set_key(0x1, true);

        chip8.reset_and_load(&[0x00, 0xE0]).unwrap();
        assert_eq!(chip8.processor.pc, 0x200);
        assert_eq!(chip8.processor.v[0xA], 0);
        assert!(!chip8.bus.input.is_key_pressed(0x1));
        assert_eq!(chip8.bus.memory[0x200], 0x00);
        assert_eq!(chip8.bus.memory[0x201], 0xE0);
    }
}
