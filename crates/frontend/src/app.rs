use std::time::{Duration, Instant};

use anyhow::Context;
use chip8::{Chip8, ExecError, StepOutcome, TIMER_FREQUENCY};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

use crate::config::Config;
use crate::keymap::{self, HeldKeys};
use crate::renderer::Renderer;

/// Length of one frame; timers tick and the screen is redrawn once per frame.
pub const FRAME_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TIMER_FREQUENCY as u64);

/// The main application state.
///
/// Drives the [`Chip8`]: a fixed number of instructions and one timer tick
/// per frame, with keyboard input in between.
pub struct App {
    pub chip8: Chip8,
    held_keys: HeldKeys,
    steps_per_frame: u32,
    /// Set once an instruction fails; the machine stays stopped afterwards.
    halted: Option<ExecError>,
}

impl App {
    /// Create a new `App` running the given ROM data.
    pub fn new(config: &Config, rom: &[u8]) -> anyhow::Result<Self> {
        let mut chip8 = Chip8::new();
        chip8
            .load_program(rom)
            .with_context(|| format!("Failed to load ROM {}", config.rom_path.display()))?;

        Ok(Self {
            chip8,
            held_keys: HeldKeys::new(config.key_hold_frames),
            steps_per_frame: config.steps_per_frame,
            halted: None,
        })
    }

    /// The error that stopped execution, if any.
    pub fn halted(&self) -> Option<ExecError> {
        self.halted
    }

    /// Press a keypad key, keeping it held for the configured number of frames.
    pub fn press_key(&mut self, key_code: u8) {
        if self.held_keys.press(key_code) {
            self.chip8.set_key(key_code, true);
        }
    }

    /// Run one frame: execute instructions, tick the timers and release
    /// keys whose hold expired.
    pub fn run_frame(&mut self) {
        if self.halted.is_some() {
            return;
        }

        for _ in 0..self.steps_per_frame {
            match self.chip8.step() {
                Ok(StepOutcome::Executed) => {}
                // nothing changes until the next key event
                Ok(StepOutcome::WaitingForKey) => break,
                Err(e) => {
                    log::error!("Halting at {:#06X}: {e}", self.chip8.processor.pc);
                    self.halted = Some(e);
                    return;
                }
            }
        }

        self.chip8.tick_timers();

        for key_code in self.held_keys.end_frame() {
            self.chip8.set_key(key_code, false);
        }
    }

    /// Run `frames` frames as fast as possible, without a terminal, and
    /// return the final screen as text.
    pub fn run_headless(&mut self, frames: u32) -> String {
        for _ in 0..frames {
            self.run_frame();
            if self.halted.is_some() {
                break;
            }
        }
        self.chip8.bus.graphics.to_string()
    }

    /// Run interactively in the terminal at 60 frames per second until Esc is pressed.
    pub fn run_terminal(&mut self) -> anyhow::Result<()> {
        let mut renderer = Renderer::new().context("Failed to set up the terminal")?;
        let mut next_frame = Instant::now();

        loop {
            if self.poll_input()? {
                log::info!("Quit requested");
                return Ok(());
            }

            self.run_frame();
            renderer.draw(&self.chip8.snapshot_display(), &self.status_line())?;

            next_frame += FRAME_DURATION;
            let now = Instant::now();
            if next_frame > now {
                spin_sleep::sleep(next_frame - now);
            } else {
                // running behind, don't try to catch up
                next_frame = now;
            }
        }
    }

    /// Handle all pending terminal events.
    /// Returns whether the user asked to quit.
    fn poll_input(&mut self) -> anyhow::Result<bool> {
        while event::poll(Duration::ZERO)? {
            if let Event::Key(KeyEvent { code, modifiers, .. }) = event::read()? {
                match code {
                    KeyCode::Esc => return Ok(true),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(true)
                    }
                    KeyCode::Char(c) => match keymap::key_code(c) {
                        Some(key_code) => self.press_key(key_code),
                        None => log::debug!("Unmapped key {c:?}"),
                    },
                    _ => {}
                }
            }
        }
        Ok(false)
    }

    /// A one line summary of the processor state.
    fn status_line(&self) -> String {
        let processor = &self.chip8.processor;
        let activity = match (self.halted, processor.last_instruction) {
            (Some(e), _) => format!("HALTED: {e}"),
            (None, Some(instruction)) => format!(
                "{:#06X}: {:04X} {instruction}",
                processor.last_opcode_addr, processor.last_opcode
            ),
            (None, None) => String::new(),
        };
        let buzzer = if self.chip8.bus.timers.sound_active() { "BEEP" } else { "    " };
        let keys: String = (0..16u8)
            .filter(|&key_code| self.held_keys.is_held(key_code))
            .map(|key_code| format!("{key_code:X}"))
            .collect();
        format!(
            "PC {:#06X}  I {:#06X}  DT {:3}  ST {:3} {buzzer}  KEYS {keys:<16}  {activity}",
            processor.pc,
            processor.i,
            self.chip8.delay_timer(),
            self.chip8.sound_timer(),
        )
    }
}
