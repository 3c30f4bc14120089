use std::ops::Index;

use crate::error::{ExecError, LoadError};

/// Total size of the Chip8 memory.
pub const MEMORY_SIZE: usize = 4096;

/// Address where loaded programs start.
///
/// Everything below it historically belonged to the interpreter,
/// and now only holds the font table.
pub const PROGRAM_START: usize = 0x200;

/// The largest program that fits between `PROGRAM_START` and the end of memory.
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START;

/// Number of bytes in a single font glyph.
pub const FONT_GLYPH_SIZE: usize = 5;

/// Built in Chip8 font data. This will be stored in the
/// interpreter's memory.
pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// The memory of the `Chip8`.
///
/// All accesses made on behalf of an instruction go through the checked
/// accessors, which report the first offending address instead of panicking.
pub struct Memory {
    memory: [u8; MEMORY_SIZE],
}

impl Default for Memory {
    fn default() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[..FONT.len()].copy_from_slice(&FONT);
        Self { memory }
    }
}

impl Memory {
    /// Create a new `Memory` object with the font loaded and everything else zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the program bytes from `data` to `PROGRAM_START`.
    ///
    /// Any memory after the program is zeroed, so nothing from a
    /// previously loaded program survives.
    pub fn load_program(&mut self, data: &[u8]) -> Result<(), LoadError> {
        if data.len() > MAX_PROGRAM_SIZE {
            return Err(LoadError::ProgramTooLarge {
                size: data.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        let end = PROGRAM_START + data.len();
        self.memory[PROGRAM_START..end].copy_from_slice(data);
        self.memory[end..].fill(0);
        Ok(())
    }

    /// Ensure that `len` bytes starting at `addr` are all addressable.
    pub fn check_range(&self, addr: usize, len: usize) -> Result<(), ExecError> {
        match addr.checked_add(len) {
            Some(end) if end <= MEMORY_SIZE => Ok(()),
            // report the first address that falls outside memory
            _ => Err(ExecError::OutOfBoundsAccess(addr.max(MEMORY_SIZE))),
        }
    }

    /// Read a single byte.
    pub fn read(&self, addr: usize) -> Result<u8, ExecError> {
        self.memory
            .get(addr)
            .copied()
            .ok_or(ExecError::OutOfBoundsAccess(addr))
    }

    /// Read a big-endian 16-bit word, as used for opcodes.
    pub fn read_word(&self, addr: usize) -> Result<u16, ExecError> {
        let hi = self.read(addr)?;
        let lo = self.read(addr + 1)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    /// Borrow `len` bytes starting at `addr`.
    pub fn read_range(&self, addr: usize, len: usize) -> Result<&[u8], ExecError> {
        self.check_range(addr, len)?;
        Ok(&self.memory[addr..addr + len])
    }

    /// Write all of `data` starting at `addr`.
    ///
    /// Nothing is written unless every byte fits.
    pub fn write_range(&mut self, addr: usize, data: &[u8]) -> Result<(), ExecError> {
        self.check_range(addr, data.len())?;
        self.memory[addr..addr + data.len()].copy_from_slice(data);
        Ok(())
    }
}

impl Index<usize> for Memory {
    type Output = u8;

    fn index(&self, index: usize) -> &Self::Output {
        &self.memory[index]
    }
}
