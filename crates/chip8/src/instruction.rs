use std::fmt;

use crate::error::ExecError;

/// A decoded CHIP-8 instruction.
///
/// `x` and `y` are register indices (`0x0..=0xF`), `nn` an immediate byte,
/// `n` an immediate nibble and the bare `u16` payloads 12-bit addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1nnn
    Jump(u16),
    /// 2nnn
    Call(u16),
    /// 3xnn
    SkipIfEqual { x: u8, nn: u8 },
    /// 4xnn
    SkipIfNotEqual { x: u8, nn: u8 },
    /// 5xy0
    SkipIfRegistersEqual { x: u8, y: u8 },
    /// 6xnn
    LoadImmediate { x: u8, nn: u8 },
    /// 7xnn
    AddImmediate { x: u8, nn: u8 },
    /// 8xy0
    Move { x: u8, y: u8 },
    /// 8xy1
    Or { x: u8, y: u8 },
    /// 8xy2
    And { x: u8, y: u8 },
    /// 8xy3
    Xor { x: u8, y: u8 },
    /// 8xy4
    AddRegisters { x: u8, y: u8 },
    /// 8xy5
    Subtract { x: u8, y: u8 },
    /// 8xy6, shifts Vx itself; `y` is kept only for disassembly.
    ShiftRight { x: u8, y: u8 },
    /// 8xy7
    SubtractReversed { x: u8, y: u8 },
    /// 8xyE, shifts Vx itself; `y` is kept only for disassembly.
    ShiftLeft { x: u8, y: u8 },
    /// 9xy0
    SkipIfRegistersNotEqual { x: u8, y: u8 },
    /// Annn
    LoadIndex(u16),
    /// Bnnn
    JumpOffset(u16),
    /// Cxnn
    Random { x: u8, nn: u8 },
    /// Dxyn
    Draw { x: u8, y: u8, n: u8 },
    /// Ex9E
    SkipIfKeyPressed { x: u8 },
    /// ExA1
    SkipIfKeyNotPressed { x: u8 },
    /// Fx07
    LoadDelayTimer { x: u8 },
    /// Fx0A
    WaitForKey { x: u8 },
    /// Fx15
    SetDelayTimer { x: u8 },
    /// Fx18
    SetSoundTimer { x: u8 },
    /// Fx1E
    AddIndex { x: u8 },
    /// Fx29
    LoadFontGlyph { x: u8 },
    /// Fx33
    StoreBcd { x: u8 },
    /// Fx55
    StoreRegisters { x: u8 },
    /// Fx65
    LoadRegisters { x: u8 },
}

impl Instruction {
    /// Decode a 16-bit opcode.
    ///
    /// Every bit pattern outside the canonical instruction set, including the
    /// legacy `0nnn` machine code calls, is an [`ExecError::UnknownOpcode`].
    pub fn decode(opcode: u16) -> Result<Self, ExecError> {
        use Instruction::*;

        // define some commonly used fields
        let x = ((opcode & 0x0F00) >> 8) as u8;
        let y = ((opcode & 0x00F0) >> 4) as u8;
        let n = (opcode & 0x000F) as u8;
        let nn = (opcode & 0x00FF) as u8;
        let nnn = opcode & 0x0FFF;

        let instruction = match (opcode & 0xF000) >> 12 {
            0x0 => match opcode {
                0x00E0 => ClearScreen,
                0x00EE => Return,
                _ => return Err(ExecError::UnknownOpcode(opcode)),
            },
            0x1 => Jump(nnn),
            0x2 => Call(nnn),
            0x3 => SkipIfEqual { x, nn },
            0x4 => SkipIfNotEqual { x, nn },
            0x5 if n == 0 => SkipIfRegistersEqual { x, y },
            0x6 => LoadImmediate { x, nn },
            0x7 => AddImmediate { x, nn },
            0x8 => match n {
                0x0 => Move { x, y },
                0x1 => Or { x, y },
                0x2 => And { x, y },
                0x3 => Xor { x, y },
                0x4 => AddRegisters { x, y },
                0x5 => Subtract { x, y },
                0x6 => ShiftRight { x, y },
                0x7 => SubtractReversed { x, y },
                0xE => ShiftLeft { x, y },
                _ => return Err(ExecError::UnknownOpcode(opcode)),
            },
            0x9 if n == 0 => SkipIfRegistersNotEqual { x, y },
            0xA => LoadIndex(nnn),
            0xB => JumpOffset(nnn),
            0xC => Random { x, nn },
            0xD => Draw { x, y, n },
            0xE => match nn {
                0x9E => SkipIfKeyPressed { x },
                0xA1 => SkipIfKeyNotPressed { x },
                _ => return Err(ExecError::UnknownOpcode(opcode)),
            },
            0xF => match nn {
                0x07 => LoadDelayTimer { x },
                0x0A => WaitForKey { x },
                0x15 => SetDelayTimer { x },
                0x18 => SetSoundTimer { x },
                0x1E => AddIndex { x },
                0x29 => LoadFontGlyph { x },
                0x33 => StoreBcd { x },
                0x55 => StoreRegisters { x },
                0x65 => LoadRegisters { x },
                _ => return Err(ExecError::UnknownOpcode(opcode)),
            },
            _ => return Err(ExecError::UnknownOpcode(opcode)),
        };

        Ok(instruction)
    }
}

/// A human readable explanation of what the instruction does.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            ClearScreen => write!(f, "Clear the screen"),
            Return => write!(f, "Return from subroutine"),
            Jump(nnn) => write!(f, "Jump to addr {nnn:#06X}"),
            Call(nnn) => write!(f, "Call subroutine at {nnn:#06X}"),
            SkipIfEqual { x, nn } => write!(f, "If V{x:X} == {nn}, skip next instr"),
            SkipIfNotEqual { x, nn } => write!(f, "If V{x:X} != {nn}, skip next instr"),
            SkipIfRegistersEqual { x, y } => write!(f, "If V{x:X} == V{y:X}, skip next instr"),
            LoadImmediate { x, nn } => write!(f, "Set V{x:X} to {nn}"),
            AddImmediate { x, nn } => write!(f, "Add {nn} to V{x:X}"),
            Move { x, y } => write!(f, "Set V{x:X} to V{y:X}"),
            Or { x, y } => write!(f, "Set V{x:X} to V{x:X} OR V{y:X}"),
            And { x, y } => write!(f, "Set V{x:X} to V{x:X} AND V{y:X}"),
            Xor { x, y } => write!(f, "Set V{x:X} to V{x:X} XOR V{y:X}"),
            AddRegisters { x, y } => write!(f, "Set V{x:X} to V{x:X} + V{y:X}, VF = carry"),
            Subtract { x, y } => write!(f, "Set V{x:X} to V{x:X} - V{y:X}, VF = not borrow"),
            ShiftRight { x, .. } => write!(f, "V{x:X} shifted one right, VF = shifted out bit"),
            SubtractReversed { x, y } => {
                write!(f, "Set V{x:X} to V{y:X} - V{x:X}, VF = not borrow")
            }
            ShiftLeft { x, .. } => write!(f, "V{x:X} shifted one left, VF = shifted out bit"),
            SkipIfRegistersNotEqual { x, y } => {
                write!(f, "If V{x:X} != V{y:X}, skip next instr")
            }
            LoadIndex(nnn) => write!(f, "Set I register to {nnn:#06X}"),
            JumpOffset(nnn) => write!(f, "Jump to {nnn:#06X} + V0"),
            Random { x, nn } => write!(f, "Set V{x:X} to [rand] AND {nn:#X}"),
            Draw { x, y, n } => write!(f, "Draw {n} byte sprite from I at (V{x:X}, V{y:X})"),
            SkipIfKeyPressed { x } => write!(f, "Skip next instr if key V{x:X} pressed"),
            SkipIfKeyNotPressed { x } => write!(f, "Skip next instr if key V{x:X} not pressed"),
            LoadDelayTimer { x } => write!(f, "Set V{x:X} to delay timer"),
            WaitForKey { x } => write!(f, "Store next key press in V{x:X}"),
            SetDelayTimer { x } => write!(f, "Set delay timer to V{x:X}"),
            SetSoundTimer { x } => write!(f, "Set sound timer to V{x:X}"),
            AddIndex { x } => write!(f, "Set I to I + V{x:X}"),
            LoadFontGlyph { x } => write!(f, "Set I to addr of font glyph V{x:X}"),
            StoreBcd { x } => write!(f, "Store BCD of V{x:X} starting at I"),
            StoreRegisters { x } => write!(f, "Store V0 to V{x:X} starting at I"),
            LoadRegisters { x } => write!(f, "Read memory at I into V0 to V{x:X}"),
        }
    }
}
