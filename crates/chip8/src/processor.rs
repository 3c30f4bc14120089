use super::Bus;
use crate::error::ExecError;
use crate::instruction::Instruction;
use crate::memory::{FONT_GLYPH_SIZE, PROGRAM_START};
use crate::stack::CallStack;

/// default starting point for most Chip8 programs
pub const STARTING_PC: u16 = PROGRAM_START as u16;

/// Index of the flag register.
const VF: usize = 0xF;

/// Largest address the index register can point at without overflowing memory.
const INDEX_LIMIT: u32 = 0xFFF;

/// Describes how the program counter should be updated after
/// executing an instruction.
enum PCUpdate {
    /// Go directly to the next instruction (pc + 2)
    Next,

    /// Skip the next instruction (pc + 4).
    SkipNext,

    /// Jump to the given address.
    Jump(u16),

    /// Stay on the current instruction until a key is pressed.
    Wait,
}

impl PCUpdate {
    fn skip_if(condition: bool) -> Self {
        if condition {
            PCUpdate::SkipNext
        } else {
            PCUpdate::Next
        }
    }
}

/// Whether the processor is executing instructions or blocked on `Fx0A`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ExecState {
    #[default]
    Running,

    /// Waiting for any key; the lowest pressed key code goes into `V{register}`.
    AwaitingKey { register: usize },
}

/// The result of a successful [`Processor::cycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// An instruction ran to completion.
    Executed,

    /// The processor is blocked on `Fx0A` and no key is pressed.
    WaitingForKey,
}

pub struct Processor {
    /// Vx registers
    pub v: [u8; 16],

    /// Index register
    pub i: u16,

    /// Program counter
    pub pc: u16,

    /// Return addresses of the active subroutine calls
    pub stack: CallStack,

    /// Running, or blocked waiting for a key press
    pub state: ExecState,

    /// The last opcode that has been executed
    pub last_opcode: u16,

    /// The address of the last opcode that has been executed
    pub last_opcode_addr: u16,

    /// The last instruction that has been executed
    pub last_instruction: Option<Instruction>,
}

impl Default for Processor {
    fn default() -> Self {
        Self {
            v: [0; 16],
            i: 0,
            pc: STARTING_PC,
            stack: CallStack::default(),
            state: ExecState::default(),
            last_opcode: 0,
            last_opcode_addr: 0,
            last_instruction: None,
        }
    }
}

impl Processor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a single fetch-decode-execute cycle.
    ///
    /// If the cycle fails, no register, memory or display state has been touched.
    pub fn cycle(&mut self, bus: &mut Bus) -> Result<StepOutcome, ExecError> {
        // while waiting for a key, don't process any opcodes
        if let ExecState::AwaitingKey { register } = self.state {
            return Ok(match bus.input.lowest_pressed() {
                Some(key_code) => {
                    log::debug!("Key {key_code:#X} pressed, stored in V{register:X}");
                    self.v[register] = key_code;
                    self.pc += 2;
                    self.state = ExecState::Running;
                    StepOutcome::Executed
                }
                None => StepOutcome::WaitingForKey,
            });
        }

        // get the next two bytes and combine into one two-byte instruction
        let addr = self.pc;
        let opcode = bus.memory.read_word(usize::from(addr))?;
        let instruction = Instruction::decode(opcode)?;

        log::trace!("{addr:#06X}: {opcode:04X} {instruction}");

        let update = self.execute(instruction, bus)?;

        self.last_opcode = opcode;
        self.last_opcode_addr = addr;
        self.last_instruction = Some(instruction);

        Ok(match update {
            PCUpdate::Next => {
                self.pc += 2;
                StepOutcome::Executed
            }
            PCUpdate::SkipNext => {
                self.pc += 4;
                StepOutcome::Executed
            }
            PCUpdate::Jump(addr) => {
                self.pc = addr;
                StepOutcome::Executed
            }
            PCUpdate::Wait => StepOutcome::WaitingForKey,
        })
    }

    fn execute(&mut self, instruction: Instruction, bus: &mut Bus) -> Result<PCUpdate, ExecError> {
        use Instruction::*;

        let update = match instruction {
            ClearScreen => {
                bus.graphics.clear();
                PCUpdate::Next
            }

            // the stack holds the address of the call itself
            Return => PCUpdate::Jump(self.stack.pop()? + 2),

            Jump(nnn) => PCUpdate::Jump(nnn),

            Call(nnn) => {
                self.stack.push(self.pc)?;
                PCUpdate::Jump(nnn)
            }

            SkipIfEqual { x, nn } => PCUpdate::skip_if(self.v[usize::from(x)] == nn),

            SkipIfNotEqual { x, nn } => PCUpdate::skip_if(self.v[usize::from(x)] != nn),

            SkipIfRegistersEqual { x, y } => {
                PCUpdate::skip_if(self.v[usize::from(x)] == self.v[usize::from(y)])
            }

            LoadImmediate { x, nn } => {
                self.v[usize::from(x)] = nn;
                PCUpdate::Next
            }

            AddImmediate { x, nn } => {
                let x = usize::from(x);
                self.v[x] = self.v[x].wrapping_add(nn);
                PCUpdate::Next
            }

            Move { x, y } => {
                self.v[usize::from(x)] = self.v[usize::from(y)];
                PCUpdate::Next
            }

            Or { x, y } => {
                self.v[usize::from(x)] |= self.v[usize::from(y)];
                PCUpdate::Next
            }

            And { x, y } => {
                self.v[usize::from(x)] &= self.v[usize::from(y)];
                PCUpdate::Next
            }

            Xor { x, y } => {
                self.v[usize::from(x)] ^= self.v[usize::from(y)];
                PCUpdate::Next
            }

            AddRegisters { x, y } => {
                let (x, y) = (usize::from(x), usize::from(y));
                let (result, overflow) = self.v[x].overflowing_add(self.v[y]);
                self.v[x] = result;
                self.v[VF] = u8::from(overflow);
                PCUpdate::Next
            }

            Subtract { x, y } => {
                let (x, y) = (usize::from(x), usize::from(y));
                let (result, borrow) = self.v[x].overflowing_sub(self.v[y]);
                self.v[x] = result;
                self.v[VF] = u8::from(!borrow);
                PCUpdate::Next
            }

            ShiftRight { x, .. } => {
                let x = usize::from(x);
                let shifted_out = self.v[x] & 1;
                self.v[x] >>= 1;
                self.v[VF] = shifted_out;
                PCUpdate::Next
            }

            SubtractReversed { x, y } => {
                let (x, y) = (usize::from(x), usize::from(y));
                let (result, borrow) = self.v[y].overflowing_sub(self.v[x]);
                self.v[x] = result;
                self.v[VF] = u8::from(!borrow);
                PCUpdate::Next
            }

            ShiftLeft { x, .. } => {
                let x = usize::from(x);
                let shifted_out = (self.v[x] & 0x80) >> 7;
                self.v[x] <<= 1;
                self.v[VF] = shifted_out;
                PCUpdate::Next
            }

            SkipIfRegistersNotEqual { x, y } => {
                PCUpdate::skip_if(self.v[usize::from(x)] != self.v[usize::from(y)])
            }

            LoadIndex(nnn) => {
                self.i = nnn;
                PCUpdate::Next
            }

            JumpOffset(nnn) => PCUpdate::Jump(nnn + u16::from(self.v[0])),

            Random { x, nn } => {
                let mut buf = [0u8; 1];
                getrandom::getrandom(&mut buf)?;
                self.v[usize::from(x)] = buf[0] & nn;
                PCUpdate::Next
            }

            Draw { x, y, n } => {
                let x = usize::from(self.v[usize::from(x)]);
                let y = usize::from(self.v[usize::from(y)]);
                let sprite = bus.memory.read_range(usize::from(self.i), usize::from(n))?;
                let collision = bus.graphics.draw_sprite(x, y, sprite);
                self.v[VF] = u8::from(collision);
                PCUpdate::Next
            }

            SkipIfKeyPressed { x } => {
                PCUpdate::skip_if(bus.input.is_key_pressed(self.v[usize::from(x)]))
            }

            SkipIfKeyNotPressed { x } => {
                PCUpdate::skip_if(!bus.input.is_key_pressed(self.v[usize::from(x)]))
            }

            LoadDelayTimer { x } => {
                self.v[usize::from(x)] = bus.timers.delay_timer;
                PCUpdate::Next
            }

            WaitForKey { x } => {
                log::debug!("Waiting for a key press to store in V{x:X}");
                self.state = ExecState::AwaitingKey {
                    register: usize::from(x),
                };
                PCUpdate::Wait
            }

            SetDelayTimer { x } => {
                bus.timers.delay_timer = self.v[usize::from(x)];
                PCUpdate::Next
            }

            SetSoundTimer { x } => {
                bus.timers.sound_timer = self.v[usize::from(x)];
                PCUpdate::Next
            }

            AddIndex { x } => {
                let vx = self.v[usize::from(x)];
                let sum = u32::from(self.i) + u32::from(vx);
                self.i = self.i.wrapping_add(u16::from(vx));
                self.v[VF] = u8::from(sum > INDEX_LIMIT);
                PCUpdate::Next
            }

            LoadFontGlyph { x } => {
                // font data starts at the very beginning of memory
                self.i = u16::from(self.v[usize::from(x)]) * FONT_GLYPH_SIZE as u16;
                PCUpdate::Next
            }

            StoreBcd { x } => {
                let value = self.v[usize::from(x)];
                let digits = [value / 100, (value / 10) % 10, value % 10];
                bus.memory.write_range(usize::from(self.i), &digits)?;
                PCUpdate::Next
            }

            StoreRegisters { x } => {
                let count = usize::from(x) + 1;
                bus.memory
                    .write_range(usize::from(self.i), &self.v[..count])?;
                self.i = self.i.wrapping_add(count as u16);
                PCUpdate::Next
            }

            LoadRegisters { x } => {
                let count = usize::from(x) + 1;
                let data = bus.memory.read_range(usize::from(self.i), count)?;
                self.v[..count].copy_from_slice(data);
                self.i = self.i.wrapping_add(count as u16);
                PCUpdate::Next
            }
        };

        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ExecError;
    use crate::stack::STACK_DEPTH;
    use crate::Bus;

    use super::{ExecState, Processor, StepOutcome, STARTING_PC};

    /// Helper function that places `opcode` at the program counter and
    /// executes it on the given `Processor` and `Bus`.
    fn run_op(opcode: u16, processor: &mut Processor, bus: &mut Bus) -> Result<StepOutcome, ExecError> {
        let pc = usize::from(processor.pc);
        bus.memory
            .write_range(pc, &opcode.to_be_bytes())
            .expect("opcode must fit in memory");
        processor.cycle(bus)
    }

    /// Helper function that executes a single opcode on the given
    /// `Processor` and a new `Bus`.
    fn test_op_with(opcode: u16, processor: &mut Processor) {
        let mut bus = Bus::default();
        run_op(opcode, processor, &mut bus).unwrap();
    }

    /// Helper function that executes a single opcode on a new `Processor`.
    ///
    /// Returns the `Processor` the opcode was executed on so that its
    /// state can be inspected.
    fn test_op(opcode: u16) -> Processor {
        let mut processor = Processor::new();
        test_op_with(opcode, &mut processor);
        processor
    }

    #[test]
    fn test_clear_screen() {
        let mut p = Processor::new();
        let mut bus = Bus::default();
        bus.graphics.draw_byte(0, 0, 0xFF);
        run_op(0x00E0, &mut p, &mut bus).unwrap();
        assert!(bus.graphics.is_blank());
        assert_eq!(p.pc, STARTING_PC + 2);
    }

    #[test]
    fn test_jump() {
        let p = test_op(0x1300);
        assert_eq!(p.pc, 0x300);
        assert!(p.stack.is_empty());
    }

    #[test]
    fn test_call() {
        let p = test_op(0x2300);
        assert_eq!(p.stack.len(), 1);
        assert_eq!(p.pc, 0x300);
        // the call instruction's own address is pushed
        assert_eq!(p.stack.top(), Some(STARTING_PC));
    }

    #[test]
    fn test_return() {
        let mut p = test_op(0x2300);
        test_op_with(0x00EE, &mut p);
        assert!(p.stack.is_empty());
        // execution resumes after the call instruction
        assert_eq!(p.pc, STARTING_PC + 2);
    }

    #[test]
    fn test_return_with_empty_stack() {
        let mut p = Processor::new();
        let mut bus = Bus::default();
        assert_eq!(
            run_op(0x00EE, &mut p, &mut bus),
            Err(ExecError::StackUnderflow)
        );
        assert_eq!(p.pc, STARTING_PC);
    }

    #[test]
    fn test_call_stack_overflow() {
        let mut p = Processor::new();
        let mut bus = Bus::default();
        // a subroutine that calls itself forever
        for _ in 0..STACK_DEPTH {
            run_op(0x2200, &mut p, &mut bus).unwrap();
        }
        assert_eq!(
            run_op(0x2200, &mut p, &mut bus),
            Err(ExecError::StackOverflow)
        );
        assert_eq!(p.stack.len(), STACK_DEPTH);
        assert_eq!(p.pc, STARTING_PC);
    }

    /// test the 0x3___ instruction when register and compared value are equal
    #[test]
    fn test_compare_skip_equal() {
        let mut p = test_op(0x6412);
        test_op_with(0x3412, &mut p);
        assert_eq!(p.pc, STARTING_PC + 6);
    }

    /// test the 0x3___ instruction when register and compared value are not equal
    #[test]
    fn test_compare_skip_not_equal() {
        let mut p = test_op(0x6416);
        test_op_with(0x3412, &mut p);
        assert_eq!(p.pc, STARTING_PC + 4);
    }

    /// test the 0x4___ instruction when register and compared value are equal
    #[test]
    fn test_compare_dont_skip_equal() {
        let mut p = test_op(0x6412);
        test_op_with(0x4412, &mut p);
        assert_eq!(p.pc, STARTING_PC + 4);
    }

    /// test the 0x4___ instruction when register and compared value are not equal
    #[test]
    fn test_compare_dont_skip_not_equal() {
        let mut p = test_op(0x6416);
        test_op_with(0x4412, &mut p);
        assert_eq!(p.pc, STARTING_PC + 6);
    }

    /// test the 0x5___ instruction when both compared registers are equal
    #[test]
    fn test_compare_registers_skip_equal() {
        let mut p = test_op(0x6A16);
        test_op_with(0x6B16, &mut p);
        test_op_with(0x5AB0, &mut p);
        assert_eq!(p.pc, STARTING_PC + 8);
    }

    /// test the 0x5___ instruction when both compared registers are not equal
    #[test]
    fn test_compare_registers_skip_not_equal() {
        let mut p = test_op(0x6A16);
        test_op_with(0x6B12, &mut p);
        test_op_with(0x5AB0, &mut p);
        assert_eq!(p.pc, STARTING_PC + 6);
    }

    #[test]
    fn test_load_immediate() {
        let p = test_op(0x6112);
        assert_eq!(p.v[1], 0x12);
    }

    #[test]
    fn test_add() {
        let mut p = test_op(0x6112);
        test_op_with(0x7103, &mut p);
        assert_eq!(p.v[1], 0x15);
    }

    /// 7xnn wraps and never touches VF
    #[test]
    fn test_add_wraps_without_flag() {
        let mut p = test_op(0x61FF);
        test_op_with(0x7102, &mut p);
        assert_eq!(p.v[1], 0x01);
        assert_eq!(p.v[0xF], 0);
    }

    #[test]
    fn test_load_register() {
        let mut p = test_op(0x6B12);
        test_op_with(0x8AB0, &mut p);
        assert_eq!(p.v[0xA], 0x12);
    }

    #[test]
    fn test_or() {
        let mut p = test_op(0x6AF0);
        test_op_with(0x6B0F, &mut p);
        test_op_with(0x8AB1, &mut p);
        assert_eq!(p.v[0xA], 0xFF);
    }

    #[test]
    fn test_and() {
        let mut p = test_op(0x6AFF);
        test_op_with(0x6B00, &mut p);
        test_op_with(0x8AB2, &mut p);
        assert_eq!(p.v[0xA], 0x00);
    }

    #[test]
    fn test_xor() {
        let mut p = test_op(0x6A10);
        test_op_with(0x6B11, &mut p);
        test_op_with(0x8AB3, &mut p);
        assert_eq!(p.v[0xA], 0x1);
    }

    #[test]
    fn test_logic_leaves_flag() {
        let mut p = test_op(0x6F01);
        test_op_with(0x6A10, &mut p);
        test_op_with(0x8AB1, &mut p);
        assert_eq!(p.v[0xF], 1);
    }

    #[test]
    fn test_carry_add() {
        let mut p = test_op(0x6AFF);
        test_op_with(0x6B04, &mut p);
        test_op_with(0x8AB4, &mut p);
        assert_eq!(p.v[0xA], 0x03);
        assert_eq!(p.v[0xF], 1);
    }

    #[test]
    fn test_carry_add_no_carry() {
        let mut p = test_op(0x6AF1);
        test_op_with(0x6B04, &mut p);
        test_op_with(0x8AB4, &mut p);
        assert_eq!(p.v[0xA], 0xF5);
        assert_eq!(p.v[0xF], 0);
    }

    /// when VF is the destination, the flag overwrites the sum
    #[test]
    fn test_carry_add_into_flag_register() {
        let mut p = test_op(0x6FFF);
        test_op_with(0x6101, &mut p);
        test_op_with(0x8F14, &mut p);
        assert_eq!(p.v[0xF], 1);
    }

    /// Test the 8xy5 instruction with a borrow
    #[test]
    fn test_carry_sub() {
        let mut p = test_op(0x6A00);
        test_op_with(0x6B03, &mut p);
        test_op_with(0x8AB5, &mut p);
        assert_eq!(p.v[0xA], 0xFD);
        assert_eq!(p.v[0xF], 0);
    }

    /// Test the 8xy5 instruction without a borrow.
    #[test]
    fn test_carry_sub_no_carry() {
        let mut p = test_op(0x6AFF);
        test_op_with(0x6B03, &mut p);
        test_op_with(0x8AB5, &mut p);
        assert_eq!(p.v[0xA], 0xFC);
        assert_eq!(p.v[0xF], 1);
    }

    /// equal operands don't borrow
    #[test]
    fn test_sub_equal() {
        let mut p = test_op(0x6A07);
        test_op_with(0x6B07, &mut p);
        test_op_with(0x8AB5, &mut p);
        assert_eq!(p.v[0xA], 0);
        assert_eq!(p.v[0xF], 1);
    }

    /// Test the 8xy6 instruction with carry.
    #[test]
    fn test_shift_right_carry() {
        let mut p = test_op(0x6A01);
        test_op_with(0x8AB6, &mut p);
        assert_eq!(p.v[0xA], 0x00);
        assert_eq!(p.v[0xF], 1);
    }

    /// Test the 8xy6 instruction without carry.
    #[test]
    fn test_shift_right_no_carry() {
        let mut p = test_op(0x6A02);
        test_op_with(0x8AB6, &mut p);
        assert_eq!(p.v[0xA], 0x01);
        assert_eq!(p.v[0xF], 0);
    }

    /// 8xy6 shifts Vx, not Vy
    #[test]
    fn test_shift_right_ignores_vy() {
        let mut p = test_op(0x6A08);
        test_op_with(0x6BFF, &mut p);
        test_op_with(0x8AB6, &mut p);
        assert_eq!(p.v[0xA], 0x04);
        assert_eq!(p.v[0xB], 0xFF);
        assert_eq!(p.v[0xF], 0);
    }

    /// Test the 8xy7 instruction with a borrow.
    #[test]
    fn test_carry_sub_opposite() {
        let mut p = test_op(0x6A03);
        test_op_with(0x6B00, &mut p);
        test_op_with(0x8AB7, &mut p);
        assert_eq!(p.v[0xA], 0xFD);
        assert_eq!(p.v[0xF], 0);
    }

    /// Test the 8xy7 instruction without a borrow.
    #[test]
    fn test_carry_sub_opposite_no_carry() {
        let mut p = test_op(0x6A03);
        test_op_with(0x6B05, &mut p);
        test_op_with(0x8AB7, &mut p);
        assert_eq!(p.v[0xA], 0x02);
        assert_eq!(p.v[0xF], 1);
    }

    #[test]
    fn test_shift_left_carry() {
        let mut p = test_op(0x6AFF);
        test_op_with(0x8AEE, &mut p);
        assert_eq!(p.v[0xA], 0xFE);
        assert_eq!(p.v[0xF], 1);
    }

    #[test]
    fn test_shift_left_no_carry() {
        let mut p = test_op(0x6A01);
        test_op_with(0x8AEE, &mut p);
        assert_eq!(p.v[0xA], 0x02);
        assert_eq!(p.v[0xF], 0);
    }

    #[test]
    fn test_unknown_alu_op() {
        let mut p = test_op(0x6A01);
        let mut bus = Bus::default();
        assert_eq!(
            run_op(0x8AB8, &mut p, &mut bus),
            Err(ExecError::UnknownOpcode(0x8AB8))
        );
        assert_eq!(p.pc, STARTING_PC + 2);
        assert_eq!(p.v[0xA], 0x01);
    }

    /// Test the 9xy0 instruction when the registers are not equal.
    #[test]
    fn test_skip_instr_opposite_not_equal() {
        let mut p = test_op(0x6A12);
        test_op_with(0x6B16, &mut p);
        test_op_with(0x9AB0, &mut p);
        assert_eq!(p.pc, STARTING_PC + 8);
    }

    /// Test the 9xy0 instruction when the registers are equal.
    #[test]
    fn test_skip_instr_opposite_equal() {
        let mut p = test_op(0x6A12);
        test_op_with(0x6B12, &mut p);
        test_op_with(0x9AB0, &mut p);
        assert_eq!(p.pc, STARTING_PC + 6);
    }

    #[test]
    fn test_load_index_register() {
        let p = test_op(0xA300);
        assert_eq!(p.i, 0x300);
    }

    #[test]
    fn test_jump_to_index_register_plus_offset() {
        let mut p = test_op(0x6012);
        test_op_with(0xB300, &mut p);
        assert_eq!(p.pc, 0x312);
    }

    #[test]
    fn test_get_random() {
        // masking with zero always gives zero
        let mut p = test_op(0x60AB);
        test_op_with(0xC000, &mut p);
        assert_eq!(p.v[0], 0);
    }

    #[test]
    fn test_get_random_masked() {
        let mut p = Processor::new();
        let mut bus = Bus::default();
        for _ in 0..32 {
            run_op(0xC10F, &mut p, &mut bus).unwrap();
            assert_eq!(p.v[1] & 0xF0, 0);
        }
    }

    #[test]
    fn test_draw() {
        let mut p = Processor::new();
        let mut bus = Bus::default();
        run_op(0x6002, &mut p, &mut bus).unwrap();
        run_op(0x6103, &mut p, &mut bus).unwrap();
        // glyph "0" lives at address 0
        run_op(0xA000, &mut p, &mut bus).unwrap();
        run_op(0xD015, &mut p, &mut bus).unwrap();
        assert!(bus.graphics.pixel(2, 3));
        assert!(bus.graphics.pixel(5, 3));
        assert!(!bus.graphics.pixel(3, 4));
        assert_eq!(p.v[0xF], 0);

        // drawing it again erases it and reports the collision
        run_op(0xD015, &mut p, &mut bus).unwrap();
        assert!(bus.graphics.is_blank());
        assert_eq!(p.v[0xF], 1);
    }

    #[test]
    fn test_draw_out_of_bounds_sprite() {
        let mut p = Processor::new();
        let mut bus = Bus::default();
        run_op(0xAFFE, &mut p, &mut bus).unwrap();
        assert_eq!(
            run_op(0xD005, &mut p, &mut bus),
            Err(ExecError::OutOfBoundsAccess(0x1000))
        );
        assert!(bus.graphics.is_blank());
        assert_eq!(p.pc, STARTING_PC + 2);
    }

    #[test]
    fn test_skip_if_key_pressed() {
        let mut p = Processor::new();
        let mut bus = Bus::default();
        bus.input.update(0x5, true);
        run_op(0x6A05, &mut p, &mut bus).unwrap();
        run_op(0xEA9E, &mut p, &mut bus).unwrap();
        assert_eq!(p.pc, STARTING_PC + 6);
        run_op(0xEAA1, &mut p, &mut bus).unwrap();
        assert_eq!(p.pc, STARTING_PC + 8);
    }

    #[test]
    fn test_skip_if_key_not_pressed() {
        let mut p = Processor::new();
        let mut bus = Bus::default();
        run_op(0x6A05, &mut p, &mut bus).unwrap();
        run_op(0xEA9E, &mut p, &mut bus).unwrap();
        assert_eq!(p.pc, STARTING_PC + 4);
        run_op(0xEAA1, &mut p, &mut bus).unwrap();
        assert_eq!(p.pc, STARTING_PC + 8);
    }

    #[test]
    fn test_wait_for_key() {
        let mut p = Processor::new();
        let mut bus = Bus::default();
        assert_eq!(run_op(0xF30A, &mut p, &mut bus), Ok(StepOutcome::WaitingForKey));
        assert_eq!(p.state, ExecState::AwaitingKey { register: 3 });

        for _ in 0..5 {
            assert_eq!(p.cycle(&mut bus), Ok(StepOutcome::WaitingForKey));
            assert_eq!(p.pc, STARTING_PC);
        }

        bus.input.update(0xE, true);
        bus.input.update(0x9, true);
        assert_eq!(p.cycle(&mut bus), Ok(StepOutcome::Executed));
        assert_eq!(p.v[3], 0x9);
        assert_eq!(p.pc, STARTING_PC + 2);
        assert_eq!(p.state, ExecState::Running);
    }

    #[test]
    fn test_load_delay_timer() {
        let mut p = Processor::new();
        let mut bus = Bus::default();
        bus.timers.delay_timer = 30;
        run_op(0xFA07, &mut p, &mut bus).unwrap();
        assert_eq!(p.v[0xA], 30);
    }

    #[test]
    fn test_set_delay_timer() {
        let mut p = Processor::new();
        let mut bus = Bus::default();
        run_op(0x6A12, &mut p, &mut bus).unwrap();
        run_op(0xFA15, &mut p, &mut bus).unwrap();
        assert_eq!(bus.timers.delay_timer, 0x12);
    }

    #[test]
    fn test_set_sound_timer() {
        let mut p = Processor::new();
        let mut bus = Bus::default();
        run_op(0x6A12, &mut p, &mut bus).unwrap();
        run_op(0xFA18, &mut p, &mut bus).unwrap();
        assert_eq!(bus.timers.sound_timer, 0x12);
    }

    #[test]
    fn test_add_to_index_register() {
        let mut p = test_op(0x6A12);
        test_op_with(0xA300, &mut p);
        test_op_with(0xFA1E, &mut p);
        assert_eq!(p.i, 0x312);
        assert_eq!(p.v[0xF], 0);
    }

    #[test]
    fn test_add_to_index_register_overflow() {
        let mut p = test_op(0x6A02);
        test_op_with(0xAFFF, &mut p);
        test_op_with(0xFA1E, &mut p);
        assert_eq!(p.i, 0x1001);
        assert_eq!(p.v[0xF], 1);
    }

    #[test]
    fn test_load_font_address() {
        let mut p = test_op(0x6004);
        test_op_with(0xF029, &mut p);
        // assuming that font data starts at the very
        // beginning of memory
        assert_eq!(p.i, 4 * 5);
    }

    #[test]
    fn test_store_bcd() {
        let mut p = Processor::new();
        let mut bus = Bus::default();
        run_op(0xA300, &mut p, &mut bus).unwrap();
        run_op(0x6AFD, &mut p, &mut bus).unwrap();
        run_op(0xFA33, &mut p, &mut bus).unwrap();
        let i = usize::from(p.i);
        assert_eq!(bus.memory[i], 2);
        assert_eq!(bus.memory[i + 1], 5);
        assert_eq!(bus.memory[i + 2], 3);
    }

    #[test]
    fn test_store_bcd_out_of_bounds() {
        let mut p = Processor::new();
        let mut bus = Bus::default();
        run_op(0xAFFE, &mut p, &mut bus).unwrap();
        run_op(0x6A7B, &mut p, &mut bus).unwrap();
        assert_eq!(
            run_op(0xFA33, &mut p, &mut bus),
            Err(ExecError::OutOfBoundsAccess(0x1000))
        );
        assert_eq!(bus.memory[0xFFE], 0);
        assert_eq!(bus.memory[0xFFF], 0);
    }

    #[test]
    fn test_store_registers() {
        let mut processor = Processor::new();
        let mut bus = Bus::default();

        for i in 0x0..=0x6 {
            processor.v[usize::from(i)] = i;
        }

        run_op(0xA300, &mut processor, &mut bus).unwrap();
        run_op(0xF655, &mut processor, &mut bus).unwrap();

        for i in 0x0..0x7 {
            assert_eq!(bus.memory[0x300 + usize::from(i)], i);
        }
        assert_eq!(bus.memory[0x307], 0);
        assert_eq!(processor.i, 0x307);
    }

    #[test]
    fn test_load_registers() {
        let mut processor = Processor::new();
        let mut bus = Bus::default();

        let data: Vec<u8> = (0x0..=0x6).collect();
        bus.memory.write_range(0x300, &data).unwrap();

        run_op(0xA300, &mut processor, &mut bus).unwrap();
        run_op(0xF665, &mut processor, &mut bus).unwrap();

        for i in 0x0..0x7 {
            assert_eq!(processor.v[usize::from(i)], i);
        }
        assert_eq!(processor.i, 0x307);
    }

    #[test]
    fn test_fetch_out_of_bounds() {
        let mut p = test_op(0x1FFF);
        let mut bus = Bus::default();
        assert_eq!(p.cycle(&mut bus), Err(ExecError::OutOfBoundsAccess(0x1000)));
        assert_eq!(p.pc, 0xFFF);
    }

    #[test]
    fn test_last_instruction_recorded() {
        let p = test_op(0x6A12);
        assert_eq!(p.last_opcode, 0x6A12);
        assert_eq!(p.last_opcode_addr, STARTING_PC);
        assert_eq!(
            p.last_instruction.map(|i| i.to_string()).as_deref(),
            Some("Set VA to 18")
        );
    }
}
