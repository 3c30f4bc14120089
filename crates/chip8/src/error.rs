/// Returned by [`crate::Chip8::load_program`] when a ROM can't be placed in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("program is too large ({size} bytes), at most {max} bytes fit in memory")]
    ProgramTooLarge { size: usize, max: usize },
}

/// Errors surfaced by a single execution step.
///
/// A step that fails leaves the interpreter state exactly as it was before
/// the step, so the caller can decide whether to halt, log or retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExecError {
    #[error("unknown opcode {0:#06X}")]
    UnknownOpcode(u16),

    #[error("memory access out of bounds at address {0:#06X}")]
    OutOfBoundsAccess(usize),

    #[error("call stack overflow: subroutines nested too deeply")]
    StackOverflow,

    #[error("call stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("failed to generate a random byte: {0}")]
    Random(#[from] getrandom::Error),
}
