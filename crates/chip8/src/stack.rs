use crate::error::ExecError;

/// Number of return addresses the call stack can hold.
pub const STACK_DEPTH: usize = 16;

/// Return addresses pushed by subroutine calls.
#[derive(Default, Clone)]
pub struct CallStack {
    slots: [u16; STACK_DEPTH],
    sp: usize,
}

impl CallStack {
    /// Create a new empty `CallStack`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a return address, failing if every slot is taken.
    pub fn push(&mut self, addr: u16) -> Result<(), ExecError> {
        let slot = self.slots.get_mut(self.sp).ok_or(ExecError::StackOverflow)?;
        *slot = addr;
        self.sp += 1;
        Ok(())
    }

    /// Pop the most recently pushed return address.
    pub fn pop(&mut self) -> Result<u16, ExecError> {
        if self.sp == 0 {
            return Err(ExecError::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.slots[self.sp])
    }

    /// The stack pointer, i.e. the number of addresses currently stored.
    pub fn len(&self) -> usize {
        self.sp
    }

    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }

    /// The address a return would jump back to, if any.
    pub fn top(&self) -> Option<u16> {
        self.sp.checked_sub(1).map(|i| self.slots[i])
    }
}
