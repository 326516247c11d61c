pub const STACK_DEPTH: usize = 16;

/// Fixed-depth stack of subroutine return addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStack {
    entries: [u16; STACK_DEPTH],
    sp: u8,
}

/// Returned when a push finds the stack already full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackFull;

impl CallStack {
    pub fn new() -> Self {
        CallStack {
            entries: [0; STACK_DEPTH],
            sp: 0,
        }
    }

    pub fn push(&mut self, addr: u16) -> Result<(), StackFull> {
        let slot = self.entries.get_mut(usize::from(self.sp)).ok_or(StackFull)?;
        *slot = addr;
        self.sp += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Option<u16> {
        self.sp = self.sp.checked_sub(1)?;
        Some(self.entries[usize::from(self.sp)])
    }

    /// Current depth, also the stack pointer value.
    pub fn len(&self) -> usize {
        usize::from(self.sp)
    }

    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }

    /// Live return addresses, oldest first.
    pub fn as_slice(&self) -> &[u16] {
        &self.entries[..self.len()]
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}
