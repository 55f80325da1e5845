use crate::error::{Chip8Error, Result};

// Room for twelve nested subroutine calls, as on the COSMAC VIP
pub const STACK_DEPTH: usize = 12;

#[derive(Debug, Default, Clone)]
pub struct Stack {
    slots: [u16; STACK_DEPTH],
    depth: usize,
}

impl Stack {
    pub fn new() -> Stack {
        Stack::default()
    }

    pub fn push(&mut self, address: u16) -> Result<()> {
        let slot = self
            .slots
            .get_mut(self.depth)
            .ok_or(Chip8Error::StackOverflow { depth: STACK_DEPTH })?;
        *slot = address;
        self.depth += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16> {
        if self.depth == 0 {
            return Err(Chip8Error::StackUnderflow);
        }
        self.depth -= 1;
        Ok(self.slots[self.depth])
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twelve_pushes_fit_and_the_thirteenth_overflows() {
        let mut stack = Stack::new();
        for n in 0..12 {
            stack.push(0x200 + n * 2).unwrap();
        }
        assert_eq!(stack.depth(), 12);
        assert_eq!(
            stack.push(0x300),
            Err(Chip8Error::StackOverflow { depth: 12 })
        );
        assert_eq!(stack.depth(), 12);
    }

    #[test]
    fn pop_from_empty_underflows() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(), Err(Chip8Error::StackUnderflow));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn pops_in_reverse_push_order() {
        let mut stack = Stack::new();
        stack.push(0x202).unwrap();
        stack.push(0x304).unwrap();
        stack.push(0x406).unwrap();
        assert_eq!(stack.pop(), Ok(0x406));
        assert_eq!(stack.pop(), Ok(0x304));
        stack.push(0x500).unwrap();
        assert_eq!(stack.pop(), Ok(0x500));
        assert_eq!(stack.pop(), Ok(0x202));
        assert_eq!(stack.pop(), Err(Chip8Error::StackUnderflow));
    }
}
