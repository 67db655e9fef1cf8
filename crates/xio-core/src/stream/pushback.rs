//! Fixed-capacity pushback slot (ungetc).
//!
//! Bytes pushed here are replayed before any buffered content, last pushed
//! first. Capacity is small and fixed; overfilling is rejected rather than
//! allowed to clobber neighbouring state.

/// Maximum number of bytes that can be pushed back without a read.
pub const PUSHBACK_CAPACITY: usize = 3;

#[derive(Debug, Default)]
pub struct Pushback {
    slots: [u8; PUSHBACK_CAPACITY],
    len: usize,
}

impl Pushback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a byte. Returns `false` when the slot is full; nothing changes.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.len == PUSHBACK_CAPACITY {
            return false;
        }
        self.slots[self.len] = byte;
        self.len += 1;
        true
    }

    /// Pop the most recently pushed byte.
    pub fn pop(&mut self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.slots[self.len])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifo_order() {
        let mut pb = Pushback::new();
        assert!(pb.push(b'1'));
        assert!(pb.push(b'2'));
        assert_eq!(pb.pop(), Some(b'2'));
        assert_eq!(pb.pop(), Some(b'1'));
        assert_eq!(pb.pop(), None);
    }

    #[test]
    fn test_overflow_rejected_without_corruption() {
        let mut pb = Pushback::new();
        for b in 0..PUSHBACK_CAPACITY as u8 {
            assert!(pb.push(b));
        }
        assert!(!pb.push(99));
        assert_eq!(pb.len(), PUSHBACK_CAPACITY);
        assert_eq!(pb.pop(), Some(PUSHBACK_CAPACITY as u8 - 1));
    }

    #[test]
    fn test_clear() {
        let mut pb = Pushback::new();
        pb.push(b'x');
        pb.clear();
        assert!(pb.is_empty());
    }
}
