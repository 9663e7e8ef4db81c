//! Round-robin cursor for sequential mode.

/// Rotates through a fixed, ascending list of slot indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceCursor {
    order: Vec<usize>,
    position: usize,
}

impl SequenceCursor {
    /// Creates a cursor at position 0 over `order`.
    pub fn new(order: Vec<usize>) -> Self {
        Self { order, position: 0 }
    }

    /// Slot index under the cursor, or `None` when the order is empty.
    pub fn current(&self) -> Option<usize> {
        self.order.get(self.position).copied()
    }

    /// Moves to the next slot, wrapping after the last.
    pub fn advance(&mut self) {
        if !self.order.is_empty() {
            self.position = (self.position + 1) % self.order.len();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }
}
