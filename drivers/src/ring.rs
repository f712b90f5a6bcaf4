//! Fixed-capacity circular byte queue.
//!
//! One ring is used per direction (RX, TX) per serial port. Each ring has
//! exactly one producer and one consumer, but which side runs in
//! interrupt context depends on the direction: the RX ring is filled by
//! the interrupt handler and drained by [`crate::port::SerialPort::read`],
//! the TX ring is filled by [`crate::port::SerialPort::write`] and drained
//! by the interrupt handler.
//!
//! `head` is the next write slot and only ever advanced by the producer;
//! `tail` is the next read slot and only ever advanced by the consumer
//! (with one deliberate exception, see [`RingBuffer::push`]). One slot is
//! sacrificed so `head == tail` unambiguously means empty: a ring of
//! capacity `N` holds at most `N - 1` bytes.

/// Outcome of a [`RingBuffer::push`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Push {
    /// The buffer was empty before this push. Callers use this
    /// transition to arm a consumer-side interrupt.
    WasEmpty,
    /// The buffer already held data.
    HadData,
    /// The buffer was full; the oldest byte was discarded to make room.
    /// Callers must account the drop.
    Overwrote,
}

/// Circular byte queue with a compile-time capacity.
pub struct RingBuffer<const N: usize> {
    buf: [u8; N],
    head: usize,
    tail: usize,
}

impl<const N: usize> RingBuffer<N> {
    /// Create an empty ring.
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            head: 0,
            tail: 0,
        }
    }

    /// Discard all buffered content.
    pub fn reset(&mut self) {
        self.head = 0;
        self.tail = 0;
    }

    /// Number of bytes currently buffered. Never exceeds `N - 1`.
    pub fn len(&self) -> usize {
        (self.head + N - self.tail) % N
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn is_full(&self) -> bool {
        Self::advance(self.head) == self.tail
    }

    /// Append one byte, overwriting the oldest byte if the ring is full.
    ///
    /// Newest data always wins: a full ring discards its oldest unread
    /// byte rather than refusing the push. The discard is reported as
    /// [`Push::Overwrote`] so the caller can count the drop. Writers that
    /// must not lose data (the TX path) check [`RingBuffer::is_full`]
    /// before pushing instead.
    pub fn push(&mut self, byte: u8) -> Push {
        let result = if self.is_empty() {
            Push::WasEmpty
        } else if self.is_full() {
            // Free the oldest slot. Forced so the tail moves even if a
            // racing consumer emptied the ring after the is_full check.
            self.pop(true);
            Push::Overwrote
        } else {
            Push::HadData
        };

        self.buf[self.head] = byte;
        self.head = Self::advance(self.head);
        result
    }

    /// Remove and return the oldest byte.
    ///
    /// Returns `None` when the ring is empty. With `force_if_empty` the
    /// tail still advances past the (empty) slot; the only caller doing
    /// that is [`RingBuffer::push`], which is about to write the slot.
    pub fn pop(&mut self, force_if_empty: bool) -> Option<u8> {
        if self.is_empty() {
            if force_if_empty {
                self.tail = Self::advance(self.tail);
            }
            return None;
        }

        let byte = self.buf[self.tail];
        self.tail = Self::advance(self.tail);
        Some(byte)
    }

    /// Oldest byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        if self.is_empty() {
            None
        } else {
            Some(self.buf[self.tail])
        }
    }

    /// Drain up to `dest.len()` bytes into `dest` in one pass.
    ///
    /// Returns the number of bytes copied. Equivalent to repeated
    /// [`RingBuffer::pop`] without re-checking emptiness per byte.
    pub fn pop_into(&mut self, dest: &mut [u8]) -> usize {
        let count = self.len().min(dest.len());
        for slot in dest[..count].iter_mut() {
            *slot = self.buf[self.tail];
            self.tail = Self::advance(self.tail);
        }
        count
    }

    const fn advance(index: usize) -> usize {
        let next = index + 1;
        if next == N { 0 } else { next }
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let ring: RingBuffer<8> = RingBuffer::new();
        assert!(ring.is_empty());
        assert!(!ring.is_full());
        assert_eq!(ring.len(), 0);
        assert_eq!(ring.peek(), None);
    }

    #[test]
    fn length_never_exceeds_capacity_minus_one() {
        let mut ring: RingBuffer<8> = RingBuffer::new();
        for i in 0..100u32 {
            ring.push(i as u8);
            assert!(ring.len() <= 7);
            assert_eq!(ring.is_full(), ring.len() == 7);
        }
    }

    #[test]
    fn fifo_order_preserved() {
        let mut ring: RingBuffer<8> = RingBuffer::new();
        for byte in 1..=7u8 {
            assert_ne!(ring.push(byte), Push::Overwrote);
        }
        for byte in 1..=7u8 {
            assert_eq!(ring.pop(false), Some(byte));
        }
        assert_eq!(ring.pop(false), None);
    }

    #[test]
    fn push_reports_empty_transition() {
        let mut ring: RingBuffer<4> = RingBuffer::new();
        assert_eq!(ring.push(1), Push::WasEmpty);
        assert_eq!(ring.push(2), Push::HadData);
        ring.pop(false);
        ring.pop(false);
        assert_eq!(ring.push(3), Push::WasEmpty);
    }

    #[test]
    fn overwrite_discards_oldest() {
        let mut ring: RingBuffer<8> = RingBuffer::new();
        for byte in 1..=7u8 {
            ring.push(byte);
        }
        // One too many: byte 1 is sacrificed, newest wins.
        assert_eq!(ring.push(8), Push::Overwrote);
        let mut drained = [0u8; 8];
        let n = ring.pop_into(&mut drained);
        assert_eq!(&drained[..n], &[2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn overwrite_wraps_repeatedly() {
        let mut ring: RingBuffer<4> = RingBuffer::new();
        for byte in 0..10u8 {
            ring.push(byte);
        }
        // Only the newest three survive.
        assert_eq!(ring.pop(false), Some(7));
        assert_eq!(ring.pop(false), Some(8));
        assert_eq!(ring.pop(false), Some(9));
        assert_eq!(ring.pop(false), None);
    }

    #[test]
    fn reset_empties_regardless_of_prior_state() {
        let mut ring: RingBuffer<8> = RingBuffer::new();
        for byte in 0..20u8 {
            ring.push(byte);
        }
        ring.reset();
        assert_eq!(ring.len(), 0);
        assert!(ring.is_empty());
        assert_eq!(ring.pop(false), None);
    }

    #[test]
    fn pop_into_copies_at_most_dest_len() {
        let mut ring: RingBuffer<16> = RingBuffer::new();
        for byte in 10..15u8 {
            ring.push(byte);
        }
        let mut dest = [0u8; 3];
        assert_eq!(ring.pop_into(&mut dest), 3);
        assert_eq!(dest, [10, 11, 12]);
        assert_eq!(ring.len(), 2);
        let mut rest = [0u8; 8];
        assert_eq!(ring.pop_into(&mut rest), 2);
        assert_eq!(&rest[..2], &[13, 14]);
    }

    #[test]
    fn forced_pop_on_empty_advances_tail() {
        let mut ring: RingBuffer<4> = RingBuffer::new();
        assert_eq!(ring.pop(true), None);
        // The tail moved past a slot the caller promised to fill; the
        // matching push restores the empty/full accounting.
        ring.push(42);
        assert_eq!(ring.len(), 3);
    }
}
