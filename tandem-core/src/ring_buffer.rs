//! Background receive ring buffer
//!
//! Fixed-capacity circular byte store over caller-supplied storage. One slot
//! is kept free so `head == tail` always means empty; a buffer over `C` bytes
//! of storage therefore holds at most `C - 1` bytes.
//!
//! There is no internal locking. The interrupt side pushes and the foreground
//! side pops; the engine keeps them apart by masking the receive interrupt
//! around foreground access.

use crate::error::{Error, Result};

/// Circular byte buffer over borrowed storage
#[derive(Debug)]
pub struct RingBuffer<'d> {
    storage: &'d mut [u8],
    /// Next write index
    head: usize,
    /// Next read index
    tail: usize,
}

impl<'d> RingBuffer<'d> {
    /// Smallest usable storage (one data byte plus the reserved slot)
    pub const MIN_STORAGE: usize = 2;

    /// Bind storage, starting empty
    ///
    /// Fails with [`Error::InvalidArgument`] if the storage is shorter than
    /// [`Self::MIN_STORAGE`].
    pub fn new(storage: &'d mut [u8]) -> Result<Self> {
        if storage.len() < Self::MIN_STORAGE {
            return Err(Error::InvalidArgument);
        }
        Ok(Self {
            storage,
            head: 0,
            tail: 0,
        })
    }

    /// Unbind and hand the storage back
    pub fn into_storage(self) -> &'d mut [u8] {
        self.storage
    }

    /// Maximum number of bytes held at once
    pub fn capacity(&self) -> usize {
        self.storage.len() - 1
    }

    /// Number of buffered bytes
    pub fn len(&self) -> usize {
        if self.head >= self.tail {
            self.head - self.tail
        } else {
            self.head + self.storage.len() - self.tail
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    /// Drop everything buffered
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
    }

    /// Store a byte, evicting the oldest one when full
    ///
    /// Returns the evicted byte, if any.
    pub fn push(&mut self, byte: u8) -> Option<u8> {
        let evicted = if self.is_full() {
            let oldest = self.storage[self.tail];
            self.tail = self.advance(self.tail);
            Some(oldest)
        } else {
            None
        };

        self.storage[self.head] = byte;
        self.head = self.advance(self.head);
        evicted
    }

    /// Remove the oldest byte
    pub fn pop(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let byte = self.storage[self.tail];
        self.tail = self.advance(self.tail);
        Some(byte)
    }

    /// Move up to `dest.len()` bytes out, oldest first
    ///
    /// Returns the number of bytes copied.
    pub fn pop_into(&mut self, dest: &mut [u8]) -> usize {
        let count = dest.len().min(self.len());

        // At most two contiguous runs: tail..end, then 0..
        let first = count.min(self.storage.len() - self.tail);
        dest[..first].copy_from_slice(&self.storage[self.tail..self.tail + first]);
        let rest = count - first;
        dest[first..count].copy_from_slice(&self.storage[..rest]);

        self.tail = (self.tail + count) % self.storage.len();
        count
    }

    /// Next index, wrapping without a division
    fn advance(&self, index: usize) -> usize {
        if index + 1 == self.storage.len() {
            0
        } else {
            index + 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    #[test]
    fn test_rejects_undersized_storage() {
        let mut empty: [u8; 0] = [];
        assert_eq!(RingBuffer::new(&mut empty).err(), Some(Error::InvalidArgument));

        let mut one = [0u8; 1];
        assert_eq!(RingBuffer::new(&mut one).err(), Some(Error::InvalidArgument));

        let mut two = [0u8; 2];
        let ring = RingBuffer::new(&mut two).unwrap();
        assert_eq!(ring.capacity(), 1);
    }

    #[test]
    fn test_fifo_order() {
        let mut storage = [0u8; 8];
        let mut ring = RingBuffer::new(&mut storage).unwrap();

        for byte in 1..=7 {
            assert_eq!(ring.push(byte), None);
        }
        assert!(ring.is_full());

        let mut out = [0u8; 7];
        assert_eq!(ring.pop_into(&mut out), 7);
        assert_eq!(out, [1, 2, 3, 4, 5, 6, 7]);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_overwrite_evicts_oldest() {
        let mut storage = [0u8; 4];
        let mut ring = RingBuffer::new(&mut storage).unwrap();

        assert_eq!(ring.push(10), None);
        assert_eq!(ring.push(20), None);
        assert_eq!(ring.push(30), None);
        // Fourth byte into capacity-4 storage pushes out the first
        assert_eq!(ring.push(40), Some(10));

        assert_eq!(ring.len(), 3);
        let mut out = [0u8; 4];
        assert_eq!(ring.pop_into(&mut out), 3);
        assert_eq!(&out[..3], &[20, 30, 40]);
    }

    #[test]
    fn test_pop_into_across_wrap() {
        let mut storage = [0u8; 5];
        let mut ring = RingBuffer::new(&mut storage).unwrap();

        for byte in 0..4 {
            ring.push(byte);
        }
        assert_eq!(ring.pop(), Some(0));
        assert_eq!(ring.pop(), Some(1));
        ring.push(4);
        ring.push(5);

        let mut out = [0u8; 2];
        assert_eq!(ring.pop_into(&mut out), 2);
        assert_eq!(out, [2, 3]);
        assert_eq!(ring.pop_into(&mut out), 2);
        assert_eq!(out, [4, 5]);
        assert_eq!(ring.pop_into(&mut out), 0);
    }

    #[test]
    fn test_into_storage_returns_binding() {
        let mut storage = [0u8; 3];
        let mut ring = RingBuffer::new(&mut storage).unwrap();
        ring.push(0xAB);
        let storage = ring.into_storage();
        assert_eq!(storage.len(), 3);
        assert_eq!(storage[0], 0xAB);
    }

    proptest! {
        #[test]
        fn prop_length_stays_below_storage(
            size in 2usize..40,
            ops in proptest::collection::vec(proptest::option::of(any::<u8>()), 0..200),
        ) {
            let mut storage = vec![0u8; size];
            let mut ring = RingBuffer::new(&mut storage).unwrap();
            let mut model: VecDeque<u8> = VecDeque::new();

            for op in ops {
                match op {
                    Some(byte) => {
                        let expected = if model.len() == size - 1 { model.pop_front() } else { None };
                        model.push_back(byte);
                        prop_assert_eq!(ring.push(byte), expected);
                    }
                    None => {
                        prop_assert_eq!(ring.pop(), model.pop_front());
                    }
                }
                prop_assert!(ring.len() < size);
                prop_assert_eq!(ring.len(), model.len());
                prop_assert_eq!(ring.is_full(), ring.len() == size - 1);
            }
        }

        #[test]
        fn prop_round_trip_preserves_order(
            size in 2usize..40,
            offset in 0usize..40,
            data in proptest::collection::vec(any::<u8>(), 0..39),
        ) {
            let mut storage = vec![0u8; size];
            let mut ring = RingBuffer::new(&mut storage).unwrap();
            let data = &data[..data.len().min(size - 1)];

            // Rotate the indices so the payload straddles the wrap point
            for _ in 0..offset % size {
                ring.push(0);
                ring.pop();
            }

            for &byte in data {
                prop_assert_eq!(ring.push(byte), None);
            }
            let mut out = vec![0u8; data.len()];
            prop_assert_eq!(ring.pop_into(&mut out), data.len());
            prop_assert_eq!(&out[..], data);
        }

        #[test]
        fn prop_filling_past_capacity_keeps_newest(size in 2usize..40) {
            let mut storage = vec![0u8; size];
            let mut ring = RingBuffer::new(&mut storage).unwrap();

            for byte in 0..size {
                ring.push(byte as u8);
            }

            let mut out = vec![0u8; size];
            let copied = ring.pop_into(&mut out);
            prop_assert_eq!(copied, size - 1);
            let expected: Vec<u8> = (1..size).map(|b| b as u8).collect();
            prop_assert_eq!(&out[..copied], &expected[..]);
        }
    }
}
