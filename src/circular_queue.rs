//! A FIFO queue over a circularly-indexed buffer that grows on demand.

use allocator_api2::{
    alloc::{Allocator, Global},
    vec::Vec as AVec,
};
use anyhow::{Result, bail};
use std::fmt;
use thiserror::Error;

/// The element kind stored in a [`CircularQueue`].
pub type Value = i64;

/// What vacated slots are reset to. Never read back as queue content.
const VACANT: Value = 0;

/// Error returned when removing the front element of an empty
/// [`CircularQueue`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("Queue is empty: underflow")]
pub struct Underflow;

/// A FIFO queue of [`Value`]s backed by a contiguous buffer indexed
/// circularly, so that insertion and removal both run in constant time
/// without ever moving the live elements.
///
/// The buffer has a fixed capacity at any given moment, but the queue is
/// unbounded from the caller's perspective: inserting into a full queue
/// reallocates the buffer at twice the capacity before writing. Removal may
/// reallocate to a smaller buffer when occupancy falls to a quarter of the
/// capacity, never below [`CircularQueue::MIN_CAPACITY`].
///
/// The live elements occupy the circular index range `[front, front + len)`
/// modulo the capacity, with `front` holding the oldest element and
/// `rear == (front + len) % capacity` the slot the next insertion writes to.
#[derive(Clone, Debug)]
pub struct CircularQueue<A: Allocator = Global> {
    store: AVec<Value, A>,
    size: usize,
    front: usize,
    rear: usize,
}

impl CircularQueue {
    /// The capacity of queues created with [`Self::new`].
    pub const DEFAULT_CAPACITY: usize = 16;

    /// The smallest capacity removal will ever shrink the buffer to.
    pub const MIN_CAPACITY: usize = 16;

    /// Creates a new empty queue with [`Self::DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates a new empty queue with the given initial capacity.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }

    /// Creates a new empty queue with the given initial capacity.
    ///
    /// # Errors
    /// Returns an error if `capacity` is zero.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        Self::try_with_capacity_in(capacity, Global)
    }
}

impl<A: Allocator> CircularQueue<A> {
    /// Creates a new empty queue with [`CircularQueue::DEFAULT_CAPACITY`],
    /// allocated with the specified allocator.
    pub fn new_in(alloc: A) -> Self {
        Self::with_capacity_in(CircularQueue::DEFAULT_CAPACITY, alloc)
    }

    /// Creates a new empty queue with the given initial capacity, allocated
    /// with the specified allocator.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        Self::try_with_capacity_in(capacity, alloc).unwrap_or_else(|err| panic!("{}", err))
    }

    /// Creates a new empty queue with the given initial capacity, allocated
    /// with the specified allocator.
    ///
    /// # Errors
    /// Returns an error if `capacity` is zero.
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self> {
        if capacity == 0 {
            bail!("`CircularQueue` created with zero capacity");
        }
        let mut store = AVec::new_in(alloc);
        store.resize(capacity, VACANT);
        Ok(Self {
            store,
            size: 0,
            front: 0,
            rear: 0,
        })
    }

    /// Returns the number of elements the queue can hold before the next
    /// insertion reallocates.
    pub fn capacity(&self) -> usize {
        self.store.len()
    }

    /// Returns the number of elements currently in the queue.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the queue contains no elements.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Whether the queue has reached its current capacity.
    ///
    /// A full queue still accepts insertions; the next [`push_back`] grows
    /// the buffer instead of failing.
    ///
    /// [`push_back`]: Self::push_back
    pub fn is_full(&self) -> bool {
        self.size == self.capacity()
    }

    /// Returns a reference to the oldest element without removing it, or
    /// `None` if the queue is empty.
    pub fn peek_front(&self) -> Option<&Value> {
        if self.is_empty() {
            None
        } else {
            Some(&self.store[self.front])
        }
    }

    /// Returns an iterator over the live elements, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        let capacity = self.capacity();
        (0..self.size).map(move |k| &self.store[(self.front + k) % capacity])
    }
}

impl<A: Allocator + Clone> CircularQueue<A> {
    /// Adds an element to the back of the queue.
    ///
    /// Runs in amortized constant time: when the queue is full, the buffer
    /// is first reallocated at twice the capacity.
    pub fn push_back(&mut self, value: Value) {
        if self.is_full() {
            self.grow();
        }
        self.store[self.rear] = value;
        self.rear = (self.rear + 1) % self.capacity();
        self.size += 1;
    }

    /// Removes and returns the oldest element.
    ///
    /// Runs in constant time unless occupancy falls low enough for the
    /// buffer to shrink.
    ///
    /// # Errors
    /// Returns [`Underflow`] if the queue is empty, leaving the queue
    /// untouched.
    pub fn pop_front(&mut self) -> std::result::Result<Value, Underflow> {
        if self.is_empty() {
            return Err(Underflow);
        }
        let value = self.store[self.front];
        // The slot leaves the live range and must not retain queue content.
        self.store[self.front] = VACANT;
        self.front = (self.front + 1) % self.capacity();
        self.size -= 1;
        self.shrink_if_sparse();
        Ok(value)
    }

    fn grow(&mut self) {
        let new_capacity = 2 * self.capacity();
        log::debug!(
            "Growing queue buffer from {} to {} slots",
            self.capacity(),
            new_capacity
        );
        self.relinearize_into(new_capacity);
    }

    /// Halves the buffer when at most a quarter of it is occupied, stopping
    /// at [`CircularQueue::MIN_CAPACITY`].
    fn shrink_if_sparse(&mut self) {
        let capacity = self.capacity();
        let new_capacity = capacity / 2;
        if self.size <= capacity / 4 && new_capacity >= CircularQueue::MIN_CAPACITY {
            log::debug!(
                "Shrinking queue buffer from {} to {} slots",
                capacity,
                new_capacity
            );
            self.relinearize_into(new_capacity);
        }
    }

    /// Reallocates the buffer at the given capacity and copies the live
    /// elements into it in FIFO order, starting at index zero.
    ///
    /// Element `k` is read from `(front + k) % capacity` for each of the
    /// `size` live elements, which handles a live range wrapping past the
    /// end of the old buffer without treating `rear` specially (a full
    /// queue has `rear == front` regardless of where the range starts).
    fn relinearize_into(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity > self.size);
        let old_capacity = self.capacity();
        let mut new_store = AVec::new_in(self.store.allocator().clone());
        new_store.resize(new_capacity, VACANT);
        for k in 0..self.size {
            new_store[k] = self.store[(self.front + k) % old_capacity];
        }
        self.store = new_store;
        self.front = 0;
        self.rear = self.size;
    }
}

impl Default for CircularQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> fmt::Display for CircularQueue<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}
