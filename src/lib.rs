//! Growable circular FIFO queue backed by a contiguous buffer.

mod circular_queue;

pub use circular_queue::{CircularQueue, Underflow, Value};
