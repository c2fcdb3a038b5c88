//! Ring Buffer
//!
//! Provides a fixed-capacity FIFO used for bounded reading history.

mod buffer;

pub use buffer::RingBuffer;
