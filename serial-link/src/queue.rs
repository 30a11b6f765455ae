//! Fixed-capacity circular byte queue shared between an interrupt handler
//! and the application loop.
//!
//! A [`ByteQueue`] is split once into a [`QueueWriter`] (handed to the
//! interrupt side) and a [`QueueReader`] (handed to the application side).
//! Only the writer can push and only the reader can pop, so the
//! single-producer/single-consumer discipline is checked by the compiler
//! rather than by convention.
//!
//! One slot of the backing storage is never used: a queue declared with
//! `N` slots holds at most `N - 1` bytes, which lets "empty" and "full" be
//! told apart from the indices alone.
//!
//! # Example
//!
//! ```
//! use serial_link::ByteQueue;
//!
//! let mut queue: ByteQueue<4> = ByteQueue::new();
//! let (mut writer, mut reader) = queue.split();
//!
//! assert!(writer.push(1));
//! assert!(writer.push(2));
//! assert!(writer.push(3));
//! assert!(!writer.push(4)); // full, byte dropped
//!
//! assert_eq!(reader.overflow_count(), 1);
//! assert_eq!(reader.pop(), Some(1));
//! ```

use heapless::spsc::{Consumer, Producer, Queue};
use portable_atomic::{AtomicU32, Ordering};

/// Default number of slots per serial queue (511 usable bytes).
pub const QUEUE_SIZE: usize = 512;

/// Circular byte buffer with an overflow counter.
///
/// Create it once (typically in a `static` cell), then call [`split`](Self::split)
/// to obtain the producer and consumer handles.
pub struct ByteQueue<const N: usize> {
    queue: Queue<u8, N>,
    overflows: AtomicU32,
}

impl<const N: usize> ByteQueue<N> {
    /// Create an empty queue.
    ///
    /// This is `const`, so the queue can live in a `static`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
            overflows: AtomicU32::new(0),
        }
    }

    /// Number of bytes the queue can hold (`N - 1`).
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Split into the producer and consumer handles.
    ///
    /// Both handles borrow the queue, so neither can outlive it and no
    /// second pair can be created while they exist.
    pub fn split(&mut self) -> (QueueWriter<'_, N>, QueueReader<'_, N>) {
        let Self { queue, overflows } = self;
        let overflows: &AtomicU32 = overflows;
        let (producer, consumer) = queue.split();
        (
            QueueWriter {
                producer,
                overflows,
            },
            QueueReader {
                consumer,
                overflows,
            },
        )
    }
}

impl<const N: usize> Default for ByteQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer handle: the only side allowed to push.
pub struct QueueWriter<'q, const N: usize> {
    producer: Producer<'q, u8, N>,
    overflows: &'q AtomicU32,
}

impl<const N: usize> QueueWriter<'_, N> {
    /// Append one byte.
    ///
    /// Returns `false` and counts an overflow when the queue is full. The
    /// byte is lost; there is no blocking and no partial write.
    #[inline]
    pub fn push(&mut self, byte: u8) -> bool {
        match self.producer.enqueue(byte) {
            Ok(()) => true,
            Err(_) => {
                self.overflows.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Number of bytes currently queued.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.producer.len()
    }

    /// Check if the queue is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if another push would overflow.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        !self.producer.ready()
    }

    /// Free slots left before the queue is full.
    #[inline]
    #[must_use]
    pub fn free(&self) -> usize {
        (N - 1) - self.len()
    }

    /// Number of bytes dropped because the queue was full.
    #[inline]
    #[must_use]
    pub fn overflow_count(&self) -> u32 {
        self.overflows.load(Ordering::Relaxed)
    }
}

/// Consumer handle: the only side allowed to pop.
pub struct QueueReader<'q, const N: usize> {
    consumer: Consumer<'q, u8, N>,
    overflows: &'q AtomicU32,
}

impl<const N: usize> QueueReader<'_, N> {
    /// Remove and return the oldest byte, or `None` when empty.
    ///
    /// Popping an empty queue leaves it untouched.
    #[inline]
    pub fn pop(&mut self) -> Option<u8> {
        self.consumer.dequeue()
    }

    /// Return the oldest byte without removing it.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.consumer.peek().copied()
    }

    /// Number of bytes currently queued.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    /// Check if the queue is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.consumer.ready()
    }

    /// Number of bytes dropped because the queue was full.
    #[inline]
    #[must_use]
    pub fn overflow_count(&self) -> u32 {
        self.overflows.load(Ordering::Relaxed)
    }

    /// Discard all queued bytes and reset the overflow counter.
    ///
    /// The storage is not resized.
    pub fn clear(&mut self) {
        while self.consumer.dequeue().is_some() {}
        self.overflows.store(0, Ordering::Relaxed);
    }
}
