//! Analyzer taps: lock-free hand-off of post-EQ audio to a visualizer.
//!
//! Each channel gets one [`AnalyzerFifo`] (producer, owned by the
//! processor) and any number of [`AnalyzerReader`]s (consumers, e.g. a
//! spectrum display thread).
//!
//! # Design
//!
//! Two bounded `ArrayQueue`s share a fixed set of equally sized buffers:
//!
//! ```text
//!            +--------- pool (free buffers) <--------+
//!            v                                       |
//! staging -> copy -> ready (capacity C, oldest first) -> AnalyzerBlock (Drop)
//! ```
//!
//! - The producer accumulates samples into a staging block. When it fills,
//!   a buffer is taken from `pool`, filled, and pushed to `ready`.
//! - If `ready` is full the oldest block is displaced and its buffer goes
//!   back to the pool, so a reader that never drains only ever sees the
//!   most recent `C` blocks.
//! - An [`AnalyzerBlock`] returns its buffer to the pool when dropped.
//!
//! The audio side never allocates or takes a lock. The queues are lock-free
//! but not wait-free: `force_push` and `pop` retry a compare-and-swap when a
//! reader touches the same slot at the same moment, so a write may spin a
//! few extra iterations under contention. It never blocks on a reader that
//! has been descheduled. If no buffer is available at all (readers are
//! holding every spare) the block is dropped and counted.
//!
//! The queues live behind an `ArcSwap` so [`AnalyzerFifo::prepare`] can
//! replace them while readers keep their handles.

use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use crossbeam_queue::ArrayQueue;

/// Ring capacity in blocks.
pub const DEFAULT_CAPACITY: usize = 30;

/// Buffers beyond `capacity` that readers may hold without starving the
/// producer.
const SPARE_BUFFERS: usize = 2;

struct FifoInner {
    ready: ArrayQueue<Vec<f32>>,
    pool: ArrayQueue<Vec<f32>>,
    block_size: usize,
    dropped: AtomicU64,
}

impl FifoInner {
    fn new(block_size: usize, capacity: usize) -> Self {
        let block_size = block_size.max(1);
        let capacity = capacity.max(1);
        let buffers = capacity + SPARE_BUFFERS;

        let pool = ArrayQueue::new(buffers);
        for _ in 0..buffers {
            // Cannot fail: the pool holds exactly `buffers` slots.
            let _ = pool.push(vec![0.0; block_size]);
        }

        Self {
            ready: ArrayQueue::new(capacity),
            pool,
            block_size,
            dropped: AtomicU64::new(0),
        }
    }
}

/// Producer half of an analyzer tap.
pub struct AnalyzerFifo {
    shared: Arc<ArcSwap<FifoInner>>,
    inner: Arc<FifoInner>,
    staging: Vec<f32>,
    fill: usize,
}

impl AnalyzerFifo {
    /// Creates a tap publishing blocks of `block_size` samples into a ring of
    /// `capacity` blocks.
    pub fn new(block_size: usize, capacity: usize) -> Self {
        let inner = Arc::new(FifoInner::new(block_size, capacity));
        Self {
            shared: Arc::new(ArcSwap::new(Arc::clone(&inner))),
            staging: vec![0.0; inner.block_size],
            inner,
            fill: 0,
        }
    }

    /// Reinitializes the tap to silence with new dimensions. Allocates.
    ///
    /// Existing readers see the new ring from their next pull. Blocks they
    /// still hold recycle into the old ring and are freed with it.
    pub fn prepare(&mut self, block_size: usize, capacity: usize) {
        let inner = Arc::new(FifoInner::new(block_size, capacity));
        self.staging = vec![0.0; inner.block_size];
        self.fill = 0;
        self.shared.store(Arc::clone(&inner));
        self.inner = inner;
    }

    /// Appends samples, publishing every block that fills.
    ///
    /// Never blocks or allocates.
    pub fn update(&mut self, samples: &[f32]) {
        let mut rest = samples;
        while !rest.is_empty() {
            let take = (self.staging.len() - self.fill).min(rest.len());
            self.staging[self.fill..self.fill + take].copy_from_slice(&rest[..take]);
            self.fill += take;
            rest = &rest[take..];

            if self.fill == self.staging.len() {
                self.publish();
                self.fill = 0;
            }
        }
    }

    fn publish(&self) {
        let inner = &*self.inner;
        let buffer = match inner.pool.pop() {
            Some(buffer) => Some(buffer),
            None => {
                // Every spare is checked out; reuse the oldest unread block.
                inner.dropped.fetch_add(1, Ordering::Relaxed);
                inner.ready.pop()
            }
        };
        let Some(mut buffer) = buffer else {
            return;
        };

        buffer.copy_from_slice(&self.staging);
        if let Some(displaced) = inner.ready.force_push(buffer) {
            inner.dropped.fetch_add(1, Ordering::Relaxed);
            let _ = inner.pool.push(displaced);
        }
    }

    /// A new consumer handle.
    pub fn reader(&self) -> AnalyzerReader {
        AnalyzerReader {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Samples per published block.
    pub fn block_size(&self) -> usize {
        self.inner.block_size
    }

    /// Maximum number of unread blocks.
    pub fn capacity(&self) -> usize {
        self.inner.ready.capacity()
    }
}

impl std::fmt::Debug for AnalyzerFifo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerFifo")
            .field("block_size", &self.inner.block_size)
            .field("capacity", &self.inner.ready.capacity())
            .field("available", &self.inner.ready.len())
            .field("fill", &self.fill)
            .finish()
    }
}

/// Consumer half of an analyzer tap. Cheap to clone; never blocks.
#[derive(Clone)]
pub struct AnalyzerReader {
    shared: Arc<ArcSwap<FifoInner>>,
}

impl AnalyzerReader {
    /// Oldest unread block, if any.
    pub fn pull(&self) -> Option<AnalyzerBlock> {
        let inner = self.shared.load_full();
        let samples = inner.ready.pop()?;
        Some(AnalyzerBlock {
            samples,
            home: inner,
        })
    }

    /// Number of blocks waiting.
    pub fn available(&self) -> usize {
        self.shared.load().ready.len()
    }

    /// Samples per block.
    pub fn block_size(&self) -> usize {
        self.shared.load().block_size
    }

    /// Blocks lost to overflow since the last `prepare`.
    pub fn dropped(&self) -> u64 {
        self.shared.load().dropped.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for AnalyzerReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerReader")
            .field("available", &self.available())
            .finish()
    }
}

/// One block of analyzer samples. Returns its storage to the producer when
/// dropped.
pub struct AnalyzerBlock {
    samples: Vec<f32>,
    home: Arc<FifoInner>,
}

impl Deref for AnalyzerBlock {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.samples
    }
}

impl Drop for AnalyzerBlock {
    fn drop(&mut self) {
        let samples = std::mem::take(&mut self.samples);
        let _ = self.home.pool.push(samples);
    }
}

impl std::fmt::Debug for AnalyzerBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzerBlock")
            .field("len", &self.samples.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(value: f32, len: usize) -> Vec<f32> {
        vec![value; len]
    }

    #[test]
    fn publishes_only_full_blocks() {
        let mut fifo = AnalyzerFifo::new(8, 4);
        let reader = fifo.reader();

        fifo.update(&block(1.0, 5));
        assert!(reader.pull().is_none());

        fifo.update(&block(2.0, 5));
        let first = reader.pull().unwrap();
        assert_eq!(&first[..], &[1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
        assert!(reader.pull().is_none());
    }

    #[test]
    fn overflow_keeps_most_recent() {
        let capacity = 5;
        let mut fifo = AnalyzerFifo::new(4, capacity);
        let reader = fifo.reader();

        for i in 0..12 {
            fifo.update(&block(i as f32, 4));
        }

        let pulled: Vec<f32> = std::iter::from_fn(|| reader.pull().map(|b| b[0])).collect();
        assert_eq!(pulled, vec![7.0, 8.0, 9.0, 10.0, 11.0]);
        assert_eq!(reader.dropped(), 7);
    }

    #[test]
    fn dropped_blocks_recycle_storage() {
        let mut fifo = AnalyzerFifo::new(16, 2);
        let reader = fifo.reader();

        for round in 0..100 {
            fifo.update(&block(round as f32, 16));
            let b = reader.pull().unwrap();
            assert_eq!(b[0], round as f32);
        }
        assert_eq!(reader.dropped(), 0);
    }

    #[test]
    fn held_blocks_do_not_break_producer() {
        let mut fifo = AnalyzerFifo::new(4, 2);
        let reader = fifo.reader();

        fifo.update(&block(1.0, 4));
        fifo.update(&block(2.0, 4));
        let held: Vec<AnalyzerBlock> = std::iter::from_fn(|| reader.pull()).collect();
        assert_eq!(held.len(), 2);

        for i in 0..10 {
            fifo.update(&block(10.0 + i as f32, 4));
        }
        let latest: Vec<f32> = std::iter::from_fn(|| reader.pull().map(|b| b[0])).collect();
        assert_eq!(latest.last().copied(), Some(19.0));
        assert!(latest.len() <= 2);
        assert_eq!(held[0][0], 1.0);
    }

    #[test]
    fn prepare_resets_to_empty() {
        let mut fifo = AnalyzerFifo::new(4, 3);
        let reader = fifo.reader();
        fifo.update(&block(1.0, 8));
        assert_eq!(reader.available(), 2);

        fifo.prepare(32, 3);
        assert_eq!(reader.available(), 0);
        assert_eq!(reader.block_size(), 32);
        assert_eq!(fifo.block_size(), 32);
    }

    #[test]
    fn concurrent_reader_sees_ordered_blocks() {
        let mut fifo = AnalyzerFifo::new(64, DEFAULT_CAPACITY);
        let reader = fifo.reader();

        let consumer = std::thread::spawn(move || {
            let mut last = -1.0f32;
            let mut seen = 0usize;
            while seen < 200 {
                if let Some(b) = reader.pull() {
                    assert!(b.iter().all(|&x| x == b[0]), "torn block");
                    assert!(b[0] > last, "out of order: {} after {}", b[0], last);
                    last = b[0];
                    seen += 1;
                    if last >= 999.0 {
                        break;
                    }
                } else {
                    std::thread::yield_now();
                }
            }
        });

        for i in 0..1000 {
            fifo.update(&block(i as f32, 64));
        }
        consumer.join().unwrap();
    }
}
