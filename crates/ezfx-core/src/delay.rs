//! Fixed-length circular delay line.
//!
//! The reverb's comb and allpass filters only ever read at their full length,
//! so there is no fractional read or interpolation here: one write, one read,
//! one index advance per sample.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

/// Circular delay of a fixed number of samples (heap-allocated).
///
/// # Memory
///
/// The buffer is allocated during construction and never reallocates.
///
/// # Example
///
/// ```rust
/// use ezfx_core::DelayLine;
///
/// let mut delay = DelayLine::new(3);
/// assert_eq!(delay.process(1.0), 0.0);
/// assert_eq!(delay.process(0.0), 0.0);
/// assert_eq!(delay.process(0.0), 0.0);
/// assert_eq!(delay.process(0.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    index: usize,
}

impl DelayLine {
    /// Create a delay of `length` samples. A length of zero is raised to one.
    pub fn new(length: usize) -> Self {
        Self {
            buffer: vec![0.0; length.max(1)],
            index: 0,
        }
    }

    /// Sample written `len()` samples ago.
    #[inline]
    pub fn read(&self) -> f32 {
        self.buffer[self.index]
    }

    /// Overwrite the oldest sample and advance.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.index] = sample;
        self.index += 1;
        if self.index == self.buffer.len() {
            self.index = 0;
        }
    }

    /// Read the oldest sample, then write `sample` in its place.
    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        let out = self.read();
        self.write(sample);
        out
    }

    /// Zero the buffer.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
    }

    /// Delay length in samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Always `false`; a delay line holds at least one sample.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}
