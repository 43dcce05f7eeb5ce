//! The host-facing effect processor.
//!
//! ```text
//! in L -> ChannelChain L -+-> analyzer L -+
//!                         |               +-> ReverbStage -> out L / out R
//! in R -> ChannelChain R -+-> analyzer R -+
//! ```
//!
//! Every block starts from one [`ParameterSnapshot`](crate::ParameterSnapshot):
//! the EQ coefficients are designed once and applied to both chains, and
//! the reverb settings are derived from the same snapshot.

use ezfx_effects::{ChainCoefficients, ChannelChain, ReverbStage};

use crate::analyzer::{AnalyzerFifo, AnalyzerReader, DEFAULT_CAPACITY};
use crate::error::Result;
use crate::params::SharedParams;
use crate::state;

const DEFAULT_SAMPLE_RATE: f32 = 44100.0;
const DEFAULT_MAX_BLOCK: usize = 512;

/// Channel configuration accepted by the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelLayout {
    /// One channel; the right chain is idle and the reverb runs mono.
    Mono,
    /// Left/right pair.
    #[default]
    Stereo,
}

impl ChannelLayout {
    /// Number of channels processed.
    pub const fn channels(self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }
}

/// EQ plus reverb processor for one mono or stereo bus.
///
/// Control-side methods (`set_parameter`, state, analyzer readers) only
/// touch [`SharedParams`] and lock-free queues, so a clone of the params can
/// be driven from another thread while `process` runs.
///
/// # Example
///
/// ```rust
/// use ezfx_engine::{ChannelLayout, EffectProcessor, SharedParams};
///
/// let mut fx = EffectProcessor::new(SharedParams::new(), ChannelLayout::Stereo);
/// fx.prepare(48000.0, 256);
/// fx.set_parameter("Reverb Value", 25.0).unwrap();
///
/// let mut left = vec![0.0f32; 256];
/// let mut right = vec![0.0f32; 256];
/// fx.process(&mut [&mut left[..], &mut right[..]]);
/// ```
pub struct EffectProcessor {
    params: SharedParams,
    layout: ChannelLayout,
    sample_rate: f32,
    max_block_size: usize,
    chains: [ChannelChain; 2],
    reverb: ReverbStage,
    analyzers: [AnalyzerFifo; 2],
    scratch: [Vec<f32>; 2],
}

impl EffectProcessor {
    /// Creates a processor prepared for 44.1 kHz, 512-sample blocks.
    pub fn new(params: SharedParams, layout: ChannelLayout) -> Self {
        Self {
            params,
            layout,
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_block_size: DEFAULT_MAX_BLOCK,
            chains: [ChannelChain::new(), ChannelChain::new()],
            reverb: ReverbStage::new(DEFAULT_SAMPLE_RATE),
            analyzers: [
                AnalyzerFifo::new(DEFAULT_MAX_BLOCK, DEFAULT_CAPACITY),
                AnalyzerFifo::new(DEFAULT_MAX_BLOCK, DEFAULT_CAPACITY),
            ],
            scratch: [vec![0.0; DEFAULT_MAX_BLOCK], vec![0.0; DEFAULT_MAX_BLOCK]],
        }
    }

    /// Configures for a new stream and silences all state. Allocates; call
    /// only while audio is stopped.
    ///
    /// An unusable sample rate leaves the EQ transparent and tunes the
    /// reverb for 44.1 kHz. A zero block size is treated as one.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            tracing::warn!(sample_rate, "unusable sample rate, EQ will pass audio unchanged");
        }
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size.max(1);

        self.reverb.set_sample_rate(sample_rate);
        for chain in &mut self.chains {
            chain.reset();
        }
        for fifo in &mut self.analyzers {
            fifo.prepare(self.max_block_size, DEFAULT_CAPACITY);
        }
        self.scratch = [
            vec![0.0; self.max_block_size],
            vec![0.0; self.max_block_size],
        ];

        tracing::info!(
            sample_rate,
            max_block_size = self.max_block_size,
            layout = ?self.layout,
            "processor prepared"
        );
    }

    /// Clears filter and reverb state without reallocating.
    pub fn reset(&mut self) {
        for chain in &mut self.chains {
            chain.reset();
        }
        self.reverb.reset();
    }

    /// Processes planar channels in place.
    ///
    /// The first one (mono) or two (stereo) channels are processed; any
    /// further channels are silenced. A stereo processor given a single
    /// channel processes it as mono.
    pub fn process(&mut self, channels: &mut [&mut [f32]]) {
        let active = self.layout.channels().min(channels.len());
        let (active_channels, extra) = channels.split_at_mut(active);
        for channel in extra.iter_mut() {
            channel.fill(0.0);
        }
        if active == 0 {
            return;
        }

        let snapshot = self.params.snapshot();
        let coefficients = ChainCoefficients::design(&snapshot.chain_settings(), self.sample_rate);
        self.reverb.set_parameters(snapshot.reverb_parameters());

        for ((chain, fifo), channel) in self
            .chains
            .iter_mut()
            .zip(self.analyzers.iter_mut())
            .zip(active_channels.iter_mut())
        {
            chain.apply(&coefficients);
            chain.process(&mut channel[..]);
            fifo.update(&channel[..]);
        }

        match active_channels {
            [left, right] => self.reverb.process_stereo(&mut left[..], &mut right[..]),
            [mono] => self.reverb.process_mono(&mut mono[..]),
            _ => {}
        }
    }

    /// Processes an interleaved buffer of `num_channels` channels in place.
    ///
    /// Runs in chunks of at most `max_block_size` frames through the scratch
    /// buffers allocated in [`prepare`](Self::prepare). Channels beyond the
    /// layout and any trailing partial frame are silenced.
    pub fn process_interleaved(&mut self, buffer: &mut [f32], num_channels: usize) {
        if num_channels == 0 {
            return;
        }
        let whole = buffer.len() - buffer.len() % num_channels;
        let (frames_part, partial) = buffer.split_at_mut(whole);
        partial.fill(0.0);

        let active = self.layout.channels().min(num_channels);
        let mut scratch = std::mem::take(&mut self.scratch);

        for block in frames_part.chunks_mut(self.max_block_size * num_channels) {
            let frames = block.len() / num_channels;

            for (ch, buf) in scratch.iter_mut().enumerate().take(active) {
                for (frame, sample) in buf[..frames].iter_mut().enumerate() {
                    *sample = block[frame * num_channels + ch];
                }
            }

            {
                let [left, right] = &mut scratch;
                if active == 2 {
                    self.process(&mut [&mut left[..frames], &mut right[..frames]]);
                } else {
                    self.process(&mut [&mut left[..frames]]);
                }
            }

            for (frame, samples) in block.chunks_exact_mut(num_channels).enumerate() {
                for (ch, sample) in samples.iter_mut().enumerate() {
                    *sample = if ch < active { scratch[ch][frame] } else { 0.0 };
                }
            }
        }

        self.scratch = scratch;
    }

    /// User-facing value of a parameter (slopes in dB/oct).
    pub fn get_parameter(&self, name: &str) -> Result<f32> {
        self.params.get_by_name(name)
    }

    /// Sets a parameter from its user-facing value, clamping into range.
    ///
    /// Returns the user-facing value now in effect.
    pub fn set_parameter(&self, name: &str, value: f32) -> Result<f32> {
        self.params.set_by_name(name, value)
    }

    /// Serializes every parameter to a JSON state blob.
    pub fn serialize_state(&self) -> Vec<u8> {
        match state::serialize(&self.params) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize state");
                Vec::new()
            }
        }
    }

    /// Restores parameters from a state blob. On error every parameter is
    /// back at its default.
    pub fn deserialize_state(&self, bytes: &[u8]) -> Result<()> {
        state::deserialize(&self.params, bytes)
    }

    /// Reader for the left (or mono) post-EQ analyzer tap.
    pub fn left_analyzer(&self) -> AnalyzerReader {
        self.analyzers[0].reader()
    }

    /// Reader for the right post-EQ analyzer tap.
    pub fn right_analyzer(&self) -> AnalyzerReader {
        self.analyzers[1].reader()
    }

    /// The shared parameter store.
    pub fn params(&self) -> &SharedParams {
        &self.params
    }

    /// Channel layout.
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Sample rate given to the last `prepare`.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Largest block `process` expects, and the interleaved chunk size.
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Left and right channel chains.
    pub fn chains(&self) -> &[ChannelChain; 2] {
        &self.chains
    }
}

impl std::fmt::Debug for EffectProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectProcessor")
            .field("layout", &self.layout)
            .field("sample_rate", &self.sample_rate)
            .field("max_block_size", &self.max_block_size)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
