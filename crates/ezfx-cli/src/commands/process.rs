//! File-based processing command.

use super::common::{build_params, parse_key_val, peak, rms};
use crate::wav::{WavSpec, read_wav, write_wav};
use clap::Args;
use ezfx_core::linear_to_db;
use ezfx_engine::{AnalyzerReader, ChannelLayout, EffectProcessor};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Preset file (TOML)
    #[arg(short, long)]
    preset: Option<PathBuf>,

    /// Parameter overrides (e.g., "peak_gain=6" or "lowcut_slope=24")
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    param: Vec<(String, f32)>,

    /// Processing block size in frames
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Seconds of silence appended so the reverb tail can ring out
    #[arg(long, default_value = "0.0")]
    tail: f32,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

/// Running level statistics for one analyzer tap.
#[derive(Default)]
struct TapStats {
    blocks: usize,
    sum_squares: f64,
    samples: usize,
    peak: f32,
}

impl TapStats {
    fn drain(&mut self, reader: &AnalyzerReader) {
        while let Some(block) = reader.pull() {
            self.blocks += 1;
            self.samples += block.len();
            self.sum_squares += block.iter().map(|&s| f64::from(s * s)).sum::<f64>();
            self.peak = self.peak.max(peak(&block));
        }
    }

    fn rms(&self) -> f32 {
        if self.samples == 0 {
            0.0
        } else {
            (self.sum_squares / self.samples as f64).sqrt() as f32
        }
    }
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if args.block_size == 0 {
        anyhow::bail!("--block-size must be at least 1");
    }
    if !(args.tail.is_finite() && args.tail >= 0.0) {
        anyhow::bail!("--tail must be a non-negative number of seconds");
    }

    println!("Reading {}...", args.input.display());
    let (mut samples, spec) = read_wav(&args.input)?;
    let channels = usize::from(spec.channels);
    if channels == 0 {
        anyhow::bail!("{} has no channels", args.input.display());
    }
    let sample_rate = spec.sample_rate as f32;

    println!(
        "  {} frames, {} channel(s), {} Hz, {:.2}s",
        samples.len() / channels,
        channels,
        spec.sample_rate,
        samples.len() as f32 / channels as f32 / sample_rate
    );

    let params = build_params(args.preset.as_deref(), &args.param)?;
    let layout = if channels == 1 {
        ChannelLayout::Mono
    } else {
        ChannelLayout::Stereo
    };
    if channels > 2 {
        println!("  Only the first two channels are processed; the rest are silenced");
    }

    let input_rms = rms(&samples);
    let input_peak = peak(&samples);

    let tail_frames = (args.tail * sample_rate) as usize;
    samples.resize(samples.len() + tail_frames * channels, 0.0);

    let mut processor = EffectProcessor::new(params, layout);
    processor.prepare(sample_rate, args.block_size);
    let taps = [processor.left_analyzer(), processor.right_analyzer()];
    let mut stats = [TapStats::default(), TapStats::default()];

    let frames = samples.len() / channels;
    let pb = ProgressBar::new(frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    for (i, chunk) in samples.chunks_mut(args.block_size * channels).enumerate() {
        processor.process_interleaved(chunk, channels);
        for (tap, stat) in taps.iter().zip(stats.iter_mut()) {
            stat.drain(tap);
        }
        pb.set_position(((i + 1) * args.block_size).min(frames) as u64);
    }

    pb.finish_with_message("done");

    println!("\nStats:");
    println!(
        "  Input:  RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(input_rms),
        linear_to_db(input_peak)
    );
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(&samples)),
        linear_to_db(peak(&samples))
    );

    println!("\nPost-EQ analyzer:");
    for (name, (tap, stat)) in ["Left", "Right"]
        .iter()
        .zip(taps.iter().zip(&stats))
        .take(layout.channels())
    {
        println!(
            "  {:<5}  {} blocks, RMS {:.1} dB, Peak {:.1} dB, {} dropped",
            name,
            stat.blocks,
            linear_to_db(stat.rms()),
            linear_to_db(stat.peak),
            tap.dropped()
        );
    }

    let out_spec = WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };

    println!("\nWriting {}...", args.output.display());
    write_wav(&args.output, &samples, out_spec)?;
    println!("Done!");

    Ok(())
}
