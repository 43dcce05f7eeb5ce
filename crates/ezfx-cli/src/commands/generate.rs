//! Test signal generation command.

use crate::wav::{WavSpec, write_wav};
use clap::{Args, Subcommand};
use std::f32::consts::PI;
use std::path::PathBuf;

#[derive(Args)]
pub struct GenerateArgs {
    #[command(subcommand)]
    command: GenerateCommand,
}

#[derive(Subcommand)]
enum GenerateCommand {
    /// Generate a sine tone
    Tone {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Frequency in Hz
        #[arg(long, default_value = "440.0")]
        freq: f32,

        /// Duration in seconds
        #[arg(long, default_value = "1.0")]
        duration: f32,

        /// Sample rate
        #[arg(long, default_value = "48000")]
        sample_rate: u32,

        /// Amplitude (0-1)
        #[arg(long, default_value = "0.8")]
        amplitude: f32,

        /// Number of channels (the tone is copied to each)
        #[arg(long, default_value = "2")]
        channels: u16,
    },

    /// Generate an impulse followed by silence, for capturing the reverb
    Impulse {
        /// Output WAV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Length in frames
        #[arg(long, default_value = "48000")]
        length: usize,

        /// Sample rate
        #[arg(long, default_value = "48000")]
        sample_rate: u32,

        /// Impulse amplitude
        #[arg(long, default_value = "1.0")]
        amplitude: f32,

        /// Number of channels
        #[arg(long, default_value = "2")]
        channels: u16,
    },
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    match args.command {
        GenerateCommand::Tone {
            output,
            freq,
            duration,
            sample_rate,
            amplitude,
            channels,
        } => {
            check(sample_rate, channels)?;
            if !(duration.is_finite() && duration > 0.0) {
                anyhow::bail!("--duration must be positive");
            }
            println!(
                "Generating {}Hz tone ({:.2}s, {} channel(s))...",
                freq, duration, channels
            );
            let frames = (duration * sample_rate as f32) as usize;
            let mono = sine(freq, amplitude, sample_rate as f32, frames);
            write(&output, &interleave(&mono, channels), sample_rate, channels)
        }
        GenerateCommand::Impulse {
            output,
            length,
            sample_rate,
            amplitude,
            channels,
        } => {
            check(sample_rate, channels)?;
            println!("Generating impulse ({} frames)...", length);
            let mut mono = vec![0.0; length.max(1)];
            mono[0] = amplitude;
            write(&output, &interleave(&mono, channels), sample_rate, channels)
        }
    }
}

fn check(sample_rate: u32, channels: u16) -> anyhow::Result<()> {
    if sample_rate == 0 {
        anyhow::bail!("--sample-rate must be positive");
    }
    if channels == 0 {
        anyhow::bail!("--channels must be at least 1");
    }
    Ok(())
}

fn sine(freq: f32, amplitude: f32, sample_rate: f32, frames: usize) -> Vec<f32> {
    let step = 2.0 * PI * freq / sample_rate;
    (0..frames)
        .map(|i| amplitude * (step * i as f32).sin())
        .collect()
}

fn interleave(mono: &[f32], channels: u16) -> Vec<f32> {
    mono.iter()
        .flat_map(|&s| std::iter::repeat_n(s, usize::from(channels)))
        .collect()
}

fn write(
    path: &std::path::Path,
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> anyhow::Result<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
    };
    write_wav(path, samples, spec)?;
    println!("Saved to {}", path.display());
    Ok(())
}
