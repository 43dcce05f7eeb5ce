//! Criterion benchmarks for the ezfx processing path
//!
//! Run with: cargo bench -p ezfx-engine
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ezfx_effects::{ChainCoefficients, ChainSettings};
use ezfx_engine::{ChannelLayout, EffectProcessor, SharedParams};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn configured(block_size: usize) -> EffectProcessor {
    let mut fx = EffectProcessor::new(SharedParams::new(), ChannelLayout::Stereo);
    fx.prepare(SAMPLE_RATE, block_size);
    for (name, value) in [
        ("LowCut Freq", 80.0),
        ("LowCut Slope", 48.0),
        ("Peak Gain", 4.0),
        ("HighCut Freq", 8000.0),
        ("HighCut Slope", 48.0),
        ("Reverb Value", 40.0),
    ] {
        let _ = fx.set_parameter(name, value);
    }
    fx
}

fn bench_planar(c: &mut Criterion) {
    let mut group = c.benchmark_group("Processor/planar");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        let mut fx = configured(block_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let mut left = input.clone();
                let mut right = input.clone();
                b.iter(|| {
                    left.copy_from_slice(&input);
                    right.copy_from_slice(&input);
                    fx.process(&mut [&mut left[..], &mut right[..]]);
                    black_box(left[0])
                })
            },
        );
    }

    group.finish();
}

fn bench_interleaved(c: &mut Criterion) {
    let mut group = c.benchmark_group("Processor/interleaved");

    for &block_size in BLOCK_SIZES {
        let input: Vec<f32> = generate_test_signal(block_size)
            .into_iter()
            .flat_map(|s| [s, s])
            .collect();
        let mut fx = configured(block_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let mut buffer = input.clone();
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    fx.process_interleaved(&mut buffer, 2);
                    black_box(buffer[0])
                })
            },
        );
    }

    group.finish();
}

fn bench_coefficient_design(c: &mut Criterion) {
    let settings = ChainSettings {
        lowcut_slope: ezfx_core::Slope::Db48,
        highcut_slope: ezfx_core::Slope::Db48,
        ..ChainSettings::default()
    };
    c.bench_function("ChainCoefficients/design", |b| {
        b.iter(|| black_box(ChainCoefficients::design(black_box(&settings), SAMPLE_RATE)))
    });
}

criterion_group!(benches, bench_planar, bench_interleaved, bench_coefficient_design);
criterion_main!(benches);
