//! Integration tests for ezfx-cli.
//!
//! Tests cover binary invocation and end-to-end file processing workflows.

use std::path::Path;
use std::process::Command;

/// Helper to get the path to the `ezfx` binary built by cargo.
fn ezfx_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ezfx"))
}

fn run_ok(args: &[&str]) -> String {
    let output = ezfx_bin()
        .args(args)
        .output()
        .expect("failed to run ezfx");
    assert!(
        output.status.success(),
        "ezfx {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn read_samples(path: &Path) -> (Vec<f32>, hound::WavSpec) {
    let reader = hound::WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader
        .into_samples::<f32>()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    (samples, spec)
}

// ---------------------------------------------------------------------------
// `ezfx params`
// ---------------------------------------------------------------------------

#[test]
fn cli_params_lists_every_parameter() {
    let stdout = run_ok(&["params"]);
    for name in [
        "LowCut Freq",
        "HighCut Freq",
        "Peak Freq",
        "Peak Gain",
        "Peak Width",
        "Reverb Value",
        "LowCut Slope",
        "HighCut Slope",
    ] {
        assert!(stdout.contains(name), "params listing should contain '{name}'");
    }
    assert!(stdout.contains("12 dB/oct"));
    assert!(stdout.contains("10000 Hz"));
}

#[test]
fn cli_params_rejects_unknown_override() {
    let output = ezfx_bin()
        .args(["params", "--param", "drive=3"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown parameter"));
}

// ---------------------------------------------------------------------------
// `ezfx preset`
// ---------------------------------------------------------------------------

#[test]
fn cli_preset_prints_toml() {
    let stdout = run_ok(&[
        "preset",
        "--name",
        "Bright",
        "--param",
        "highcut_slope=48",
        "--param",
        "peak_gain=3",
    ]);
    assert!(stdout.contains("name = \"Bright\""));
    assert!(stdout.contains("highcut_slope = 48"));
    assert!(stdout.contains("peak_gain = 3"));
}

#[test]
fn cli_preset_round_trips_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.toml");
    let second = dir.path().join("second.toml");

    run_ok(&[
        "preset",
        "--output",
        first.to_str().unwrap(),
        "--name",
        "Room",
        "--param",
        "reverb_value=30",
        "--param",
        "lowcut_slope=24",
    ]);
    run_ok(&[
        "preset",
        "--from",
        first.to_str().unwrap(),
        "--output",
        second.to_str().unwrap(),
        "--name",
        "Room",
    ]);

    assert_eq!(
        std::fs::read_to_string(&first).unwrap(),
        std::fs::read_to_string(&second).unwrap()
    );
}

// ---------------------------------------------------------------------------
// `ezfx generate` + `ezfx process`
// ---------------------------------------------------------------------------

#[test]
fn cli_generate_tone() {
    let dir = tempfile::tempdir().unwrap();
    let tone = dir.path().join("tone.wav");
    run_ok(&[
        "generate",
        "tone",
        tone.to_str().unwrap(),
        "--duration",
        "0.5",
        "--sample-rate",
        "44100",
    ]);

    let (samples, spec) = read_samples(&tone);
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(samples.len(), 2 * 22050);
}

#[test]
fn cli_process_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");

    run_ok(&[
        "generate",
        "tone",
        input.to_str().unwrap(),
        "--duration",
        "0.25",
        "--freq",
        "1000",
    ]);
    let stdout = run_ok(&[
        "process",
        input.to_str().unwrap(),
        output.to_str().unwrap(),
        "--param",
        "reverb_value=50",
        "--param",
        "peak_gain=-6",
        "--block-size",
        "256",
    ]);

    assert!(stdout.contains("Post-EQ analyzer"));
    assert!(stdout.contains("Right"));

    let (in_samples, _) = read_samples(&input);
    let (out_samples, spec) = read_samples(&output);
    assert_eq!(spec.channels, 2);
    assert_eq!(out_samples.len(), in_samples.len());
    assert!(out_samples.iter().all(|x| x.is_finite()));
    assert_ne!(out_samples, in_samples);
}

#[test]
fn cli_process_tail_extends_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("impulse.wav");
    let output = dir.path().join("wet.wav");

    run_ok(&[
        "generate",
        "impulse",
        input.to_str().unwrap(),
        "--length",
        "4800",
        "--channels",
        "1",
    ]);

    let preset = dir.path().join("hall.toml");
    std::fs::write(
        &preset,
        "name = \"Hall\"\n[params]\nreverb_value = 90.0\n",
    )
    .unwrap();

    run_ok(&[
        "process",
        input.to_str().unwrap(),
        output.to_str().unwrap(),
        "--preset",
        preset.to_str().unwrap(),
        "--tail",
        "0.5",
    ]);

    let (samples, spec) = read_samples(&output);
    assert_eq!(spec.channels, 1);
    assert_eq!(samples.len(), 4800 + 24000);
    assert!(samples[4800..].iter().any(|x| x.abs() > 1e-6));
}

#[test]
fn cli_process_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = ezfx_bin()
        .args([
            "process",
            dir.path().join("missing.wav").to_str().unwrap(),
            dir.path().join("out.wav").to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
