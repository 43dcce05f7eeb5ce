//! Preset writing command.

use super::common::{build_params, parse_key_val};
use clap::Args;
use ezfx_engine::Preset;
use std::path::PathBuf;

#[derive(Args)]
pub struct PresetArgs {
    /// Output TOML file; prints to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Preset name
    #[arg(short, long, default_value = "Untitled")]
    name: String,

    /// Optional description
    #[arg(short, long)]
    description: Option<String>,

    /// Start from an existing preset
    #[arg(long)]
    from: Option<PathBuf>,

    /// Parameter overrides (e.g., "reverb_value=30")
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    param: Vec<(String, f32)>,
}

pub fn run(args: PresetArgs) -> anyhow::Result<()> {
    let params = build_params(args.from.as_deref(), &args.param)?;

    let mut preset = Preset::from_params(args.name, &params);
    if let Some(description) = args.description {
        preset = preset.with_description(description);
    }

    match &args.output {
        Some(path) => {
            preset.save(path)?;
            println!("Saved preset '{}' to {}", preset.name, path.display());
        }
        None => print!("{}", preset.to_toml_string()?),
    }

    Ok(())
}
