//! Parameter listing command.

use super::common::{build_params, parse_key_val};
use clap::Args;
use ezfx_engine::Param;
use std::path::PathBuf;

#[derive(Args)]
pub struct ParamsArgs {
    /// Show values after applying this preset instead of defaults
    #[arg(short, long)]
    preset: Option<PathBuf>,

    /// Parameter overrides applied after the preset
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    param: Vec<(String, f32)>,
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let params = build_params(args.preset.as_deref(), &args.param)?;

    println!("Parameters\n");
    println!(
        "  {:<15} {:<14} {:>6}  {:<22} {:>14}",
        "Name", "Key", "ID", "Range", "Value"
    );
    println!("  {}", "-".repeat(75));

    for param in Param::ALL {
        let desc = param.descriptor();
        let range = if param.is_slope() {
            "12/24/36/48 dB/oct".to_string()
        } else {
            format!("{} - {}{}", desc.min, desc.max, desc.unit.suffix())
        };
        println!(
            "  {:<15} {:<14} {:>6}  {:<22} {:>14}",
            desc.name,
            desc.string_id,
            desc.id.0,
            range,
            param.format_value(params.get(param))
        );
    }

    Ok(())
}
