use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{error, info, warn};
use msd_to_midi::{batch, config::Args, inspect};
use std::fs;

fn main() -> Result<()> {
    let args = Args::parse();
    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let inputs = batch::inputs(&args.input)?;
    if inputs.is_empty() {
        warn!("No .msd files found in {}", args.input.display());
        return Ok(());
    }
    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let options = args.options();
    let mut failed = 0;
    for (number, input) in (1..).zip(&inputs) {
        let output = batch::output_path(input, args.output_dir.as_deref());
        match batch::convert_file(input, &output, &options) {
            Ok(smf) => {
                info!("{number}: {} -> {} ... OK", input.display(), output.display());
                if args.dump {
                    print_events(&smf);
                }
            }
            Err(e) => {
                failed += 1;
                error!("{number}: {} ... ERROR: {e:#}", input.display());
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} files failed to convert", inputs.len());
    }
    Ok(())
}

fn print_events(smf: &[u8]) {
    match inspect::describe(smf) {
        Ok(lines) => {
            for line in lines {
                info!("    {line}");
            }
        }
        Err(e) => warn!("Could not list events: {e:#}"),
    }
}
