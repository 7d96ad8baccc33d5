use anyhow::{Context, Result};
use ribotherm_sim::dynamics::kelvin_to_celsius;
use ribotherm_sim::simulation::{ConsumerResourceConfig, run_consumer_resource_with_progress};
use std::fs;
use std::path::Path;

use crate::args::SimulateCrArgs;
use crate::printing::print_cr_parameters;
use crate::utils::{format_optional, progress_bar};

pub fn load_cr_config(path: Option<&Path>) -> Result<ConsumerResourceConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))
        }
        None => Ok(ConsumerResourceConfig::default()),
    }
}

pub fn simulate_cr(args: &SimulateCrArgs) -> Result<()> {
    println!("🦠 Ribotherm - Consumer-Resource Simulation");
    println!("============================================");

    let mut config = load_cr_config(args.config.as_deref())?;
    if let Some(n) = args.species {
        config.num_species = n;
    }
    if let Some(n) = args.resources {
        config.num_resources = n;
    }
    if let Some(n) = args.trials {
        config.num_trials = n;
    }
    if let Some(hours) = args.duration {
        config.duration = hours;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate().context("Invalid configuration")?;

    print_cr_parameters(&config);

    let pb = progress_bar(config.num_trials as u64, !args.no_progress)?;
    let ensemble = run_consumer_resource_with_progress(&config, || {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    })
    .context("Simulation failed")?;
    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    writer.write_record(["Supply", "Temperature", "WMGR"])?;
    for (supply, row) in ensemble
        .supply_concentrations
        .iter()
        .zip(ensemble.mean_wmgr())
    {
        for (&kelvin, wmgr) in ensemble.temperatures.iter().zip(row) {
            writer.write_record([
                supply.to_string(),
                kelvin_to_celsius(kelvin).to_string(),
                format_optional(wmgr),
            ])?;
        }
    }
    writer.flush()?;

    println!(
        "✓ Wrote mean WMGR for {} supply levels × {} temperatures to {}",
        ensemble.supply_concentrations.len(),
        ensemble.temperatures.len(),
        args.output.display()
    );
    if !ensemble.failures.is_empty() {
        println!(
            "⚠️  {} trials failed and were excluded from the means",
            ensemble.failures.len()
        );
    }
    Ok(())
}
