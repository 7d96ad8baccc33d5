use anyhow::{Context, Result, bail};
use ribotherm_sim::dynamics::kelvin_to_celsius;
use ribotherm_sim::simulation::{GlvConfig, SimulationGrid, inclusive_range};
use std::fs;
use std::path::Path;

use crate::args::SimulateGlvArgs;
use crate::printing::print_glv_parameters;
use crate::utils::progress_bar;

pub fn load_glv_config(path: Option<&Path>) -> Result<GlvConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))
        }
        None => Ok(GlvConfig::default()),
    }
}

fn p_values(args: &SimulateGlvArgs, config: &GlvConfig) -> Result<Vec<f64>> {
    if let Some(range) = &args.p_range {
        let &[start, end, step] = range.as_slice() else {
            bail!("--p-range takes exactly START END STEP");
        };
        if !(step > 0.0) || end < start {
            bail!("--p-range needs START <= END and a positive STEP");
        }
        return Ok(inclusive_range(start, end, step));
    }
    if args.p_values.is_empty() {
        Ok(vec![config.p])
    } else {
        Ok(args.p_values.clone())
    }
}

pub fn simulate_glv(args: &SimulateGlvArgs) -> Result<()> {
    println!("🦠 Ribotherm - Lotka-Volterra Simulation");
    println!("============================================");

    let mut config = load_glv_config(args.config.as_deref())?;
    if let Some(n) = args.species {
        config.num_species = n;
    }
    if let Some(n) = args.trials {
        config.num_trials = n;
    }
    if let Some(hours) = args.duration {
        config.duration = hours;
    }
    if let Some(delta) = args.death_rate {
        config.death_rate = delta;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let p_values = p_values(args, &config)?;
    for &p in &p_values {
        GlvConfig { p, ..config.clone() }
            .validate()
            .context("Invalid configuration")?;
    }

    print_glv_parameters(&config, &p_values);

    let total = (config.num_trials * p_values.len()) as u64;
    let pb = progress_bar(total, !args.no_progress)?;
    let on_trial_done = || {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    };

    let mut class_rows = Vec::new();
    let mut failed = 0;
    let grid = SimulationGrid::from_glv_sweep_with_progress(
        &config,
        &p_values,
        on_trial_done,
        |p, ensemble| {
            failed += ensemble.failures.len();
            if args.classes.is_some() {
                let classes = ensemble.mean_class_abundance();
                for (t, &kelvin) in ensemble.temperatures.iter().enumerate() {
                    let row: Vec<f64> = classes.iter().map(|class| class[t]).collect();
                    class_rows.push((p, kelvin_to_celsius(kelvin), row));
                }
            }
        },
    )
    .context("Simulation sweep failed")?;
    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    grid.write_csv(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("✓ Wrote {} grid entries to {}", grid.len(), args.output.display());
    if failed > 0 {
        println!("⚠️  {failed} trials failed and were excluded from the means");
    }

    if let Some(path) = &args.classes {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut header = vec!["p".to_string(), "Temperature".to_string()];
        header.extend((1..=config.max_copy_number).map(|c| format!("CN{c}")));
        writer.write_record(&header)?;
        for (p, celsius, row) in &class_rows {
            let mut record = vec![p.to_string(), celsius.to_string()];
            record.extend(row.iter().map(f64::to_string));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        println!("✓ Wrote copy-number class abundances to {}", path.display());
    }

    Ok(())
}
