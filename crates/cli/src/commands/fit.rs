use anyhow::{Context, Result, bail};
use ribotherm_analysis::SampleMetadata;
use ribotherm_analysis::io::load_sample_metadata;
use ribotherm_sim::fitting::{BootstrapConfig, BootstrapFitter, Observation, round_to_nearest};
use ribotherm_sim::simulation::SimulationGrid;
use std::fs;

use crate::args::FitArgs;
use crate::printing::print_fit_result;
use crate::utils::format_optional;

fn parse_filters(filters: &[String]) -> Result<Vec<(&str, &str)>> {
    filters
        .iter()
        .map(|f| match f.split_once('=') {
            Some((column, value)) => Ok((column.trim(), value.trim())),
            None => bail!("Filter '{f}' must be COLUMN=VALUE"),
        })
        .collect()
}

/// Samples passing the filters that have both a temperature and a value in
/// `column`.
pub fn collect_observations(
    metadata: &SampleMetadata,
    column: &str,
    sample_contains: Option<&str>,
    filters: &[(&str, &str)],
) -> Result<Vec<Observation>> {
    let mut observations = Vec::new();
    for sample in metadata.samples() {
        if sample_contains.is_some_and(|s| !sample.contains(s)) {
            continue;
        }
        if !filters
            .iter()
            .all(|&(c, v)| metadata.text(sample, c).is_some_and(|t| t.trim() == v))
        {
            continue;
        }
        let (Some(temperature), Some(wmcn)) =
            (metadata.temperature(sample), metadata.metric(sample, column))
        else {
            continue;
        };
        observations.push(Observation::new(sample.clone(), wmcn, temperature)?);
    }
    Ok(observations)
}

pub fn fit_p(args: &FitArgs) -> Result<()> {
    println!("📈 Ribotherm - Bootstrap Fit of p");
    println!("============================================");

    let grid = SimulationGrid::read_csv(&args.grid)
        .with_context(|| format!("Failed to load grid {}", args.grid.display()))?;
    let metadata = load_sample_metadata(&args.metadata)
        .with_context(|| format!("Failed to load metadata {}", args.metadata.display()))?;
    if !metadata.has_metric_column(&args.column) {
        bail!("Metadata has no '{}' column", args.column);
    }

    let filters = parse_filters(&args.filter)?;
    let observations = collect_observations(
        &metadata,
        &args.column,
        args.sample_contains.as_deref(),
        &filters,
    )?;
    if observations.is_empty() {
        bail!("No samples with both Temperature and {}", args.column);
    }
    println!(
        "✓ {} observations, {} grid entries",
        observations.len(),
        grid.len()
    );

    let candidates = if args.candidates.is_empty() {
        grid.p_values()
    } else {
        args.candidates.clone()
    };
    let mut config = BootstrapConfig::new(args.replicates, args.seed);
    if let Some(n) = args.sample_size {
        config = config.with_sample_size(n);
    }
    let fitter = BootstrapFitter::new(&grid, candidates, config)?;
    let result = fitter.fit(&observations).context("Fit failed")?;
    let plot_p = round_to_nearest(result.mean_p, fitter.candidates());

    print_fit_result(&result, plot_p, observations.len());

    if let (Some(path), Some(p)) = (&args.curve, plot_p) {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writer.write_record(["Sample", "Temperature", "Observed", "Predicted"])?;
        for obs in &observations {
            writer.write_record([
                obs.sample.clone(),
                obs.temperature.to_string(),
                obs.wmcn.to_string(),
                format_optional(grid.get(obs.temperature, p)),
            ])?;
        }
        writer.flush()?;
        println!("✓ Wrote fitted curve to {}", path.display());
    }

    if let Some(path) = &args.json {
        let summary = serde_json::json!({
            "mean_p": result.mean_p,
            "sd_p": result.sd_p,
            "mean_min_error": result.mean_min_error,
            "nearest_p": plot_p,
            "num_observations": observations.len(),
            "num_replicates": args.replicates,
        });
        fs::write(path, serde_json::to_string_pretty(&summary)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("✓ Wrote fit summary to {}", path.display());
    }

    Ok(())
}
