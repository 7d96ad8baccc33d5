use anyhow::{Context, Result};
use ribotherm_analysis::CommunityMetricCalculator;
use ribotherm_analysis::io::{load_abundance_table, load_sample_metadata, save_sample_metadata};

use crate::args::MetricsArgs;

pub fn compute_metrics(args: &MetricsArgs) -> Result<()> {
    let table = load_abundance_table(&args.abundance)
        .with_context(|| format!("Failed to load abundance table {}", args.abundance.display()))?;
    let mut metadata = load_sample_metadata(&args.metadata)
        .with_context(|| format!("Failed to load metadata {}", args.metadata.display()))?;

    let metrics = CommunityMetricCalculator::new().compute(&table, &mut metadata);
    let undefined = metrics.iter().filter(|m| m.wmcn.is_none()).count();
    let missing = metadata.len() - metrics.len();

    save_sample_metadata(&metadata, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "✓ Computed metrics for {} samples ({} without a defined WMCN)",
        metrics.len(),
        undefined
    );
    if missing > 0 {
        println!("⚠️  {missing} metadata samples have no abundance column");
    }
    if !table.has_growth_rates() {
        println!("  • No Growth Rate column: WMGR columns skipped");
    }
    println!("✓ Wrote {}", args.output.display());
    Ok(())
}
