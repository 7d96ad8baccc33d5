use anyhow::{Context, Result};
use ribotherm_analysis::io::{
    load_abundance_table, load_reference_table, save_abundance_table, write_unresolved,
};
use ribotherm_analysis::taxonomy::{ResolverConfig, TaxonomicCopyNumberResolver};
use std::fs::File;
use std::io::BufWriter;

use crate::args::AnnotateArgs;

pub fn annotate(args: &AnnotateArgs) -> Result<()> {
    let reference = load_reference_table(&args.reference)
        .with_context(|| format!("Failed to load reference {}", args.reference.display()))?;
    let mut table = load_abundance_table(&args.abundance)
        .with_context(|| format!("Failed to load abundance table {}", args.abundance.display()))?;

    let config = if args.no_species {
        ResolverConfig::without_species()
    } else {
        ResolverConfig::default()
    };
    let report = TaxonomicCopyNumberResolver::new(&reference, config).annotate(&mut table);

    save_abundance_table(&table, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "✓ Resolved {} of {} OTUs ({} ambiguous)",
        report.resolved,
        report.total(),
        report.ambiguous()
    );
    for (rank, count) in &report.by_rank {
        println!("  • {rank}: {count}");
    }
    println!("✓ Wrote annotated table to {}", args.output.display());

    if let Some(path) = &args.unresolved {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_unresolved(&report, BufWriter::new(file))?;
        println!("✓ Wrote {} unresolved OTUs to {}", report.unresolved.len(), path.display());
    }
    Ok(())
}
