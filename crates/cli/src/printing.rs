use ribotherm_sim::dynamics::kelvin_to_celsius;
use ribotherm_sim::fitting::FitResult;
use ribotherm_sim::simulation::{ConsumerResourceConfig, GlvConfig};

fn temperature_span(kelvin: &[f64]) -> String {
    match (kelvin.first(), kelvin.last()) {
        (Some(&first), Some(&last)) => format!(
            "{} values, {:.1}–{:.1} °C",
            kelvin.len(),
            kelvin_to_celsius(first),
            kelvin_to_celsius(last)
        ),
        _ => "none".to_string(),
    }
}

fn print_seed(seed: Option<u64>) {
    match seed {
        Some(seed) => println!("  • Random Seed: {seed} [--seed]"),
        None => println!("  • Random Seed: Random [--seed]"),
    }
}

pub fn print_glv_parameters(config: &GlvConfig, p_values: &[f64]) {
    println!("\n📋 Lotka-Volterra Configuration");
    println!("  • Species: {} [-n, --species]", config.num_species);
    println!("  • Copy Numbers: 1..={}", config.max_copy_number);
    println!("  • p values: {p_values:?} [-p, --p-values]");
    println!("  • Temperatures: {}", temperature_span(&config.temperatures));
    println!("  • Duration: {} h [--duration]", config.duration);
    println!("  • Death Rate: {} [--death-rate]", config.death_rate);
    println!(
        "  • Competition: N({}, {})",
        config.competition_mean, config.competition_sd
    );
    println!(
        "  • Arrhenius: a = {:.1e}, G = {}",
        config.arrhenius.prefactor, config.arrhenius.activation
    );
    println!("  • Trials: {} [--trials]", config.num_trials);
    print_seed(config.seed);
    println!();
}

pub fn print_cr_parameters(config: &ConsumerResourceConfig) {
    println!("\n📋 Consumer-Resource Configuration");
    println!(
        "  • Species × Resources: {} × {} [-n, --species] [-r, --resources]",
        config.num_species, config.num_resources
    );
    println!("  • Temperatures: {}", temperature_span(&config.temperatures));
    println!("  • Supply: {:?}", config.supply_concentrations);
    println!("  • Duration: {} h [--duration]", config.duration);
    println!("  • Death Rate: {}", config.death_rate);
    println!(
        "  • Uptake Rates: U[{:.1e}, {:.1e})",
        config.uptake_range.0, config.uptake_range.1
    );
    println!("  • Trials: {} [--trials]", config.num_trials);
    print_seed(config.seed);
    println!();
}

pub fn print_fit_result(result: &FitResult, plot_p: Option<f64>, num_observations: usize) {
    println!("\n🎯 Fit Result ({num_observations} observations)");
    println!("  • Mean p: {:.4}", result.mean_p);
    println!("  • SD of p: {:.4}", result.sd_p);
    println!("  • Mean minimum RMS error: {:.4}", result.mean_min_error);
    if let Some(p) = plot_p {
        println!("  • Nearest simulated p: {p}");
    }
    println!();
}
