pub mod annotate;
pub mod fit;
pub mod metrics;
pub mod simulate_cr;
pub mod simulate_glv;
