//! Linear consumer-resource model.
//!
//! State layout is `[X_0 .. X_{Ns-1}, C_0 .. C_{Nr-1}]`:
//!
//! ```text
//! dX_k/dt = X_k * (sum_j r[k, j] * C_j - delta)
//! dC_j/dt = delta * (C0_j - C_j) - C_j * sum_k r[k, j] * X_k
//! ```

use crate::dynamics::integrator::OdeSystem;
use nalgebra::DMatrix;

/// Consumer-resource right-hand side for one temperature and supply level.
#[derive(Debug, Clone)]
pub struct ConsumerResource {
    rates: DMatrix<f64>,
    death_rate: f64,
    supply: Vec<f64>,
}

impl ConsumerResource {
    /// `rates` is `N_s x N_r` (already temperature scaled); `supply` holds the
    /// supply concentration `C0_j` of every resource.
    ///
    /// # Panics
    /// Panics if `supply` does not have one entry per resource column.
    pub fn new(rates: DMatrix<f64>, death_rate: f64, supply: Vec<f64>) -> Self {
        assert_eq!(
            rates.ncols(),
            supply.len(),
            "rate matrix has {} resources but supply vector has {}",
            rates.ncols(),
            supply.len()
        );
        Self {
            rates,
            death_rate,
            supply,
        }
    }

    /// Uniform supply concentration for every resource.
    pub fn with_uniform_supply(rates: DMatrix<f64>, death_rate: f64, concentration: f64) -> Self {
        let supply = vec![concentration; rates.ncols()];
        Self::new(rates, death_rate, supply)
    }

    pub fn num_species(&self) -> usize {
        self.rates.nrows()
    }

    pub fn num_resources(&self) -> usize {
        self.rates.ncols()
    }

    pub fn supply(&self) -> &[f64] {
        &self.supply
    }

    /// Initial state: every species at `density`, resources at supply.
    pub fn initial_state(&self, density: f64) -> Vec<f64> {
        let mut state = vec![density; self.num_species()];
        state.extend_from_slice(&self.supply);
        state
    }
}

impl OdeSystem for ConsumerResource {
    fn dimension(&self) -> usize {
        self.num_species() + self.num_resources()
    }

    fn derivatives(&self, _t: f64, state: &[f64], out: &mut [f64]) {
        let ns = self.num_species();
        let (species, resources) = state.split_at(ns);
        let (d_species, d_resources) = out.split_at_mut(ns);

        for (k, (d, &x_k)) in d_species.iter_mut().zip(species).enumerate() {
            let intake: f64 = self
                .rates
                .row(k)
                .iter()
                .zip(resources)
                .map(|(r, c)| r * c)
                .sum();
            *d = x_k * (intake - self.death_rate);
        }

        for (j, ((d, &c_j), &c0_j)) in d_resources
            .iter_mut()
            .zip(resources)
            .zip(&self.supply)
            .enumerate()
        {
            let consumption: f64 = self
                .rates
                .column(j)
                .iter()
                .zip(species)
                .map(|(r, x)| r * x)
                .sum();
            *d = self.death_rate * (c0_j - c_j) - c_j * consumption;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::DormandPrince;

    #[test]
    fn test_derivative_matches_formula() {
        let rates = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        let model = ConsumerResource::new(rates, 0.1, vec![5.0, 6.0]);
        let state = [0.5, 0.25, 1.0, 2.0];
        let mut out = [0.0; 4];
        model.derivatives(0.0, &state, &mut out);

        assert!((out[0] - 0.5 * (1.0 * 1.0 + 2.0 * 2.0 - 0.1)).abs() < 1e-12);
        assert!((out[1] - 0.25 * (3.0 * 1.0 + 4.0 * 2.0 - 0.1)).abs() < 1e-12);
        assert!((out[2] - (0.1 * (5.0 - 1.0) - 1.0 * (1.0 * 0.5 + 3.0 * 0.25))).abs() < 1e-12);
        assert!((out[3] - (0.1 * (6.0 - 2.0) - 2.0 * (2.0 * 0.5 + 4.0 * 0.25))).abs() < 1e-12);
    }

    #[test]
    fn test_initial_state_layout() {
        let model = ConsumerResource::with_uniform_supply(DMatrix::zeros(3, 2), 0.1, 2.5);
        assert_eq!(model.dimension(), 5);
        assert_eq!(model.initial_state(0.1), vec![0.1, 0.1, 0.1, 2.5, 2.5]);
    }

    #[test]
    fn test_no_species_resources_relax_to_supply() {
        let model = ConsumerResource::with_uniform_supply(DMatrix::from_element(1, 2, 1.0), 0.5, 3.0);
        let sol = DormandPrince::default()
            .integrate(&model, (0.0, 60.0), &[0.0, 0.5, 1.0])
            .unwrap();
        assert_eq!(sol.y[0], 0.0);
        assert!((sol.y[1] - 3.0).abs() < 1e-3);
        assert!((sol.y[2] - 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_single_consumer_equilibrium() {
        // At equilibrium r * C* = delta, so C* = delta / r
        let model = ConsumerResource::with_uniform_supply(DMatrix::from_element(1, 1, 0.5), 0.1, 2.0);
        let sol = DormandPrince::default()
            .integrate(&model, (0.0, 1000.0), &model.initial_state(0.1))
            .unwrap();
        assert!((sol.y[1] - 0.2).abs() < 1e-2, "resource {}", sol.y[1]);
        assert!(sol.y[0] > 0.0);
    }

    #[test]
    #[should_panic(expected = "supply vector has")]
    fn test_supply_mismatch_panics() {
        let _ = ConsumerResource::new(DMatrix::zeros(2, 3), 0.1, vec![1.0]);
    }
}
