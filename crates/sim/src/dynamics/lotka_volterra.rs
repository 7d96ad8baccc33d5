//! Generalized Lotka-Volterra competition.
//!
//! For species `k`:
//!
//! ```text
//! dX_k/dt = X_k * (r_k * (1 - sum_j alpha[k, j] * X_j) - delta)
//! ```

use crate::dynamics::integrator::OdeSystem;
use crate::traits::CompetitionMatrix;

/// GLV right-hand side for one temperature of one trial.
#[derive(Debug, Clone)]
pub struct LotkaVolterra<'a> {
    growth_rates: Vec<f64>,
    alpha: &'a CompetitionMatrix,
    death_rate: f64,
}

impl<'a> LotkaVolterra<'a> {
    /// # Panics
    /// Panics if `growth_rates` and `alpha` disagree on the species count.
    pub fn new(growth_rates: Vec<f64>, alpha: &'a CompetitionMatrix, death_rate: f64) -> Self {
        assert_eq!(
            growth_rates.len(),
            alpha.len(),
            "growth-rate vector has {} species but competition matrix has {}",
            growth_rates.len(),
            alpha.len()
        );
        Self {
            growth_rates,
            alpha,
            death_rate,
        }
    }

    pub fn growth_rates(&self) -> &[f64] {
        &self.growth_rates
    }

    pub fn death_rate(&self) -> f64 {
        self.death_rate
    }
}

impl OdeSystem for LotkaVolterra<'_> {
    fn dimension(&self) -> usize {
        self.growth_rates.len()
    }

    fn derivatives(&self, _t: f64, state: &[f64], out: &mut [f64]) {
        // Competition sums accumulated column by column (column-major storage)
        out.fill(0.0);
        let alpha = self.alpha.as_matrix();
        for (j, &x_j) in state.iter().enumerate() {
            for (acc, a_kj) in out.iter_mut().zip(alpha.column(j).iter()) {
                *acc += a_kj * x_j;
            }
        }
        for ((d, &x_k), &r_k) in out.iter_mut().zip(state).zip(&self.growth_rates) {
            *d = x_k * (r_k * (1.0 - *d) - self.death_rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::DormandPrince;
    use nalgebra::DMatrix;

    #[test]
    fn test_derivative_matches_formula() {
        let alpha = CompetitionMatrix::from_matrix(DMatrix::from_row_slice(
            2,
            2,
            &[1.0, 0.5, 0.25, 1.0],
        ));
        let glv = LotkaVolterra::new(vec![2.0, 3.0], &alpha, 0.1);
        let x = [0.2, 0.4];
        let mut out = [0.0; 2];
        glv.derivatives(0.0, &x, &mut out);

        let expected0 = 0.2 * (2.0 * (1.0 - (0.2 + 0.5 * 0.4)) - 0.1);
        let expected1 = 0.4 * (3.0 * (1.0 - (0.25 * 0.2 + 0.4)) - 0.1);
        assert!((out[0] - expected0).abs() < 1e-12);
        assert!((out[1] - expected1).abs() < 1e-12);
    }

    #[test]
    fn test_single_species_reaches_carrying_capacity() {
        let alpha = CompetitionMatrix::identity(1);
        let glv = LotkaVolterra::new(vec![0.5], &alpha, 0.0);
        let solver = DormandPrince::default();

        let mut previous = 0.01;
        for end in [5.0, 10.0, 20.0, 40.0, 80.0] {
            let sol = solver.integrate(&glv, (0.0, end), &[0.01]).unwrap();
            assert!(sol.y[0] >= previous - 1e-9, "abundance must not decrease");
            assert!(sol.y[0] <= 1.0 + 1e-3);
            previous = sol.y[0];
        }
        assert!((previous - 1.0).abs() < 1e-3, "final abundance {previous}");
    }

    #[test]
    fn test_extinct_species_stays_extinct() {
        let alpha = CompetitionMatrix::identity(2);
        let glv = LotkaVolterra::new(vec![1.0, 1.0], &alpha, 0.0);
        let sol = DormandPrince::default()
            .integrate(&glv, (0.0, 50.0), &[0.0, 0.1])
            .unwrap();
        assert_eq!(sol.y[0], 0.0);
        assert!((sol.y[1] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_death_rate_lowers_equilibrium() {
        // r (1 - X) = delta  =>  X* = 1 - delta / r
        let alpha = CompetitionMatrix::identity(1);
        let glv = LotkaVolterra::new(vec![0.5], &alpha, 0.1);
        let sol = DormandPrince::default()
            .integrate(&glv, (0.0, 200.0), &[0.01])
            .unwrap();
        assert!((sol.y[0] - 0.8).abs() < 1e-3);
    }

    #[test]
    #[should_panic(expected = "competition matrix has")]
    fn test_mismatched_lengths_panic() {
        let alpha = CompetitionMatrix::identity(3);
        let _ = LotkaVolterra::new(vec![1.0, 1.0], &alpha, 0.0);
    }
}
