//! Adaptive explicit Runge-Kutta integration.
//!
//! Implements the Dormand-Prince 5(4) pair with local extrapolation and the
//! standard step-size controller (safety 0.9, step factor clamped to
//! [0.2, 10]). Tolerances default to `rtol = 1e-3`, `atol = 1e-6`.
//!
//! Only the state at the end of the span is kept: the simulations here need
//! near-equilibrium abundances, not trajectories.

use crate::errors::IntegrationError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Right-hand side of an autonomous or non-autonomous ODE system.
pub trait OdeSystem {
    /// Length of the state vector.
    fn dimension(&self) -> usize;

    /// Write `dy/dt` at `(t, state)` into `out`.
    ///
    /// Both slices have length `dimension()`.
    fn derivatives(&self, t: f64, state: &[f64], out: &mut [f64]);
}

/// Tolerances and budgets for one integration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegratorOptions {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
    /// Maximum number of attempted steps
    pub max_steps: usize,
    /// Optional wall-clock budget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
}

impl Default for IntegratorOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-3,
            atol: 1e-6,
            max_steps: 1_000_000,
            timeout: None,
        }
    }
}

/// Final state of a successful integration.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Time reached (equals the end of the span)
    pub t: f64,
    /// State at `t`
    pub y: Vec<f64>,
    /// Accepted steps
    pub accepted_steps: usize,
    /// Rejected steps
    pub rejected_steps: usize,
    /// Right-hand-side evaluations
    pub evaluations: usize,
}

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

const C: [f64; 6] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0];

const A: [[f64; 5]; 6] = [
    [0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
    ],
];

const B: [f64; 6] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];

// Difference between the 5th and embedded 4th order weights; the last entry
// multiplies the derivative at the new point (FSAL stage).
const E: [f64; 7] = [
    -71.0 / 57600.0,
    0.0,
    71.0 / 16695.0,
    -71.0 / 1920.0,
    17253.0 / 339200.0,
    -22.0 / 525.0,
    1.0 / 40.0,
];

/// Dormand-Prince 5(4) integrator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DormandPrince {
    options: IntegratorOptions,
}

/// Root-mean-square norm of `values[i] / scale[i]`.
fn scaled_rms(values: impl Iterator<Item = f64>, scale: &[f64]) -> f64 {
    let n = scale.len();
    if n == 0 {
        return 0.0;
    }
    let sum: f64 = values
        .zip(scale)
        .map(|(v, s)| {
            let r = v / s;
            r * r
        })
        .sum();
    (sum / n as f64).sqrt()
}

impl DormandPrince {
    pub fn new(options: IntegratorOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IntegratorOptions {
        &self.options
    }

    /// Integrate `system` from `y0` over `[t0, t1]`.
    ///
    /// # Panics
    /// Panics if `y0.len()` differs from `system.dimension()`.
    ///
    /// # Errors
    /// Returns an [`IntegrationError`] if the span is invalid, the state
    /// becomes non-finite, the step size underflows, or a step/time budget is
    /// exhausted.
    pub fn integrate<S: OdeSystem + ?Sized>(
        &self,
        system: &S,
        (t0, t1): (f64, f64),
        y0: &[f64],
    ) -> Result<Solution, IntegrationError> {
        let n = system.dimension();
        assert_eq!(
            y0.len(),
            n,
            "initial state has length {} but system dimension is {}",
            y0.len(),
            n
        );
        if !(t1 > t0) || !t0.is_finite() || !t1.is_finite() {
            return Err(IntegrationError::InvalidSpan { t0, t1 });
        }

        let opts = &self.options;
        let started = Instant::now();

        let mut t = t0;
        let mut y = y0.to_vec();
        let mut f = vec![0.0; n];
        system.derivatives(t, &y, &mut f);
        let mut evaluations = 1;
        if f.iter().any(|v| !v.is_finite()) {
            return Err(IntegrationError::NonFinite { t });
        }

        let mut h_abs = self.initial_step(system, t, &y, &f, t1 - t0, &mut evaluations);

        // Stage derivatives k[0..6] plus the derivative at the new point
        let mut k = vec![vec![0.0; n]; 7];
        let mut y_stage = vec![0.0; n];
        let mut y_new = vec![0.0; n];
        let mut scale = vec![0.0; n];

        let mut accepted_steps = 0;
        let mut rejected_steps = 0;
        let mut attempts = 0;

        while t < t1 {
            if attempts >= opts.max_steps {
                return Err(IntegrationError::MaxStepsExceeded {
                    t,
                    steps: opts.max_steps,
                });
            }
            if let Some(limit) = opts.timeout {
                if started.elapsed() >= limit {
                    return Err(IntegrationError::Timeout { t, limit });
                }
            }

            let min_step = 10.0 * (next_up(t) - t).abs();
            if h_abs > t1 - t {
                h_abs = t1 - t;
            }

            let mut step_rejected = false;
            loop {
                attempts += 1;
                if h_abs < min_step {
                    return Err(IntegrationError::StepSizeUnderflow { t, h: h_abs });
                }
                if attempts > opts.max_steps {
                    return Err(IntegrationError::MaxStepsExceeded {
                        t,
                        steps: opts.max_steps,
                    });
                }

                let mut t_new = t + h_abs;
                if t_new >= t1 - min_step {
                    t_new = t1;
                }
                let h = t_new - t;

                k[0].copy_from_slice(&f);
                for s in 1..6 {
                    for i in 0..n {
                        let mut acc = 0.0;
                        for (j, a) in A[s][..s].iter().enumerate() {
                            acc += a * k[j][i];
                        }
                        y_stage[i] = y[i] + h * acc;
                    }
                    system.derivatives(t + C[s] * h, &y_stage, &mut k[s]);
                }
                for i in 0..n {
                    let mut acc = 0.0;
                    for (j, b) in B.iter().enumerate() {
                        acc += b * k[j][i];
                    }
                    y_new[i] = y[i] + h * acc;
                }
                system.derivatives(t_new, &y_new, &mut k[6]);
                evaluations += 6;

                for i in 0..n {
                    scale[i] = opts.atol + y[i].abs().max(y_new[i].abs()) * opts.rtol;
                }
                let error_norm = scaled_rms(
                    (0..n).map(|i| h * E.iter().enumerate().map(|(j, e)| e * k[j][i]).sum::<f64>()),
                    &scale,
                );

                if error_norm < 1.0 {
                    let mut factor = if error_norm == 0.0 {
                        MAX_FACTOR
                    } else {
                        MAX_FACTOR.min(SAFETY * error_norm.powf(ERROR_EXPONENT))
                    };
                    if step_rejected {
                        factor = factor.min(1.0);
                    }
                    if y_new.iter().any(|v| !v.is_finite())
                        || k[6].iter().any(|v| !v.is_finite())
                    {
                        return Err(IntegrationError::NonFinite { t: t_new });
                    }

                    t = t_new;
                    y.copy_from_slice(&y_new);
                    f.copy_from_slice(&k[6]);
                    h_abs *= factor;
                    accepted_steps += 1;
                    break;
                }

                // NaN error norms fall through here and shrink the step
                h_abs *= MIN_FACTOR.max(SAFETY * error_norm.powf(ERROR_EXPONENT));
                step_rejected = true;
                rejected_steps += 1;
            }
        }

        Ok(Solution {
            t,
            y,
            accepted_steps,
            rejected_steps,
            evaluations,
        })
    }

    /// Empirical initial step (Hairer, Norsett & Wanner, sec. II.4).
    fn initial_step<S: OdeSystem + ?Sized>(
        &self,
        system: &S,
        t0: f64,
        y0: &[f64],
        f0: &[f64],
        span: f64,
        evaluations: &mut usize,
    ) -> f64 {
        let opts = &self.options;
        let scale: Vec<f64> = y0.iter().map(|y| opts.atol + y.abs() * opts.rtol).collect();
        let d0 = scaled_rms(y0.iter().copied(), &scale);
        let d1 = scaled_rms(f0.iter().copied(), &scale);

        let h0 = if d0 < 1e-5 || d1 < 1e-5 {
            1e-6
        } else {
            0.01 * d0 / d1
        }
        .min(span);

        let y1: Vec<f64> = y0.iter().zip(f0).map(|(y, f)| y + h0 * f).collect();
        let mut f1 = vec![0.0; y0.len()];
        system.derivatives(t0 + h0, &y1, &mut f1);
        *evaluations += 1;

        let d2 = scaled_rms(f1.iter().zip(f0).map(|(a, b)| a - b), &scale) / h0;

        let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / d1.max(d2)).powf(-ERROR_EXPONENT)
        };

        let h = (100.0 * h0).min(h1).min(span);
        if h.is_finite() && h > 0.0 { h } else { h0 }
    }
}

/// Smallest representable `f64` greater than `x` (for finite `x`).
fn next_up(x: f64) -> f64 {
    if x.is_nan() || x == f64::INFINITY {
        return x;
    }
    if x == 0.0 {
        return f64::from_bits(1);
    }
    let bits = x.to_bits();
    let next = if x > 0.0 { bits + 1 } else { bits - 1 };
    f64::from_bits(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// dy/dt = -y, y(0) = 1
    struct Decay;

    impl OdeSystem for Decay {
        fn dimension(&self) -> usize {
            1
        }

        fn derivatives(&self, _t: f64, state: &[f64], out: &mut [f64]) {
            out[0] = -state[0];
        }
    }

    /// dy/dt = y^2 blows up at t = 1 for y(0) = 1
    struct BlowUp;

    impl OdeSystem for BlowUp {
        fn dimension(&self) -> usize {
            1
        }

        fn derivatives(&self, _t: f64, state: &[f64], out: &mut [f64]) {
            out[0] = state[0] * state[0];
        }
    }

    /// Harmonic oscillator x'' = -x
    struct Oscillator;

    impl OdeSystem for Oscillator {
        fn dimension(&self) -> usize {
            2
        }

        fn derivatives(&self, _t: f64, state: &[f64], out: &mut [f64]) {
            out[0] = state[1];
            out[1] = -state[0];
        }
    }

    fn tight() -> IntegratorOptions {
        IntegratorOptions {
            rtol: 1e-9,
            atol: 1e-12,
            ..Default::default()
        }
    }

    #[test]
    fn test_exponential_decay() {
        let sol = DormandPrince::new(tight())
            .integrate(&Decay, (0.0, 5.0), &[1.0])
            .unwrap();
        assert_eq!(sol.t, 5.0);
        assert!((sol.y[0] - (-5.0f64).exp()).abs() < 1e-8);
        assert!(sol.accepted_steps > 0);
    }

    #[test]
    fn test_default_tolerances_are_loose_but_close() {
        let sol = DormandPrince::default()
            .integrate(&Decay, (0.0, 2.0), &[1.0])
            .unwrap();
        assert!((sol.y[0] - (-2.0f64).exp()).abs() < 1e-3);
    }

    #[test]
    fn test_oscillator_full_period() {
        let period = 2.0 * std::f64::consts::PI;
        let sol = DormandPrince::new(tight())
            .integrate(&Oscillator, (0.0, period), &[1.0, 0.0])
            .unwrap();
        assert!((sol.y[0] - 1.0).abs() < 1e-6);
        assert!(sol.y[1].abs() < 1e-6);
    }

    #[test]
    fn test_blow_up_is_reported() {
        let result = DormandPrince::default().integrate(&BlowUp, (0.0, 2.0), &[1.0]);
        assert!(
            matches!(
                result,
                Err(IntegrationError::StepSizeUnderflow { .. })
                    | Err(IntegrationError::NonFinite { .. })
                    | Err(IntegrationError::MaxStepsExceeded { .. })
            ),
            "got {result:?}"
        );
    }

    #[test]
    fn test_step_budget() {
        let opts = IntegratorOptions {
            max_steps: 3,
            ..tight()
        };
        let result = DormandPrince::new(opts).integrate(&Oscillator, (0.0, 100.0), &[1.0, 0.0]);
        assert!(matches!(
            result,
            Err(IntegrationError::MaxStepsExceeded { steps: 3, .. })
        ));
    }

    #[test]
    fn test_zero_timeout_fails_fast() {
        let opts = IntegratorOptions {
            timeout: Some(Duration::ZERO),
            ..tight()
        };
        let result = DormandPrince::new(opts).integrate(&Oscillator, (0.0, 100.0), &[1.0, 0.0]);
        assert!(matches!(result, Err(IntegrationError::Timeout { .. })));
    }

    #[test]
    fn test_invalid_span() {
        let result = DormandPrince::default().integrate(&Decay, (1.0, 1.0), &[1.0]);
        assert!(matches!(result, Err(IntegrationError::InvalidSpan { .. })));
    }

    #[test]
    #[should_panic(expected = "system dimension")]
    fn test_dimension_mismatch_panics() {
        let _ = DormandPrince::default().integrate(&Oscillator, (0.0, 1.0), &[1.0]);
    }

    #[test]
    fn test_zero_state_stays_zero() {
        let sol = DormandPrince::default()
            .integrate(&Decay, (0.0, 10.0), &[0.0])
            .unwrap();
        assert_eq!(sol.y[0], 0.0);
    }

    #[test]
    fn test_next_up() {
        assert!(next_up(1.0) > 1.0);
        assert!(next_up(-1.0) > -1.0);
        assert!(next_up(0.0) > 0.0);
    }
}
