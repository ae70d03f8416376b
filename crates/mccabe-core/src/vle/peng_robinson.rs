//! # Peng-Robinson Equation of State (binary)
//!
//! Cubic equation of state with the quadratic (van der Waals one-fluid)
//! mixing rule:
//!
//! ```text
//! P = RT/(v - b) - a(T) / (v(v + b) + b(v - b))
//!
//! a_i = 0.45724 R² Tc² / Pc · [1 + κ(1 - √Tr)]²
//! b_i = 0.07780 R Tc / Pc
//! κ   = 0.37464 + 1.54226 ω - 0.26992 ω²
//! a   = Σ Σ z_i z_j √(a_i a_j) (1 - k_ij)
//! b   = Σ z_i b_i
//! ```
//!
//! Bubble points are found by successive substitution on K = φ_L / φ_V
//! starting from Wilson's correlation.

use super::component::Component;
use crate::solver::{Bisection, RootFinder, Secant};
use crate::types::{ensure_finite, ensure_fraction, ConfigError, McCabeError, McCabeResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, SQRT_2};

/// Molar gas constant [J/(mol K)].
pub const GAS_CONSTANT: f64 = 8.314_462_618;

const OMEGA_A: f64 = 0.45724;
const OMEGA_B: f64 = 0.07780;

/// Iteration cap for successive substitution.
const MAX_BUBBLE_ITERATIONS: usize = 500;
/// Convergence tolerance on Σ K x - 1 and on vapor mole fractions.
const BUBBLE_TOLERANCE: f64 = 1e-10;

/// Which cubic root to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Liquid,
    Vapor,
}

/// A converged bubble point. Mole fractions refer to the first component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BubblePoint {
    /// Temperature [K].
    pub temperature: f64,
    /// Pressure [Pa].
    pub pressure: f64,
    /// Liquid mole fraction.
    pub x: f64,
    /// Vapor mole fraction.
    pub y: f64,
}

/// Real roots of z³ + c2 z² + c1 z + c0 = 0, ascending.
#[must_use]
pub fn cubic_roots(c2: f64, c1: f64, c0: f64) -> Vec<f64> {
    let p = c1 - c2 * c2 / 3.0;
    let q = 2.0 * c2.powi(3) / 27.0 - c2 * c1 / 3.0 + c0;
    let discriminant = (q / 2.0).powi(2) + (p / 3.0).powi(3);
    let shift = c2 / 3.0;

    let mut roots = if discriminant > 0.0 {
        let s = discriminant.sqrt();
        vec![(-q / 2.0 + s).cbrt() + (-q / 2.0 - s).cbrt() - shift]
    } else if p == 0.0 {
        vec![-shift]
    } else {
        let r = (-p / 3.0).sqrt();
        let phi = ((-q / 2.0) / r.powi(3)).clamp(-1.0, 1.0).acos();
        (0..3)
            .map(|k: i32| 2.0 * r * ((phi + 2.0 * PI * f64::from(k)) / 3.0).cos() - shift)
            .collect()
    };
    roots.sort_by(f64::total_cmp);
    roots
}

/// Wilson estimate of a pure-component vapor pressure [Pa].
#[must_use]
pub fn wilson_vapor_pressure(component: &Component, temperature: f64) -> f64 {
    component.pc * (5.373 * (1.0 + component.omega) * (1.0 - component.tc / temperature)).exp()
}

/// Binary Peng-Robinson mixture.
#[derive(Debug, Clone, PartialEq)]
pub struct PengRobinson {
    components: [Component; 2],
    kij: f64,
}

impl PengRobinson {
    /// Mixture of `first` (the light key, reported as x and y) and `second`.
    #[must_use]
    pub fn new(first: Component, second: Component) -> Self {
        Self {
            components: [first, second],
            kij: 0.0,
        }
    }

    /// Set the binary interaction parameter. The cross attraction term is
    /// scaled by (1 - kij), so kij must stay below 1.
    pub fn with_interaction(mut self, kij: f64) -> Result<Self, ConfigError> {
        let kij = ensure_finite("kij", kij)?;
        if kij >= 1.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "kij must be below 1, got {}",
                kij
            )));
        }
        self.kij = kij;
        Ok(self)
    }

    #[must_use]
    pub fn kij(&self) -> f64 {
        self.kij
    }

    #[must_use]
    pub fn components(&self) -> &[Component; 2] {
        &self.components
    }

    fn pure_parameters(&self, temperature: f64) -> ([f64; 2], [f64; 2]) {
        let mut a = [0.0; 2];
        let mut b = [0.0; 2];
        for (i, c) in self.components.iter().enumerate() {
            let kappa = 0.37464 + 1.54226 * c.omega - 0.26992 * c.omega * c.omega;
            let alpha = (1.0 + kappa * (1.0 - (temperature / c.tc).sqrt())).powi(2);
            a[i] = OMEGA_A * (GAS_CONSTANT * c.tc).powi(2) / c.pc * alpha;
            b[i] = OMEGA_B * GAS_CONSTANT * c.tc / c.pc;
        }
        (a, b)
    }

    /// Fugacity coefficients of both components in a phase of composition
    /// `z`, together with the compressibility factor used.
    pub fn fugacity_coefficients(
        &self,
        temperature: f64,
        pressure: f64,
        z: [f64; 2],
        phase: Phase,
    ) -> McCabeResult<([f64; 2], f64)> {
        let (a, b) = self.pure_parameters(temperature);
        let cross = (a[0] * a[1]).sqrt() * (1.0 - self.kij);
        let a_ij = [[a[0], cross], [cross, a[1]]];

        let a_mix: f64 = (0..2)
            .flat_map(|i| (0..2).map(move |j| (i, j)))
            .map(|(i, j)| z[i] * z[j] * a_ij[i][j])
            .sum();
        let b_mix = z[0] * b[0] + z[1] * b[1];

        let rt = GAS_CONSTANT * temperature;
        let big_a = a_mix * pressure / (rt * rt);
        let big_b = b_mix * pressure / rt;

        let roots: Vec<f64> = cubic_roots(
            -(1.0 - big_b),
            big_a - 3.0 * big_b * big_b - 2.0 * big_b,
            -(big_a * big_b - big_b * big_b - big_b.powi(3)),
        )
        .into_iter()
        .filter(|&root| root > big_b)
        .collect();

        let compressibility = match phase {
            Phase::Liquid => roots.first(),
            Phase::Vapor => roots.last(),
        }
        .copied()
        .ok_or_else(|| {
            McCabeError::Thermodynamics(format!(
                "no physical volume root at T = {} K, P = {} Pa",
                temperature, pressure
            ))
        })?;

        let log_ratio = ((compressibility + (1.0 + SQRT_2) * big_b)
            / (compressibility + (1.0 - SQRT_2) * big_b))
            .ln();
        let mut phi = [0.0; 2];
        for i in 0..2 {
            let sum_a = z[0] * a_ij[i][0] + z[1] * a_ij[i][1];
            let ln_phi = b[i] / b_mix * (compressibility - 1.0)
                - (compressibility - big_b).ln()
                - big_a / (2.0 * SQRT_2 * big_b) * (2.0 * sum_a / a_mix - b[i] / b_mix) * log_ratio;
            phi[i] = ln_phi.exp();
        }

        if phi.iter().all(|p| p.is_finite()) {
            Ok((phi, compressibility))
        } else {
            Err(McCabeError::Thermodynamics(format!(
                "non-finite fugacity coefficient at T = {} K, P = {} Pa",
                temperature, pressure
            )))
        }
    }

    /// Bubble pressure and vapor composition at `temperature` for liquid
    /// mole fraction `x` of the first component.
    pub fn bubble_pressure(&self, temperature: f64, x: f64) -> McCabeResult<BubblePoint> {
        let x = ensure_fraction("x", x)?;
        if ensure_finite("temperature", temperature)? <= 0.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "temperature must be positive, got {} K",
                temperature
            ))
            .into());
        }
        let liquid = [x, 1.0 - x];
        let wilson = [
            wilson_vapor_pressure(&self.components[0], temperature),
            wilson_vapor_pressure(&self.components[1], temperature),
        ];

        let mut pressure = liquid[0] * wilson[0] + liquid[1] * wilson[1];
        let mut vapor = [
            liquid[0] * wilson[0] / pressure,
            liquid[1] * wilson[1] / pressure,
        ];

        for _ in 0..MAX_BUBBLE_ITERATIONS {
            let (phi_l, z_l) =
                self.fugacity_coefficients(temperature, pressure, liquid, Phase::Liquid)?;
            let (phi_v, z_v) =
                self.fugacity_coefficients(temperature, pressure, vapor, Phase::Vapor)?;

            let k = [phi_l[0] / phi_v[0], phi_l[1] / phi_v[1]];
            let sum = k[0] * liquid[0] + k[1] * liquid[1];
            if !sum.is_finite() || sum <= 0.0 {
                return Err(McCabeError::Thermodynamics(format!(
                    "bubble pressure diverged at T = {} K, x = {}",
                    temperature, x
                )));
            }

            let next = [k[0] * liquid[0] / sum, k[1] * liquid[1] / sum];
            let shift = (next[0] - vapor[0]).abs().max((next[1] - vapor[1]).abs());
            pressure *= sum;
            vapor = next;

            if (sum - 1.0).abs() < BUBBLE_TOLERANCE && shift < BUBBLE_TOLERANCE {
                if (z_v - z_l).abs() < 1e-8 {
                    return Err(McCabeError::Thermodynamics(format!(
                        "trivial solution at T = {} K, x = {}: liquid and vapor coincide",
                        temperature, x
                    )));
                }
                return Ok(BubblePoint {
                    temperature,
                    pressure,
                    x,
                    y: vapor[0],
                });
            }
        }

        Err(McCabeError::Thermodynamics(format!(
            "bubble pressure did not converge at T = {} K, x = {}",
            temperature, x
        )))
    }

    /// Bubble temperature and vapor composition at `pressure` for liquid
    /// mole fraction `x` of the first component.
    pub fn bubble_temperature(&self, pressure: f64, x: f64) -> McCabeResult<BubblePoint> {
        let x = ensure_fraction("x", x)?;
        if ensure_finite("pressure", pressure)? <= 0.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "pressure must be positive, got {} Pa",
                pressure
            ))
            .into());
        }
        let start = self.wilson_bubble_temperature(pressure, x)?;

        let residual = |temperature: f64| match self.bubble_pressure(temperature, x) {
            Ok(point) => (point.pressure / pressure).ln(),
            Err(_) => f64::NAN,
        };

        let secant = Secant {
            step: 1.0,
            tolerance: 1e-8,
            ..Secant::default()
        };
        let temperature = secant
            .find_root(&residual, start, 0.5 * start, 1.5 * start)
            .or_else(|_| {
                let fallback = Bisection {
                    tolerance: 1e-8,
                    segments: 16,
                    ..Bisection::new()
                };
                fallback.find_root(&residual, start, 0.7 * start, 1.3 * start)
            })?;

        self.bubble_pressure(temperature, x)
    }

    /// Temperature where the Wilson/Raoult bubble pressure equals `pressure`.
    fn wilson_bubble_temperature(&self, pressure: f64, x: f64) -> McCabeResult<f64> {
        let liquid = [x, 1.0 - x];
        // log-sum-exp keeps the residual finite at very low temperatures
        let residual = |temperature: f64| {
            let terms: Vec<f64> = self
                .components
                .iter()
                .zip(liquid)
                .filter(|(_, fraction)| *fraction > 0.0)
                .map(|(c, fraction)| {
                    fraction.ln()
                        + c.pc.ln()
                        + 5.373 * (1.0 + c.omega) * (1.0 - c.tc / temperature)
                })
                .collect();
            let peak = terms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let total: f64 = terms.iter().map(|t| (t - peak).exp()).sum();
            peak + total.ln() - pressure.ln()
        };
        let finder = Bisection {
            tolerance: 1e-6,
            segments: 1,
            ..Bisection::new()
        };
        Ok(finder.find_root(&residual, 10.0, 10.0, 5000.0)?)
    }
}

// =============================================================================
// TESTS
// =============================================================================
