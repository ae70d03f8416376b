//! # Equilibrium Curves
//!
//! Representations of the vapor-liquid equilibrium relationship y = f(x) on
//! the x-y diagram, and the fits that turn sampled data into one.
//!
//! - [`PolynomialFit`]: least-squares polynomial, Chebyshev basis
//! - [`PiecewiseLinear`]: interpolation between samples
//! - [`RelativeVolatility`]: constant-alpha ideal mixture
//! - [`LinearCurve`]: synthetic straight line, mostly for hand-checkable cases
//!
//! Any `Fn(f64) -> f64` is also an equilibrium curve.
//!
//! No fit is guaranteed to be monotonic. High-degree polynomials can wiggle
//! near the ends of the domain; consumers must tolerate that.

use crate::types::ConfigError;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Default polynomial degree for sampled equilibrium data.
pub const DEFAULT_FIT_DEGREE: usize = 30;

/// Singular values below this fraction of the largest are discarded.
const SVD_CUTOFF: f64 = 1e-13;

/// An equilibrium relationship x -> y over [0, 1].
pub trait EquilibriumCurve {
    /// Vapor mole fraction in equilibrium with liquid mole fraction `x`.
    fn vapor(&self, x: f64) -> f64;
}

impl<F> EquilibriumCurve for F
where
    F: Fn(f64) -> f64,
{
    fn vapor(&self, x: f64) -> f64 {
        self(x)
    }
}

// =============================================================================
// CURVE FIT SELECTION
// =============================================================================

/// How to turn sampled (x, y) data into a queryable curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum CurveFit {
    /// Least-squares polynomial of the given degree.
    Polynomial { degree: usize },
    /// Straight segments between neighbouring samples.
    PiecewiseLinear,
}

impl Default for CurveFit {
    fn default() -> Self {
        CurveFit::Polynomial {
            degree: DEFAULT_FIT_DEGREE,
        }
    }
}

impl CurveFit {
    /// Fit the samples and return the resulting curve.
    pub fn fit(&self, samples: &[(f64, f64)]) -> Result<Box<dyn EquilibriumCurve>, ConfigError> {
        match self {
            CurveFit::Polynomial { degree } => {
                Ok(Box::new(PolynomialFit::fit(samples, *degree)?))
            }
            CurveFit::PiecewiseLinear => Ok(Box::new(PiecewiseLinear::new(samples)?)),
        }
    }
}

/// Check that samples are finite, inside [0, 1] in x, and sorted by x.
fn validate_samples(samples: &[(f64, f64)], minimum: usize) -> Result<(), ConfigError> {
    if samples.len() < minimum {
        return Err(ConfigError::InvalidSamples(format!(
            "need at least {} samples, got {}",
            minimum,
            samples.len()
        )));
    }
    for (i, &(x, y)) in samples.iter().enumerate() {
        if !x.is_finite() || !y.is_finite() {
            return Err(ConfigError::InvalidSamples(format!(
                "sample {} is not finite",
                i
            )));
        }
        if !(0.0..=1.0).contains(&x) {
            return Err(ConfigError::InvalidSamples(format!(
                "sample {} has x = {} outside [0, 1]",
                i, x
            )));
        }
    }
    if samples.windows(2).any(|w| w[1].0 < w[0].0) {
        return Err(ConfigError::InvalidSamples(
            "x values must be sorted ascending".to_string(),
        ));
    }
    Ok(())
}

// =============================================================================
// POLYNOMIAL FIT
// =============================================================================

/// Least-squares polynomial in the Chebyshev basis on t = 2x - 1.
///
/// Fitting in the Chebyshev basis keeps the normal problem well conditioned
/// even at degree 30, where a monomial Vandermonde matrix is numerically
/// singular. Coefficients are found with an SVD so rank-deficient designs
/// (duplicate x samples) still produce the minimum-norm fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialFit {
    coefficients: Vec<f64>,
}

impl PolynomialFit {
    /// Fit `samples` with a polynomial of at most `degree`.
    ///
    /// The degree is clamped to `samples.len() - 1`.
    pub fn fit(samples: &[(f64, f64)], degree: usize) -> Result<Self, ConfigError> {
        validate_samples(samples, 2)?;

        let degree = degree.min(samples.len() - 1);
        let rows = samples.len();
        let cols = degree + 1;

        let mut design = DMatrix::<f64>::zeros(rows, cols);
        for (row, &(x, _)) in samples.iter().enumerate() {
            let t = 2.0 * x - 1.0;
            let mut previous = 1.0;
            let mut current = t;
            design[(row, 0)] = 1.0;
            if cols > 1 {
                design[(row, 1)] = t;
            }
            for col in 2..cols {
                let next = 2.0 * t * current - previous;
                design[(row, col)] = next;
                previous = current;
                current = next;
            }
        }
        let rhs = DVector::from_iterator(rows, samples.iter().map(|&(_, y)| y));

        let svd = design.svd(true, true);
        let cutoff = svd.singular_values.max() * SVD_CUTOFF;
        let solution = svd
            .solve(&rhs, cutoff)
            .map_err(|e| ConfigError::InvalidSamples(format!("least squares failed: {}", e)))?;

        Ok(Self {
            coefficients: solution.iter().copied().collect(),
        })
    }

    /// Degree of the fitted polynomial.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Chebyshev coefficients, lowest order first.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Evaluate with Clenshaw's recurrence.
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        let t = 2.0 * x - 1.0;
        let mut b1 = 0.0;
        let mut b2 = 0.0;
        for &c in self.coefficients.iter().skip(1).rev() {
            let b0 = c + 2.0 * t * b1 - b2;
            b2 = b1;
            b1 = b0;
        }
        self.coefficients.first().copied().unwrap_or(0.0) + t * b1 - b2
    }
}

impl EquilibriumCurve for PolynomialFit {
    fn vapor(&self, x: f64) -> f64 {
        self.evaluate(x)
    }
}

// =============================================================================
// PIECEWISE LINEAR
// =============================================================================

/// Linear interpolation between samples; clamps outside the sampled range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiecewiseLinear {
    samples: Vec<(f64, f64)>,
}

impl PiecewiseLinear {
    /// Build an interpolant over sorted samples.
    pub fn new(samples: &[(f64, f64)]) -> Result<Self, ConfigError> {
        validate_samples(samples, 2)?;
        Ok(Self {
            samples: samples.to_vec(),
        })
    }
}

impl EquilibriumCurve for PiecewiseLinear {
    fn vapor(&self, x: f64) -> f64 {
        let first = self.samples[0];
        let last = self.samples[self.samples.len() - 1];
        if x <= first.0 {
            return first.1;
        }
        if x >= last.0 {
            return last.1;
        }

        let upper = self.samples.partition_point(|&(sx, _)| sx <= x);
        let (x0, y0) = self.samples[upper - 1];
        let (x1, y1) = self.samples[upper];
        if x1 == x0 {
            y0
        } else {
            y0 + (y1 - y0) * (x - x0) / (x1 - x0)
        }
    }
}

// =============================================================================
// SYNTHETIC CURVES
// =============================================================================

/// Ideal binary mixture with constant relative volatility alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativeVolatility {
    alpha: f64,
}

impl RelativeVolatility {
    /// Create a constant-alpha curve. Alpha must be finite and positive.
    pub fn new(alpha: f64) -> Result<Self, ConfigError> {
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(ConfigError::InvalidParameter(format!(
                "relative volatility must be positive, got {}",
                alpha
            )));
        }
        Ok(Self { alpha })
    }

    /// The relative volatility.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl EquilibriumCurve for RelativeVolatility {
    fn vapor(&self, x: f64) -> f64 {
        self.alpha * x / (1.0 + (self.alpha - 1.0) * x)
    }
}

/// Straight line y = slope * x + intercept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearCurve {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearCurve {
    /// Create a line through the origin with the given slope.
    #[must_use]
    pub const fn proportional(slope: f64) -> Self {
        Self {
            slope,
            intercept: 0.0,
        }
    }
}

impl EquilibriumCurve for LinearCurve {
    fn vapor(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Sample a curve at `points` evenly spaced x values over [0, 1].
#[must_use]
pub fn sample_curve(curve: &dyn EquilibriumCurve, points: usize) -> Vec<(f64, f64)> {
    let points = points.max(2);
    (0..points)
        .map(|i| {
            let x = i as f64 / (points - 1) as f64;
            (x, curve.vapor(x))
        })
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================
