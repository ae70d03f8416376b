//! # Root Finders
//!
//! Scalar root finding for curve inversion and bubble-point searches.
//!
//! The stepping loop never calls a particular algorithm directly. It holds a
//! [`RootFinder`] and asks it to "solve f(x) = 0 near a guess inside
//! [lower, upper]", so tests can substitute a deterministic solver and
//! callers can trade robustness for speed.
//!
//! | Finder | Strategy | Non-monotonic curves |
//! |--------|----------|----------------------|
//! | [`Bisection`] | scan for a sign change, then bisect | first crossing from the guess side |
//! | [`Secant`] | secant iteration from the guess | whichever root it converges to |

use crate::types::SolverError;

/// Default absolute tolerance on x.
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// Default iteration cap for every finder.
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

/// Default number of scan segments for [`Bisection`].
pub const DEFAULT_SEGMENTS: usize = 400;

/// Injected "solve f(x) = 0 near guess" capability.
pub trait RootFinder: std::fmt::Debug {
    /// Find a root of `f` in `[lower, upper]`, preferring the one nearest `guess`.
    fn find_root(
        &self,
        f: &dyn Fn(f64) -> f64,
        guess: f64,
        lower: f64,
        upper: f64,
    ) -> Result<f64, SolverError>;
}

// =============================================================================
// BISECTION
// =============================================================================

/// Bracketing bisection with an initial sign-change scan.
///
/// The interval is cut into `segments` pieces and walked starting from the
/// end closest to the guess. The first piece whose endpoints differ in sign is
/// then bisected down to `tolerance`.
#[derive(Debug, Clone, Copy)]
pub struct Bisection {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub segments: usize,
}

impl Default for Bisection {
    fn default() -> Self {
        Self::new()
    }
}

impl Bisection {
    /// Create a bisection finder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            segments: DEFAULT_SEGMENTS,
        }
    }

    /// Create a finder with a custom tolerance.
    #[must_use]
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::new()
        }
    }

    /// Locate the first sign change, walking from `start` toward `end`.
    fn bracket(
        &self,
        f: &dyn Fn(f64) -> f64,
        start: f64,
        end: f64,
    ) -> Result<(f64, f64), SolverError> {
        let segments = self.segments.max(1);
        let width = (end - start) / segments as f64;

        let mut a = start;
        let mut fa = evaluate(f, a)?;
        if fa == 0.0 {
            return Ok((a, a));
        }

        for i in 1..=segments {
            let b = if i == segments {
                end
            } else {
                start + width * i as f64
            };
            let fb = evaluate(f, b)?;
            if fb == 0.0 {
                return Ok((b, b));
            }
            if fa.signum() != fb.signum() {
                return Ok((a, b));
            }
            a = b;
            fa = fb;
        }

        Err(SolverError::NoBracket {
            lower: start.min(end),
            upper: start.max(end),
        })
    }
}

impl RootFinder for Bisection {
    fn find_root(
        &self,
        f: &dyn Fn(f64) -> f64,
        guess: f64,
        lower: f64,
        upper: f64,
    ) -> Result<f64, SolverError> {
        let guess = guess.clamp(lower, upper);
        let (start, end) = if guess - lower <= upper - guess {
            (lower, upper)
        } else {
            (upper, lower)
        };

        let (mut a, mut b) = self.bracket(f, start, end)?;
        if a == b {
            return Ok(a);
        }

        let mut fa = evaluate(f, a)?;
        for _ in 0..self.max_iterations {
            let mid = 0.5 * (a + b);
            if (b - a).abs() <= self.tolerance {
                return Ok(mid);
            }
            let fm = evaluate(f, mid)?;
            if fm == 0.0 {
                return Ok(mid);
            }
            if fa.signum() == fm.signum() {
                a = mid;
                fa = fm;
            } else {
                b = mid;
            }
        }

        // Bisection halves the bracket every pass; after the cap the midpoint
        // is within |b - a| / 2 of a root.
        Ok(0.5 * (a + b))
    }
}

// =============================================================================
// SECANT
// =============================================================================

/// Secant iteration started at the guess.
///
/// Fast on smooth monotonic curves. Fails with
/// [`SolverError::MaxIterationsExceeded`] when it does not settle and with
/// [`SolverError::NoBracket`] when it settles outside `[lower, upper]`.
#[derive(Debug, Clone, Copy)]
pub struct Secant {
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Offset of the second starting point from the guess.
    pub step: f64,
}

impl Default for Secant {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            step: 1e-4,
        }
    }
}

impl RootFinder for Secant {
    fn find_root(
        &self,
        f: &dyn Fn(f64) -> f64,
        guess: f64,
        lower: f64,
        upper: f64,
    ) -> Result<f64, SolverError> {
        let mut x0 = guess;
        let mut x1 = guess + self.step;
        let mut f0 = evaluate(f, x0)?;
        let mut f1 = evaluate(f, x1)?;

        for _ in 0..self.max_iterations {
            if f1 == 0.0 {
                return within(x1, lower, upper, self.tolerance);
            }
            let denominator = f1 - f0;
            if denominator == 0.0 {
                return Err(SolverError::MaxIterationsExceeded);
            }
            let x2 = x1 - f1 * (x1 - x0) / denominator;
            if (x2 - x1).abs() <= self.tolerance {
                return within(x2, lower, upper, self.tolerance);
            }
            x0 = x1;
            f0 = f1;
            x1 = x2;
            f1 = evaluate(f, x1)?;
        }

        Err(SolverError::MaxIterationsExceeded)
    }
}

fn within(x: f64, lower: f64, upper: f64, tolerance: f64) -> Result<f64, SolverError> {
    if x >= lower - tolerance && x <= upper + tolerance {
        Ok(x.clamp(lower, upper))
    } else {
        Err(SolverError::NoBracket { lower, upper })
    }
}

fn evaluate(f: &dyn Fn(f64) -> f64, x: f64) -> Result<f64, SolverError> {
    let value = f(x);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SolverError::NonFinite(x))
    }
}

// =============================================================================
// TESTS
// =============================================================================
