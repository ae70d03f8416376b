//! # Core Type Definitions
//!
//! This module contains the shared types for the McCabe-Thiele engine:
//! - Composition points on the x-y diagram (`Point`)
//! - Error types (`McCabeError`, `ConfigError`, `SolverError`)
//!
//! ## Error Policy
//!
//! - Misconfiguration is an `Err`, detected before any numeric work
//! - A staircase that cannot be completed is NOT an error; it is an
//!   [`Outcome`](crate::stepper::Outcome) carried by a successful report
//! - The core never panics on user input

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// POINT
// =============================================================================

/// A point on the x-y (liquid-vapor mole fraction) diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Liquid mole fraction of the more volatile component.
    pub x: f64,
    /// Vapor mole fraction of the more volatile component.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// A point on the y = x diagonal.
    #[must_use]
    pub const fn diagonal(x: f64) -> Self {
        Self { x, y: x }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

// =============================================================================
// CONFIGURATION ERRORS
// =============================================================================

/// Problems with the inputs that abort a computation before it starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Neither a pressure nor a temperature was supplied.
    #[error("Provide either a temperature or a pressure")]
    MissingConditions,

    /// Both a pressure and a temperature were supplied.
    #[error("Provide either a temperature or a pressure, not both")]
    ConflictingConditions,

    /// Only part of the (R, q, xf) feed triple was supplied.
    #[error("Feed condition needs reflux ratio, feed quality and feed composition together (missing: {0})")]
    IncompleteFeed(String),

    /// Rectifying and feed lines have the same slope.
    #[error("Rectifying and feed lines are parallel (R = {reflux}, q = {q})")]
    ParallelOperatingLines { reflux: f64, q: f64 },

    /// A mole fraction is outside [0, 1].
    #[error("{name} = {value} is not a mole fraction in [0, 1]")]
    CompositionOutOfRange { name: &'static str, value: f64 },

    /// The distillate is not richer than the bottoms.
    #[error("Distillate composition {xd} must exceed bottoms composition {xb}")]
    InvertedTargets { xd: f64, xb: f64 },

    /// Murphree efficiency outside (0, 1].
    #[error("Murphree efficiency {0} must lie in (0, 1]")]
    InvalidEfficiency(f64),

    /// A parameter is NaN or infinite.
    #[error("{0} must be a finite number")]
    NonFinite(&'static str),

    /// Equilibrium samples cannot be fitted.
    #[error("Invalid equilibrium samples: {0}")]
    InvalidSamples(String),

    /// Any other invalid parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

// =============================================================================
// SOLVER ERRORS
// =============================================================================

/// Errors raised by the root finders.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// No sign change was found in the search interval.
    #[error("No root bracketed in [{lower}, {upper}]")]
    NoBracket { lower: f64, upper: f64 },

    /// Maximum iterations exceeded without convergence.
    #[error("Maximum iterations exceeded")]
    MaxIterationsExceeded,

    /// The function returned NaN or infinity.
    #[error("Function evaluated to a non-finite value at x = {0}")]
    NonFinite(f64),
}

// =============================================================================
// TOP-LEVEL ERROR
// =============================================================================

/// Errors that can occur in the McCabe-Thiele engine and its collaborators.
#[derive(Debug, Error)]
pub enum McCabeError {
    /// The inputs are inconsistent; zero stages were attempted.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A component identifier was not found in the database.
    #[error("Component not found in database: {0}")]
    Lookup(String),

    /// A root finder failed outside the stepping loop.
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    /// An equation-of-state iteration failed.
    #[error("Thermodynamics error: {0}")]
    Thermodynamics(String),

    /// A document could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

impl McCabeError {
    /// True when the error stems from the inputs rather than the numerics.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, McCabeError::Configuration(_))
    }
}

/// Result alias used across the crate.
pub type McCabeResult<T> = Result<T, McCabeError>;

// =============================================================================
// VALIDATION HELPERS
// =============================================================================

/// Reject NaN and infinities.
pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite(name))
    }
}

/// Require a mole fraction in [0, 1].
pub(crate) fn ensure_fraction(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    let value = ensure_finite(name, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::CompositionOutOfRange { name, value })
    }
}

// =============================================================================
// TESTS
// =============================================================================
