//! # mccabe-core
//!
//! The McCabe-Thiele stage-stepping engine - THE LOGIC.
//!
//! Given an equilibrium curve y = f(x), distillate and bottoms targets and
//! optionally a single feed (reflux ratio, feed quality, feed composition),
//! this crate steps off equilibrium stages down the x-y diagram and reports
//! the staircase, the stage count, the feed stage and how the construction
//! ended.
//!
//! ## Layout
//!
//! - `stepper`: the stage loop, modes and reports
//! - `operating`: rectifying, feed and stripping lines
//! - `solver`: injected root finders
//! - `equilibrium`: curve fits and synthetic curves
//! - `vle`: component database and Peng-Robinson equilibrium data
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network, NO filesystem access (pure Rust)
//! - Deterministic: the same inputs always produce the same path
//! - Every loop is bounded by an explicit cap
//! - Configuration problems are errors; infeasibility is an outcome

// =============================================================================
// MODULES
// =============================================================================

pub mod equilibrium;
pub mod operating;
pub mod solver;
pub mod stepper;
pub mod types;
pub mod vle;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{ConfigError, McCabeError, McCabeResult, Point, SolverError};

// =============================================================================
// RE-EXPORTS: Stepping Engine
// =============================================================================

pub use equilibrium::{
    CurveFit, DEFAULT_FIT_DEGREE, EquilibriumCurve, LinearCurve, PiecewiseLinear, PolynomialFit,
    RelativeVolatility, sample_curve,
};
pub use operating::{
    FeedCondition, OperatingLine, OperatingLines, Section, feed_line, rectifying_line,
};
pub use solver::{Bisection, RootFinder, Secant};
pub use stepper::{
    Column, DEFAULT_MAX_STAGES, Mode, Outcome, StagePath, StageReport, StageStep, StageStepper,
    Step, StepperConfig,
};

// =============================================================================
// RE-EXPORTS: Equilibrium Data (from vle module)
// =============================================================================

pub use vle::{
    BubblePoint, Component, ComponentDatabase, Conditions, EquilibriumDataProvider,
    PengRobinson, PengRobinsonProvider,
};
