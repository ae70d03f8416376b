//! # Stage Stepper
//!
//! The McCabe-Thiele construction: starting at the distillate composition,
//! alternate horizontal steps to the equilibrium curve with vertical steps to
//! the active operating line until the liquid composition reaches the bottoms
//! target.
//!
//! ## Modes
//!
//! | Mode | Operating line | Extra output |
//! |------|----------------|--------------|
//! | [`Mode::TotalReflux`] | y = x | none |
//! | [`Mode::Feed`] | rectifying above xsol, stripping at or below | feed stage, intersection |
//!
//! ## Outcomes
//!
//! A run that starts always produces a [`StageReport`]. Its [`Outcome`] tells
//! whether the staircase reached xb, was blocked because the equilibrium curve
//! does not lie above the operating line, or hit the stage cap. The partial
//! path is kept in every case.
//!
//! Misconfiguration is rejected earlier, by [`Column::new`].

use crate::equilibrium::EquilibriumCurve;
use crate::operating::{FeedCondition, OperatingLines, Section};
use crate::solver::{Bisection, RootFinder};
use crate::types::{ConfigError, Point, ensure_finite, ensure_fraction};
use serde::{Deserialize, Serialize};

/// Default cap on the number of stages stepped off.
pub const DEFAULT_MAX_STAGES: usize = 200;

/// A step must move x down by more than this fraction of x to count as
/// progress.
pub const DEFAULT_PROGRESS_TOLERANCE: f64 = 1e-9;

// =============================================================================
// MODE & COLUMN
// =============================================================================

/// Whether the column has a feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Mode {
    /// No feed: the operating line is the diagonal.
    TotalReflux,
    /// Single feed with reflux ratio, feed quality and feed composition.
    Feed(FeedCondition),
}

impl Mode {
    /// Build the mode from the optional feed triple.
    pub fn from_parts(
        reflux: Option<f64>,
        q: Option<f64>,
        xf: Option<f64>,
    ) -> Result<Self, ConfigError> {
        Ok(FeedCondition::from_parts(reflux, q, xf)?
            .map(Mode::Feed)
            .unwrap_or(Mode::TotalReflux))
    }
}

/// Validated column targets plus the derived operating lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Column {
    xd: f64,
    xb: f64,
    mode: Mode,
    efficiency: f64,
    lines: Option<OperatingLines>,
}

impl Column {
    /// Validate targets and derive operating lines.
    ///
    /// Every configuration problem surfaces here, before any stepping.
    pub fn new(xd: f64, xb: f64, mode: Mode) -> Result<Self, ConfigError> {
        let xd = ensure_fraction("xd", xd)?;
        let xb = ensure_fraction("xb", xb)?;
        if xd <= xb {
            return Err(ConfigError::InvertedTargets { xd, xb });
        }

        let lines = match &mode {
            Mode::TotalReflux => None,
            Mode::Feed(feed) => Some(OperatingLines::new(feed, xd, xb)?),
        };

        Ok(Self {
            xd,
            xb,
            mode,
            efficiency: 1.0,
            lines,
        })
    }

    /// Apply a Murphree vapor efficiency in (0, 1].
    ///
    /// The efficiency scales the enrichment over the operating line, not the
    /// curve itself: stepping uses y = op(x) + E * (curve(x) - op(x)), where
    /// op is the diagonal at total reflux and the active operating line with
    /// a feed.
    pub fn with_efficiency(mut self, efficiency: f64) -> Result<Self, ConfigError> {
        let efficiency = ensure_finite("efficiency", efficiency)?;
        if efficiency <= 0.0 || efficiency > 1.0 {
            return Err(ConfigError::InvalidEfficiency(efficiency));
        }
        self.efficiency = efficiency;
        Ok(self)
    }

    #[must_use]
    pub fn xd(&self) -> f64 {
        self.xd
    }

    #[must_use]
    pub fn xb(&self) -> f64 {
        self.xb
    }

    #[must_use]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    #[must_use]
    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    /// Operating lines, present in feed mode only.
    #[must_use]
    pub fn lines(&self) -> Option<&OperatingLines> {
        self.lines.as_ref()
    }

    /// Operating-line ordinate at `x`.
    fn operating_vapor(&self, x: f64) -> f64 {
        match &self.lines {
            Some(lines) => lines.vapor_at(x),
            None => x,
        }
    }

    /// Murphree pseudo-equilibrium: the operating line plus the efficiency
    /// fraction of the enrichment the ideal curve offers over it.
    fn effective_vapor(&self, curve: &dyn EquilibriumCurve, x: f64) -> f64 {
        let ideal = curve.vapor(x);
        if self.efficiency == 1.0 {
            return ideal;
        }
        let operating = self.operating_vapor(x);
        operating + self.efficiency * (ideal - operating)
    }

    fn section_at(&self, x: f64) -> Option<Section> {
        self.lines.as_ref().map(|lines| lines.section_at(x))
    }
}

// =============================================================================
// PATH
// =============================================================================

/// One stage of the staircase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageStep {
    /// Where the stage starts (on the operating line).
    pub from: Point,
    /// End of the horizontal step, on the equilibrium curve.
    pub equilibrium: Point,
    /// End of the vertical step, back on the operating line.
    pub operating: Point,
    /// Column section of the stage; `None` at total reflux.
    pub section: Option<Section>,
}

/// Ordered staircase vertices, starting at (xd, xd).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagePath {
    start: Point,
    steps: Vec<StageStep>,
}

impl StagePath {
    /// Empty path anchored at `start`.
    #[must_use]
    pub fn new(start: Point) -> Self {
        Self {
            start,
            steps: Vec::new(),
        }
    }

    fn push(&mut self, step: StageStep) {
        self.steps.push(step);
    }

    #[must_use]
    pub fn start(&self) -> Point {
        self.start
    }

    #[must_use]
    pub fn steps(&self) -> &[StageStep] {
        &self.steps
    }

    /// Number of stages stepped off.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Point the next stage would start from.
    #[must_use]
    pub fn end(&self) -> Point {
        self.steps.last().map(|s| s.operating).unwrap_or(self.start)
    }

    /// Liquid compositions visited: xd, x1, x2, ...
    #[must_use]
    pub fn compositions(&self) -> Vec<f64> {
        std::iter::once(self.start.x)
            .chain(self.steps.iter().map(|s| s.equilibrium.x))
            .collect()
    }

    /// Every corner of the staircase in drawing order.
    #[must_use]
    pub fn vertices(&self) -> Vec<Point> {
        let mut vertices = Vec::with_capacity(1 + 2 * self.steps.len());
        vertices.push(self.start);
        for step in &self.steps {
            vertices.push(step.equilibrium);
            vertices.push(step.operating);
        }
        vertices
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// How the stepping loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The liquid composition reached xb.
    Converged,
    /// No further stage could be stepped off from this point: the
    /// equilibrium curve does not lie above the operating line there.
    Infeasible { x: f64, y: f64 },
    /// The stage cap was hit before reaching xb.
    StageLimitReached { limit: usize },
}

/// Result of one McCabe-Thiele construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub column: Column,
    pub path: StagePath,
    /// Completed stages. A step landing on or below xb counts.
    pub stages: usize,
    /// Feed stage index (1-based), feed mode only.
    pub feed_stage: Option<usize>,
    pub outcome: Outcome,
}

impl StageReport {
    #[must_use]
    pub fn is_converged(&self) -> bool {
        matches!(self.outcome, Outcome::Converged)
    }

    #[must_use]
    pub fn is_infeasible(&self) -> bool {
        matches!(self.outcome, Outcome::Infeasible { .. })
    }

    /// Rectifying/feed intersection, feed mode only.
    #[must_use]
    pub fn intersection(&self) -> Option<Point> {
        self.column.lines().map(|lines| lines.intersection)
    }

    /// Last liquid composition reached.
    #[must_use]
    pub fn final_composition(&self) -> f64 {
        self.path.end().x
    }
}

// =============================================================================
// STEPPER
// =============================================================================

/// Result of attempting a single stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// A stage was stepped off.
    Advanced(StageStep),
    /// The horizontal step found no point on the curve left of the start.
    Blocked,
}

/// Stepping limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepperConfig {
    pub max_stages: usize,
    pub tolerance: f64,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            max_stages: DEFAULT_MAX_STAGES,
            tolerance: DEFAULT_PROGRESS_TOLERANCE,
        }
    }
}

/// McCabe-Thiele stage stepper.
#[derive(Debug)]
pub struct StageStepper {
    config: StepperConfig,
    finder: Box<dyn RootFinder>,
}

impl Default for StageStepper {
    fn default() -> Self {
        Self::new()
    }
}

impl StageStepper {
    /// Stepper with default limits and a bisection root finder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: StepperConfig::default(),
            finder: Box::new(Bisection::new()),
        }
    }

    /// Stepper with custom limits.
    #[must_use]
    pub fn with_config(config: StepperConfig) -> Self {
        Self {
            config,
            ..Self::new()
        }
    }

    /// Replace the root finder.
    #[must_use]
    pub fn finder(mut self, finder: Box<dyn RootFinder>) -> Self {
        self.finder = finder;
        self
    }

    #[must_use]
    pub fn config(&self) -> &StepperConfig {
        &self.config
    }

    /// Step off one stage starting from `from`.
    ///
    /// The horizontal step searches the curve left of `from.x` for the
    /// vapor composition `from.y`. Landing within the relative tolerance of
    /// `from.x` (a pinch) or finding nothing at all blocks the construction.
    pub fn step_from(
        &self,
        curve: &dyn EquilibriumCurve,
        column: &Column,
        from: Point,
    ) -> Step {
        let level = from.y;
        let residual = |x: f64| column.effective_vapor(curve, x) - level;

        let Ok(x) = self.finder.find_root(&residual, from.x, 0.0, from.x) else {
            return Step::Blocked;
        };
        if x >= from.x * (1.0 - self.config.tolerance) {
            return Step::Blocked;
        }

        Step::Advanced(StageStep {
            from,
            equilibrium: Point::new(x, level),
            operating: Point::new(x, column.operating_vapor(x)),
            section: column.section_at(x),
        })
    }

    /// Run the full construction from (xd, xd) down to xb.
    pub fn run(&self, curve: &dyn EquilibriumCurve, column: &Column) -> StageReport {
        let mut path = StagePath::new(Point::diagonal(column.xd()));
        let mut feed_stage = column.lines().map(|_| 1usize);

        let outcome = loop {
            let current = path.end();
            if current.x <= column.xb() {
                break Outcome::Converged;
            }
            if path.len() >= self.config.max_stages {
                break Outcome::StageLimitReached {
                    limit: self.config.max_stages,
                };
            }

            match self.step_from(curve, column, current) {
                Step::Advanced(step) => {
                    if step.section == Some(Section::Rectifying) {
                        feed_stage = feed_stage.map(|n| n.saturating_add(1));
                    }
                    path.push(step);
                }
                Step::Blocked => {
                    break Outcome::Infeasible {
                        x: current.x,
                        y: current.y,
                    };
                }
            }
        };

        StageReport {
            column: *column,
            stages: path.len(),
            path,
            feed_stage,
            outcome,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
