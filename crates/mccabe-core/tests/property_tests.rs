//! # Property-Based Tests
//!
//! Invariants of the operating-line solver and the stepping loop, checked
//! with proptest over random columns.

use mccabe_core::{
    Column, FeedCondition, Mode, OperatingLine, OperatingLines, RelativeVolatility, StageStepper,
    Step,
};
use proptest::prelude::*;

/// Feed conditions whose rectifying and feed lines are not parallel.
fn feed_strategy() -> impl Strategy<Value = (f64, f64, f64)> {
    (0.2f64..10.0, -2.0f64..3.0, 0.2f64..0.8)
        .prop_filter("parallel lines", |&(reflux, q, _)| (reflux + q).abs() > 1e-3)
}

fn residual(line: &OperatingLine, x: f64, y: f64) -> f64 {
    match *line {
        OperatingLine::Sloped { .. } => line.evaluate(x).map_or(f64::INFINITY, |v| (v - y).abs()),
        OperatingLine::Vertical { x: at } => (at - x).abs(),
    }
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// The intersection lies on both the rectifying and the feed line.
    #[test]
    fn intersection_satisfies_both_lines((reflux, q, xf) in feed_strategy()) {
        let feed = FeedCondition::new(reflux, q, xf).expect("feed");
        let lines = OperatingLines::new(&feed, 0.9, 0.1).expect("lines");
        let point = lines.intersection;

        let scale = point.x.abs().max(point.y.abs()).max(1.0);
        prop_assert!(residual(&lines.rectifying, point.x, point.y) <= 1e-9 * scale);
        prop_assert!(residual(&lines.feed, point.x, point.y) <= 1e-9 * scale);
    }

    /// Every recorded liquid composition is strictly below its predecessor.
    #[test]
    fn path_is_strictly_decreasing(
        alpha in 1.5f64..6.0,
        reflux in 1.0f64..6.0,
        q in 0.0f64..1.5,
        xf in 0.3f64..0.7,
    ) {
        let curve = RelativeVolatility::new(alpha).expect("alpha");
        let feed = FeedCondition::new(reflux, q, xf).expect("feed");
        let column = Column::new(0.9, 0.1, Mode::Feed(feed)).expect("column");
        let report = StageStepper::new().run(&curve, &column);

        let compositions = report.path.compositions();
        prop_assert!(compositions.windows(2).all(|w| w[1] < w[0]));
    }

    /// Stepping from vertex i reproduces vertex i + 1.
    #[test]
    fn step_from_reproduces_the_path(alpha in 1.5f64..6.0, reflux in 1.0f64..6.0) {
        let curve = RelativeVolatility::new(alpha).expect("alpha");
        let feed = FeedCondition::new(reflux, 1.0, 0.5).expect("feed");
        let column = Column::new(0.9, 0.1, Mode::Feed(feed)).expect("column");
        let stepper = StageStepper::new();
        let report = stepper.run(&curve, &column);

        for stage in report.path.steps() {
            let Step::Advanced(again) = stepper.step_from(&curve, &column, stage.from) else {
                return Err(TestCaseError::fail("recorded stage blocked on replay"));
            };
            prop_assert_eq!(again, *stage);
        }
    }

    /// Identical inputs produce identical reports.
    #[test]
    fn stepping_is_deterministic(alpha in 1.2f64..8.0, xd in 0.6f64..0.99, xb in 0.01f64..0.4) {
        let curve = RelativeVolatility::new(alpha).expect("alpha");
        let column = Column::new(xd, xb, Mode::TotalReflux).expect("column");

        let first = StageStepper::new().run(&curve, &column);
        let second = StageStepper::new().run(&curve, &column);
        prop_assert_eq!(first, second);
    }

    /// At total reflux a linear curve y = m x needs ceil(ln(xd/xb) / ln m) stages.
    #[test]
    fn linear_curve_stage_count(m in 1.1f64..4.0) {
        let column = Column::new(0.9, 0.1, Mode::TotalReflux).expect("column");
        let curve = move |x: f64| m * x;
        let report = StageStepper::new().run(&curve, &column);

        let exact = (0.9f64 / 0.1).ln() / m.ln();
        prop_assume!((exact - exact.round()).abs() > 1e-6);
        prop_assert!(report.is_converged());
        prop_assert_eq!(report.stages, exact.ceil() as usize);
    }
}
