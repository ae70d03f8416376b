//! # Diagram Rendering
//!
//! SVG output through the `plotters` SVG backend.
//!
//! | Diagram | Function | Contents |
//! |---------|----------|----------|
//! | McCabe-Thiele | [`render_mccabe_thiele`] | curve, diagonal, operating lines, staircase, annotations |
//! | Pxy / Txy | [`render_phase_diagram`] | bubble and dew branches |
//! | xy | [`render_xy`] | equilibrium curve and diagonal |

use mccabe_core::{
    EquilibriumCurve, McCabeError, McCabeResult, Mode, Outcome, StageReport, sample_curve,
};
use plotters::prelude::*;
use std::path::Path;

const SIZE: (u32, u32) = (900, 800);
const CURVE_SAMPLES: usize = 201;
const FONT: &str = "sans-serif";

fn plot_error<E: std::fmt::Display>(error: E) -> McCabeError {
    McCabeError::Io(format!("Plot rendering failed: {}", error))
}

// =============================================================================
// MCCABE-THIELE
// =============================================================================

/// Everything drawn on a McCabe-Thiele diagram.
pub struct McCabePlot<'a> {
    pub title: String,
    /// Name of the light component, used in axis labels.
    pub component: String,
    pub curve: &'a dyn EquilibriumCurve,
    pub report: &'a StageReport,
    /// Annotate xd, xb and xf.
    pub show_points: bool,
}

/// Input and output summary shown in the lower right corner.
fn summary_lines(report: &StageReport) -> (Vec<String>, Vec<String>) {
    let column = &report.column;
    let mut inputs = vec![
        "Input:".to_string(),
        format!("xD = {:.2}", column.xd()),
        format!("xB = {:.2}", column.xb()),
    ];
    if let Mode::Feed(feed) = column.mode() {
        inputs.push(format!("xF = {:.2}", feed.xf));
        inputs.push(format!("q = {:.2}", feed.q));
        inputs.push(format!("R = {:.2}", feed.reflux));
    }
    if column.efficiency() < 1.0 {
        inputs.push(format!("E = {:.2}", column.efficiency()));
    }

    let mut outputs = vec!["Output:".to_string(), format!("Stages = {}", report.stages)];
    if let Some(feed_stage) = report.feed_stage {
        outputs.push(format!("Feed stage = {}", feed_stage));
    }
    match report.outcome {
        Outcome::Converged => {}
        Outcome::Infeasible { .. } => outputs.push("Infeasible".to_string()),
        Outcome::StageLimitReached { limit } => outputs.push(format!("Cap {} reached", limit)),
    }
    (inputs, outputs)
}

/// Render a McCabe-Thiele diagram to an SVG file.
pub fn render_mccabe_thiele(path: &Path, plot: &McCabePlot<'_>) -> McCabeResult<()> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&plot.title, (FONT, 24))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc(format!("Liquid mole fraction {}", plot.component))
        .y_desc(format!("Vapor mole fraction {}", plot.component))
        .draw()
        .map_err(plot_error)?;

    let curve = sample_curve(plot.curve, CURVE_SAMPLES)
        .into_iter()
        .filter(|&(_, y)| (0.0..=1.0).contains(&y));
    chart
        .draw_series(LineSeries::new(curve, BLUE.stroke_width(2)))
        .map_err(plot_error)?
        .label("Equilibrium")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    chart
        .draw_series(LineSeries::new(vec![(0.0, 0.0), (1.0, 1.0)], &BLACK))
        .map_err(plot_error)?;

    let column = &plot.report.column;
    if let (Mode::Feed(feed), Some(point)) = (column.mode(), plot.report.intersection()) {
        let segments = [
            ("Feed line", (feed.xf, feed.xf), MAGENTA),
            ("Rectifying line", (column.xd(), column.xd()), GREEN),
            ("Stripping line", (column.xb(), column.xb()), CYAN),
        ];
        for (label, start, color) in segments {
            chart
                .draw_series(LineSeries::new(vec![start, (point.x, point.y)], color))
                .map_err(plot_error)?
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
    }

    let staircase = plot.report.path.vertices().into_iter().map(|p| (p.x, p.y));
    chart
        .draw_series(LineSeries::new(staircase, RED.stroke_width(2)))
        .map_err(plot_error)?
        .label("Stages")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    if plot.show_points {
        let mut marks = vec![("xD", column.xd()), ("xB", column.xb())];
        if let Mode::Feed(feed) = column.mode() {
            marks.push(("xF", feed.xf));
        }
        chart
            .draw_series(marks.into_iter().map(|(label, x)| {
                EmptyElement::at((x, x))
                    + Circle::new((0, 0), 4, RED.filled())
                    + Text::new(label, (6, 4), (FONT, 14).into_font())
            }))
            .map_err(plot_error)?;
    }

    let (inputs, outputs) = summary_lines(plot.report);
    for (left, lines) in [(0.55, inputs), (0.78, outputs)] {
        let height = 0.035 * lines.len() as f64 + 0.02;
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(left, 0.03), (left + 0.2, 0.03 + height)],
                GREEN.mix(0.2).filled(),
            )))
            .map_err(plot_error)?;
        chart
            .draw_series(lines.into_iter().enumerate().map(|(i, line)| {
                let y = 0.03 + height - 0.01 - 0.035 * (i as f64 + 0.8);
                Text::new(line, (left + 0.01, y), (FONT, 14).into_font())
            }))
            .map_err(plot_error)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_error)?;

    root.present().map_err(plot_error)
}

// =============================================================================
// PHASE DIAGRAMS
// =============================================================================

/// Pxy or Txy diagram: bubble line (x, value) and dew line (y, value).
pub struct PhaseDiagramPlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bubble: Vec<(f64, f64)>,
    pub dew: Vec<(f64, f64)>,
}

/// Render a Pxy or Txy diagram to an SVG file.
pub fn render_phase_diagram(path: &Path, plot: &PhaseDiagramPlot) -> McCabeResult<()> {
    let values = plot.bubble.iter().chain(&plot.dew).map(|&(_, v)| v);
    let (low, high) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !low.is_finite() || !high.is_finite() {
        return Err(McCabeError::Io("Nothing to plot".to_string()));
    }
    let pad = ((high - low) * 0.05).max(1e-6);

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&plot.title, (FONT, 24))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..1.0, (low - pad)..(high + pad))
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc(plot.x_label.as_str())
        .y_desc(plot.y_label.as_str())
        .draw()
        .map_err(plot_error)?;

    chart
        .draw_series(LineSeries::new(plot.bubble.iter().copied(), BLUE.stroke_width(2)))
        .map_err(plot_error)?
        .label("Bubble (x)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart
        .draw_series(LineSeries::new(plot.dew.iter().copied(), RED.stroke_width(2)))
        .map_err(plot_error)?
        .label("Dew (y)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_error)?;

    root.present().map_err(plot_error)
}

/// Render an xy equilibrium diagram from samples.
pub fn render_xy(path: &Path, title: &str, component: &str, samples: &[(f64, f64)]) -> McCabeResult<()> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, (FONT, 24))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc(format!("x of {}", component))
        .y_desc(format!("y of {}", component))
        .draw()
        .map_err(plot_error)?;

    chart
        .draw_series(LineSeries::new(samples.iter().copied(), BLUE.stroke_width(2)))
        .map_err(plot_error)?;
    chart
        .draw_series(LineSeries::new(vec![(0.0, 0.0), (1.0, 1.0)], &BLACK))
        .map_err(plot_error)?;

    root.present().map_err(plot_error)
}
