//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::{EquilibriumSource, PASCAL_PER_BAR, RunConfig};
use crate::output::{ComponentOutput, DiagramPoint, StagesOutput, VleOutput, to_json};
use crate::render::{
    McCabePlot, PhaseDiagramPlot, render_mccabe_thiele, render_phase_diagram, render_xy,
};
use mccabe_core::{
    BubblePoint, ComponentDatabase, Conditions, EquilibriumCurve, EquilibriumDataProvider,
    McCabeError, McCabeResult, Mode, Outcome, PengRobinsonProvider, StageReport,
};
use std::path::{Path, PathBuf};

/// Maximum size of an extra component database (1 MB).
const MAX_DATABASE_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// DATABASE
// =============================================================================

/// Built-in components plus the optional extra database file.
pub fn load_database(extra: Option<&Path>) -> McCabeResult<ComponentDatabase> {
    let mut database = ComponentDatabase::builtin()?;
    let Some(path) = extra else {
        return Ok(database);
    };

    let metadata = std::fs::metadata(path).map_err(|e| {
        McCabeError::Io(format!("Cannot read database '{}': {}", path.display(), e))
    })?;
    if metadata.len() > MAX_DATABASE_FILE_SIZE {
        return Err(McCabeError::Io(format!(
            "Database size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_DATABASE_FILE_SIZE
        )));
    }

    let text = std::fs::read_to_string(path).map_err(|e| {
        McCabeError::Io(format!("Cannot read database '{}': {}", path.display(), e))
    })?;
    let extra = ComponentDatabase::from_toml_str(&text)?;
    tracing::info!("Loaded {} extra components from {:?}", extra.len(), path);
    database.extend(extra);
    Ok(database)
}

/// Validate that the output directory exists.
fn validate_output_path(path: &Path) -> McCabeResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if parent.is_dir() {
        Ok(())
    } else {
        Err(McCabeError::Io(format!(
            "Output directory '{}' does not exist",
            parent.display()
        )))
    }
}

// =============================================================================
// STAGES COMMAND
// =============================================================================

/// Build the equilibrium curve a run asks for.
fn build_curve(
    config: &RunConfig,
    database: Option<&Path>,
) -> McCabeResult<(Box<dyn EquilibriumCurve>, StagesLabel)> {
    match config.equilibrium_source()? {
        EquilibriumSource::Volatility(curve) => {
            let label = StagesLabel::Volatility(curve.alpha());
            Ok((Box::new(curve), label))
        }
        EquilibriumSource::Components {
            comp1,
            comp2,
            conditions,
            kij,
        } => {
            let database = load_database(database)?;
            let provider =
                PengRobinsonProvider::from_database(&database, &comp1, &comp2, conditions)?
                    .with_interaction(kij)?;
            let points = config.sample_points();
            tracing::debug!("Generating {} equilibrium samples at {:?}", points, conditions);
            let samples = provider.equilibrium_curve(points)?;
            let curve = config.curve_fit().fit(&samples)?;

            let [first, second] = provider.model().components();
            let label = StagesLabel::Components(
                first.display_name().to_string(),
                second.display_name().to_string(),
            );
            Ok((curve, label))
        }
    }
}

/// What the equilibrium curve was built from, for titles and output.
#[derive(Debug, Clone)]
enum StagesLabel {
    Volatility(f64),
    Components(String, String),
}

impl StagesLabel {
    fn title(&self) -> String {
        match self {
            StagesLabel::Volatility(alpha) => {
                format!("McCabe-Thiele Method for alpha = {:.2}", alpha)
            }
            StagesLabel::Components(first, second) => {
                format!("McCabe-Thiele Method for {} + {}", first, second)
            }
        }
    }

    fn light_component(&self) -> &str {
        match self {
            StagesLabel::Volatility(_) => "(light key)",
            StagesLabel::Components(first, _) => first,
        }
    }
}

/// Step off stages for a resolved run.
pub fn cmd_stages(
    config: &RunConfig,
    database: Option<&Path>,
    json_mode: bool,
) -> McCabeResult<()> {
    let column = config.column()?;
    let (curve, label) = build_curve(config, database)?;

    tracing::info!(
        "Stepping from xd = {} to xb = {} ({})",
        column.xd(),
        column.xb(),
        match column.mode() {
            Mode::TotalReflux => "total reflux",
            Mode::Feed(_) => "feed",
        }
    );
    let report = config.stepper().run(curve.as_ref(), &column);
    log_outcome(&report);

    if let Some(path) = &config.plot {
        validate_output_path(path)?;
        render_mccabe_thiele(
            path,
            &McCabePlot {
                title: label.title(),
                component: label.light_component().to_string(),
                curve: curve.as_ref(),
                report: &report,
                show_points: config.show_points(),
            },
        )?;
        tracing::info!("Diagram written to {:?}", path);
    }

    if json_mode {
        let output = StagesOutput::from_report(&report);
        let output = match &label {
            StagesLabel::Volatility(alpha) => output.with_alpha(*alpha),
            StagesLabel::Components(first, second) => output.with_components(first, second),
        };
        println!("{}", to_json(&output));
        return Ok(());
    }

    print_report(&report, &label);
    Ok(())
}

fn log_outcome(report: &StageReport) {
    match report.outcome {
        Outcome::Converged => tracing::info!("Converged in {} stages", report.stages),
        Outcome::Infeasible { x, y } => tracing::warn!(
            "Construction blocked at ({:.4}, {:.4}) after {} stages",
            x,
            y,
            report.stages
        ),
        Outcome::StageLimitReached { limit } => {
            tracing::warn!("Stage cap of {} reached before xb", limit);
        }
    }
}

fn print_report(report: &StageReport, label: &StagesLabel) {
    println!("{}", label.title());
    println!("{}", "=".repeat(label.title().len()));
    println!("xD:         {:.4}", report.column.xd());
    println!("xB:         {:.4}", report.column.xb());
    if let Mode::Feed(feed) = report.column.mode() {
        println!("xF:         {:.4}", feed.xf);
        println!("R:          {:.4}", feed.reflux);
        println!("q:          {:.4}", feed.q);
    }
    if report.column.efficiency() < 1.0 {
        println!("Efficiency: {:.2}", report.column.efficiency());
    }
    println!();

    match report.outcome {
        Outcome::Converged => println!("Stages:     {}", report.stages),
        Outcome::Infeasible { x, y } => println!(
            "Stages:     {} (infeasible: blocked at x = {:.4}, y = {:.4})",
            report.stages, x, y
        ),
        Outcome::StageLimitReached { limit } => {
            println!("Stages:     {} (stage cap {} reached)", report.stages, limit);
        }
    }
    if let Some(feed_stage) = report.feed_stage {
        println!("Feed stage: {}", feed_stage);
    }
    if let Some(point) = report.intersection() {
        println!("xsol, ysol: {:.4}, {:.4}", point.x, point.y);
    }

    println!();
    println!("Stage  x          y");
    for (i, step) in report.path.steps().iter().enumerate() {
        println!(
            "{:>5}  {:<9.6}  {:<9.6}",
            i + 1,
            step.equilibrium.x,
            step.equilibrium.y
        );
    }
}

// =============================================================================
// VLE COMMAND
// =============================================================================

/// Parameters of `mccabe vle`.
#[derive(Debug, Clone)]
pub struct VleRequest {
    pub comp1: String,
    pub comp2: String,
    /// Temperature of the Pxy diagram [K].
    pub temperature: f64,
    /// Pressure of the Txy diagram [bar].
    pub pressure_bar: f64,
    /// Binary interaction parameter.
    pub kij: f64,
    pub points: usize,
    pub plot_dir: Option<PathBuf>,
}

/// Compute Pxy and Txy diagrams.
pub fn cmd_vle(request: &VleRequest, database: Option<&Path>, json_mode: bool) -> McCabeResult<()> {
    let database = load_database(database)?;
    let pressure = request.pressure_bar * PASCAL_PER_BAR;
    let conditions = Conditions::from_parts(Some(pressure), None)?;
    let provider =
        PengRobinsonProvider::from_database(&database, &request.comp1, &request.comp2, conditions)?
            .with_interaction(request.kij)?;
    let [first, second] = provider.model().components();

    tracing::info!(
        "Peng-Robinson diagrams for {} + {} (kij = {})",
        first.display_name(),
        second.display_name(),
        request.kij
    );
    let pxy = provider.pxy(request.temperature, request.points)?;
    let txy = provider.txy(pressure, request.points)?;

    if let Some(dir) = &request.plot_dir {
        render_vle(dir, request, first.display_name(), second.display_name(), &pxy, &txy)?;
    }

    let output = VleOutput {
        comp1: first.display_name().to_string(),
        comp2: second.display_name().to_string(),
        temperature: request.temperature,
        pressure_bar: request.pressure_bar,
        pxy: pxy.iter().map(DiagramPoint::from).collect(),
        txy: txy.iter().map(DiagramPoint::from).collect(),
    };

    if json_mode {
        println!("{}", to_json(&output));
        return Ok(());
    }

    println!("Pxy at {} K", request.temperature);
    println!("x          y          P [bar]");
    for point in &output.pxy {
        println!("{:<9.6}  {:<9.6}  {:.5}", point.x, point.y, point.pressure_bar);
    }
    println!();
    println!("Txy at {} bar", request.pressure_bar);
    println!("x          y          T [K]");
    for point in &output.txy {
        println!("{:<9.6}  {:<9.6}  {:.3}", point.x, point.y, point.temperature);
    }
    Ok(())
}

fn render_vle(
    dir: &Path,
    request: &VleRequest,
    first: &str,
    second: &str,
    pxy: &[BubblePoint],
    txy: &[BubblePoint],
) -> McCabeResult<()> {
    if !dir.is_dir() {
        return Err(McCabeError::Io(format!(
            "Plot directory '{}' does not exist",
            dir.display()
        )));
    }

    render_phase_diagram(
        &dir.join("pxy.svg"),
        &PhaseDiagramPlot {
            title: format!(
                "Pxy diagram for {} + {} at {} K",
                first, second, request.temperature
            ),
            x_label: format!("x and y of {}", first),
            y_label: "pressure, P (bar)".to_string(),
            bubble: pxy.iter().map(|p| (p.x, p.pressure / PASCAL_PER_BAR)).collect(),
            dew: pxy.iter().map(|p| (p.y, p.pressure / PASCAL_PER_BAR)).collect(),
        },
    )?;
    render_phase_diagram(
        &dir.join("txy.svg"),
        &PhaseDiagramPlot {
            title: format!(
                "Txy diagram for {} + {} at {:.2} bar",
                first, second, request.pressure_bar
            ),
            x_label: format!("x and y of {}", first),
            y_label: "temperature, T (K)".to_string(),
            bubble: txy.iter().map(|p| (p.x, p.temperature)).collect(),
            dew: txy.iter().map(|p| (p.y, p.temperature)).collect(),
        },
    )?;
    let samples: Vec<(f64, f64)> = txy.iter().map(|p| (p.x, p.y)).collect();
    render_xy(
        &dir.join("xy.svg"),
        &format!("xy diagram for {} + {}", first, second),
        first,
        &samples,
    )?;

    tracing::info!("Diagrams written to {:?}", dir);
    Ok(())
}

// =============================================================================
// LOOKUP COMMAND
// =============================================================================

/// Show one database component.
pub fn cmd_lookup(identifier: &str, database: Option<&Path>, json_mode: bool) -> McCabeResult<()> {
    let database = load_database(database)?;
    let output = ComponentOutput::from(database.lookup(identifier)?);

    if json_mode {
        println!("{}", to_json(&output));
        return Ok(());
    }

    println!("Component:  {}", output.name);
    println!("IUPAC name: {}", output.iupac_name);
    println!("CAS name:   {}", output.cas_name);
    println!("CAS number: {}", output.cas_number);
    println!("SMILES:     {}", output.smiles);
    println!("Tc:         {:.2} K", output.tc_kelvin);
    println!("Pc:         {:.3} bar", output.pc_bar);
    println!("omega:      {:.3}", output.omega);
    Ok(())
}
