//! Integration tests for run files, commands and SVG rendering.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use mccabe::cli::{VleRequest, cmd_lookup, cmd_stages, cmd_vle, load_database};
use mccabe::config::{FitMethod, RunConfig};
use mccabe::render::{McCabePlot, PhaseDiagramPlot, render_mccabe_thiele, render_phase_diagram};
use mccabe_core::{
    Column, FeedCondition, McCabeError, Mode, RelativeVolatility, StageStepper,
};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn alpha_run() -> RunConfig {
    RunConfig {
        alpha: Some(2.5),
        xd: Some(0.9),
        xb: Some(0.1),
        xf: Some(0.5),
        reflux: Some(2.0),
        q: Some(1.0),
        ..RunConfig::default()
    }
}

fn read_svg(path: &std::path::Path) -> String {
    let svg = std::fs::read_to_string(path).unwrap();
    assert!(svg.contains("<svg"), "not an SVG document");
    svg
}

// =============================================================================
// RUN FILE TESTS
// =============================================================================

#[test]
fn test_run_file_loading() {
    let file = write_temp(
        r#"
alpha = 2.5
xd = 0.9
xb = 0.1
max_stages = 50
show_points = false
"#,
    );

    let config = RunConfig::from_file(file.path()).unwrap();
    assert_eq!(config.alpha, Some(2.5));
    assert_eq!(config.max_stages, Some(50));
    assert!(!config.show_points());
    assert!(matches!(config.column().unwrap().mode(), Mode::TotalReflux));
}

#[test]
fn test_run_file_missing() {
    let result = RunConfig::from_file(std::path::Path::new("/nonexistent/run.toml"));
    assert!(matches!(result, Err(McCabeError::Io(_))));
}

#[test]
fn test_run_file_type_error() {
    let file = write_temp("xd = \"high\"\n");
    let result = RunConfig::from_file(file.path());
    assert!(matches!(result, Err(McCabeError::Parse(_))));
}

// =============================================================================
// DATABASE TESTS
// =============================================================================

#[test]
fn test_extra_database_is_merged() {
    let file = write_temp(
        r#"
[[component]]
name = "sulfur hexafluoride"
iupac_name = "hexafluoro-lambda6-sulfane"
cas_number = "2551-62-4"
tc = 318.7
pc = 3.76e6
omega = 0.21
"#,
    );

    let db = load_database(Some(file.path())).unwrap();
    assert_eq!(db.lookup("2551-62-4").unwrap().name, "sulfur hexafluoride");
    assert_eq!(db.lookup("benzene").unwrap().name, "benzene");
}

#[test]
fn test_lookup_command() {
    assert!(cmd_lookup("toluene", None, true).is_ok());
    assert!(matches!(
        cmd_lookup("unobtainium", None, false),
        Err(McCabeError::Lookup(_))
    ));
}

// =============================================================================
// COMMAND TESTS
// =============================================================================

#[test]
fn test_stages_command_writes_plot() {
    let dir = TempDir::new().unwrap();
    let plot = dir.path().join("stages.svg");
    let config = RunConfig {
        plot: Some(plot.clone()),
        ..alpha_run()
    };

    cmd_stages(&config, None, true).unwrap();
    let svg = read_svg(&plot);
    assert!(svg.contains("Feed stage = 4"));
}

#[test]
fn test_stages_command_rejects_bad_configuration() {
    let config = RunConfig {
        q: None,
        ..alpha_run()
    };
    let error = cmd_stages(&config, None, false).unwrap_err();
    assert!(error.is_configuration());
}

#[test]
fn test_stages_command_with_components() {
    let config = RunConfig {
        alpha: None,
        comp1: Some("benzene".to_string()),
        comp2: Some("toluene".to_string()),
        pressure: Some(1.01325),
        points: Some(41),
        degree: Some(12),
        ..alpha_run()
    };
    assert!(cmd_stages(&config, None, true).is_ok());
}

#[test]
fn test_stages_command_with_interaction_and_piecewise_fit() {
    let dir = TempDir::new().unwrap();
    let plot = dir.path().join("methanol-water.svg");
    let config = RunConfig {
        alpha: None,
        comp1: Some("methanol".to_string()),
        comp2: Some("water".to_string()),
        pressure: Some(1.0),
        kij: Some(0.02),
        fit: Some(FitMethod::PiecewiseLinear),
        points: Some(41),
        plot: Some(plot.clone()),
        ..alpha_run()
    };

    cmd_stages(&config, None, true).unwrap();
    read_svg(&plot);
}

#[test]
fn test_stages_command_rejects_interaction_with_alpha() {
    let config = RunConfig {
        kij: Some(0.1),
        ..alpha_run()
    };
    assert!(cmd_stages(&config, None, true).unwrap_err().is_configuration());
}

#[test]
fn test_stages_command_missing_output_directory() {
    let config = RunConfig {
        plot: Some("/nonexistent/dir/stages.svg".into()),
        ..alpha_run()
    };
    assert!(matches!(
        cmd_stages(&config, None, true),
        Err(McCabeError::Io(_))
    ));
}

#[test]
fn test_vle_command_writes_diagrams() {
    let dir = TempDir::new().unwrap();
    let request = VleRequest {
        comp1: "methanol".to_string(),
        comp2: "water".to_string(),
        temperature: 330.0,
        pressure_bar: 1.0,
        kij: 0.02,
        points: 11,
        plot_dir: Some(dir.path().to_path_buf()),
    };

    cmd_vle(&request, None, true).unwrap();
    for name in ["pxy.svg", "txy.svg", "xy.svg"] {
        read_svg(&dir.path().join(name));
    }
}

// =============================================================================
// RENDER TESTS
// =============================================================================

#[test]
fn test_render_total_reflux_without_points() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("total.svg");
    let curve = RelativeVolatility::new(3.0).unwrap();
    let column = Column::new(0.95, 0.05, Mode::TotalReflux).unwrap();
    let report = StageStepper::new().run(&curve, &column);

    render_mccabe_thiele(
        &path,
        &McCabePlot {
            title: "Total reflux".to_string(),
            component: "A".to_string(),
            curve: &curve,
            report: &report,
            show_points: false,
        },
    )
    .unwrap();

    let svg = read_svg(&path);
    assert!(svg.contains("Total reflux"));
    assert!(!svg.contains("Feed stage"));
}

#[test]
fn test_render_infeasible_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("blocked.svg");
    let curve = |x: f64| 0.6 + 0.3 * x;
    let feed = FeedCondition::new(2.0, 1.0, 0.5).unwrap();
    let column = Column::new(0.9, 0.1, Mode::Feed(feed)).unwrap();
    let report = StageStepper::new().run(&curve, &column);

    render_mccabe_thiele(
        &path,
        &McCabePlot {
            title: "Blocked".to_string(),
            component: "A".to_string(),
            curve: &curve,
            report: &report,
            show_points: true,
        },
    )
    .unwrap();

    assert!(read_svg(&path).contains("Infeasible"));
}

#[test]
fn test_render_phase_diagram_requires_data() {
    let dir = TempDir::new().unwrap();
    let plot = PhaseDiagramPlot {
        title: "empty".to_string(),
        x_label: "x".to_string(),
        y_label: "P".to_string(),
        bubble: vec![],
        dew: vec![],
    };
    assert!(render_phase_diagram(&dir.path().join("empty.svg"), &plot).is_err());
}
