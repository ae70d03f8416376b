//! # Output Types
//!
//! JSON structures printed in `--json-mode`.

use mccabe_core::{BubblePoint, Component, McCabeError, Mode, Outcome, Point, StageReport};
use serde::{Deserialize, Serialize};

// =============================================================================
// STAGES OUTPUT
// =============================================================================

/// Result of `mccabe stages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagesOutput {
    /// Light and heavy component, when database components were used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<(String, String)>,
    /// Relative volatility, when a constant alpha was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
    pub xd: f64,
    pub xb: f64,
    pub mode: Mode,
    pub efficiency: f64,
    pub stages: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_stage: Option<usize>,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intersection: Option<Point>,
    /// Liquid compositions xd, x1, x2, ...
    pub compositions: Vec<f64>,
    /// Staircase corners in drawing order.
    pub vertices: Vec<Point>,
}

impl StagesOutput {
    #[must_use]
    pub fn from_report(report: &StageReport) -> Self {
        Self {
            components: None,
            alpha: None,
            xd: report.column.xd(),
            xb: report.column.xb(),
            mode: *report.column.mode(),
            efficiency: report.column.efficiency(),
            stages: report.stages,
            feed_stage: report.feed_stage,
            outcome: report.outcome,
            intersection: report.intersection(),
            compositions: report.path.compositions(),
            vertices: report.path.vertices(),
        }
    }

    #[must_use]
    pub fn with_components(mut self, comp1: &str, comp2: &str) -> Self {
        self.components = Some((comp1.to_string(), comp2.to_string()));
        self
    }

    #[must_use]
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }
}

// =============================================================================
// VLE OUTPUT
// =============================================================================

/// One bubble point with pressure in bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagramPoint {
    pub x: f64,
    pub y: f64,
    pub temperature: f64,
    pub pressure_bar: f64,
}

impl From<&BubblePoint> for DiagramPoint {
    fn from(point: &BubblePoint) -> Self {
        Self {
            x: point.x,
            y: point.y,
            temperature: point.temperature,
            pressure_bar: point.pressure / crate::config::PASCAL_PER_BAR,
        }
    }
}

/// Result of `mccabe vle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VleOutput {
    pub comp1: String,
    pub comp2: String,
    /// Temperature of the Pxy diagram [K].
    pub temperature: f64,
    /// Pressure of the Txy diagram [bar].
    pub pressure_bar: f64,
    pub pxy: Vec<DiagramPoint>,
    pub txy: Vec<DiagramPoint>,
}

// =============================================================================
// COMPONENT OUTPUT
// =============================================================================

/// Result of `mccabe lookup`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentOutput {
    pub name: String,
    pub iupac_name: String,
    pub cas_name: String,
    pub cas_number: String,
    pub smiles: String,
    pub tc_kelvin: f64,
    pub pc_bar: f64,
    pub omega: f64,
}

impl From<&Component> for ComponentOutput {
    fn from(component: &Component) -> Self {
        Self {
            name: component.name.clone(),
            iupac_name: component.iupac_name.clone(),
            cas_name: component.cas_name.clone(),
            cas_number: component.cas_number.clone(),
            smiles: component.smiles.clone(),
            tc_kelvin: component.tc,
            pc_bar: component.pc / crate::config::PASCAL_PER_BAR,
            omega: component.omega,
        }
    }
}

// =============================================================================
// ERROR OUTPUT
// =============================================================================

/// Error body printed in `--json-mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorOutput {
    pub error: String,
    /// True when the inputs were at fault.
    pub configuration: bool,
}

impl From<&McCabeError> for ErrorOutput {
    fn from(error: &McCabeError) -> Self {
        Self {
            error: error.to_string(),
            configuration: error.is_configuration(),
        }
    }
}

/// Pretty JSON for any output type.
#[must_use]
pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
