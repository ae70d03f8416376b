//! # Run Configuration
//!
//! A McCabe-Thiele run described in TOML, with the same keys as the
//! `mccabe stages` options:
//!
//! ```toml
//! comp1 = "benzene"
//! comp2 = "toluene"
//! pressure = 1.01325   # bar
//! xd = 0.95
//! xb = 0.05
//! xf = 0.5
//! reflux = 2.0
//! q = 1.0
//! kij = 0.0          # binary interaction parameter
//! fit = "polynomial"   # or "piecewise_linear"
//! plot = "benzene-toluene.svg"
//! ```
//!
//! Options given on the command line override the file.

use mccabe_core::{
    Column, ConfigError, Conditions, CurveFit, McCabeError, McCabeResult, Mode, RelativeVolatility,
    StageStepper, StepperConfig, stepper::DEFAULT_MAX_STAGES, vle::DEFAULT_POINTS,
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Pascal per bar.
pub const PASCAL_PER_BAR: f64 = 1.0e5;

/// How equilibrium samples are turned into a curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FitMethod {
    /// Least-squares polynomial of `degree`.
    #[default]
    Polynomial,
    /// Straight segments between samples.
    PiecewiseLinear,
}

/// Every option of a stepping run. All keys are optional so that files and
/// command-line flags can be layered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comp1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comp2: Option<String>,
    /// Constant relative volatility, used instead of components.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub xd: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xf: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reflux: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<f64>,

    /// Pressure [bar].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    /// Temperature [K].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Peng-Robinson binary interaction parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kij: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_stages: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit: Option<FitMethod>,
    /// Polynomial degree for the equilibrium fit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<usize>,
    /// Number of equilibrium samples.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<usize>,

    /// SVG output path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<PathBuf>,
    /// Annotate xd, xb and xf on the plot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_points: Option<bool>,
}

/// Where the equilibrium curve comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum EquilibriumSource {
    /// Ideal mixture with constant relative volatility.
    Volatility(RelativeVolatility),
    /// Peng-Robinson data for two database components.
    Components {
        comp1: String,
        comp2: String,
        conditions: Conditions,
        kij: f64,
    },
}

impl RunConfig {
    /// Load a run file.
    pub fn from_file(path: &Path) -> McCabeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            McCabeError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse a run document.
    pub fn from_toml_str(text: &str) -> McCabeResult<Self> {
        toml::from_str(text).map_err(|e| McCabeError::Parse(e.to_string()))
    }

    /// Layer `overrides` on top of `self`; set values in `overrides` win.
    #[must_use]
    pub fn merge(self, overrides: RunConfig) -> RunConfig {
        RunConfig {
            comp1: overrides.comp1.or(self.comp1),
            comp2: overrides.comp2.or(self.comp2),
            alpha: overrides.alpha.or(self.alpha),
            xd: overrides.xd.or(self.xd),
            xb: overrides.xb.or(self.xb),
            xf: overrides.xf.or(self.xf),
            reflux: overrides.reflux.or(self.reflux),
            q: overrides.q.or(self.q),
            pressure: overrides.pressure.or(self.pressure),
            temperature: overrides.temperature.or(self.temperature),
            kij: overrides.kij.or(self.kij),
            efficiency: overrides.efficiency.or(self.efficiency),
            max_stages: overrides.max_stages.or(self.max_stages),
            fit: overrides.fit.or(self.fit),
            degree: overrides.degree.or(self.degree),
            points: overrides.points.or(self.points),
            plot: overrides.plot.or(self.plot),
            show_points: overrides.show_points.or(self.show_points),
        }
    }

    /// Decide between a relative volatility and a component pair.
    pub fn equilibrium_source(&self) -> McCabeResult<EquilibriumSource> {
        match (self.alpha, &self.comp1, &self.comp2) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(invalid(
                "use either a relative volatility or a component pair, not both",
            )),
            (Some(_), None, None) if self.kij.is_some() => {
                Err(invalid("kij applies to a component pair, not to alpha"))
            }
            (Some(alpha), None, None) => {
                Ok(EquilibriumSource::Volatility(RelativeVolatility::new(alpha)?))
            }
            (None, Some(comp1), Some(comp2)) => {
                let pressure = self.pressure.map(|bar| bar * PASCAL_PER_BAR);
                let conditions = Conditions::from_parts(pressure, self.temperature)?;
                Ok(EquilibriumSource::Components {
                    comp1: comp1.clone(),
                    comp2: comp2.clone(),
                    conditions,
                    kij: self.kij.unwrap_or(0.0),
                })
            }
            (None, Some(_), None) | (None, None, Some(_)) => {
                Err(invalid("both comp1 and comp2 are required"))
            }
            (None, None, None) => Err(invalid(
                "an equilibrium source is required: comp1 and comp2, or alpha",
            )),
        }
    }

    /// Validated column with its mode and efficiency.
    pub fn column(&self) -> McCabeResult<Column> {
        let xd = self.xd.ok_or_else(|| invalid("xd is required"))?;
        let xb = self.xb.ok_or_else(|| invalid("xb is required"))?;
        let mode = Mode::from_parts(self.reflux, self.q, self.xf)?;
        let column = Column::new(xd, xb, mode)?;
        match self.efficiency {
            Some(efficiency) => Ok(column.with_efficiency(efficiency)?),
            None => Ok(column),
        }
    }

    /// Stepper honoring `max_stages`.
    #[must_use]
    pub fn stepper(&self) -> StageStepper {
        StageStepper::with_config(StepperConfig {
            max_stages: self.max_stages.unwrap_or(DEFAULT_MAX_STAGES),
            ..StepperConfig::default()
        })
    }

    /// Fit method; `degree` only matters for polynomials.
    #[must_use]
    pub fn curve_fit(&self) -> CurveFit {
        match (self.fit.unwrap_or_default(), self.degree) {
            (FitMethod::PiecewiseLinear, _) => CurveFit::PiecewiseLinear,
            (FitMethod::Polynomial, Some(degree)) => CurveFit::Polynomial { degree },
            (FitMethod::Polynomial, None) => CurveFit::default(),
        }
    }

    #[must_use]
    pub fn sample_points(&self) -> usize {
        self.points.unwrap_or(DEFAULT_POINTS)
    }

    #[must_use]
    pub fn show_points(&self) -> bool {
        self.show_points.unwrap_or(true)
    }
}

fn invalid(message: &str) -> McCabeError {
    ConfigError::InvalidParameter(message.to_string()).into()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_run_file() {
        let config = RunConfig::from_toml_str(
            r#"
            comp1 = "benzene"
            comp2 = "toluene"
            pressure = 1.01325
            xd = 0.95
            xb = 0.05
            xf = 0.5
            reflux = 2.0
            q = 1.0
            "#,
        )
        .expect("config");

        assert_eq!(config.comp1.as_deref(), Some("benzene"));
        assert_eq!(
            config.equilibrium_source().expect("source"),
            EquilibriumSource::Components {
                comp1: "benzene".to_string(),
                comp2: "toluene".to_string(),
                conditions: Conditions::Isobaric {
                    pressure: 1.01325 * PASCAL_PER_BAR
                },
                kij: 0.0,
            }
        );
        assert!(matches!(config.column().expect("column").mode(), Mode::Feed(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = RunConfig::from_toml_str("reflux_ratio = 2.0");
        assert!(matches!(result, Err(McCabeError::Parse(_))));
    }

    #[test]
    fn overrides_win() {
        let file = RunConfig {
            xd: Some(0.9),
            xb: Some(0.1),
            alpha: Some(2.0),
            ..RunConfig::default()
        };
        let flags = RunConfig {
            xd: Some(0.95),
            ..RunConfig::default()
        };
        let merged = file.merge(flags);
        assert_eq!(merged.xd, Some(0.95));
        assert_eq!(merged.xb, Some(0.1));
        assert_eq!(merged.alpha, Some(2.0));
    }

    #[test]
    fn source_must_be_unambiguous() {
        let both = RunConfig {
            alpha: Some(2.0),
            comp1: Some("benzene".to_string()),
            ..RunConfig::default()
        };
        assert!(both.equilibrium_source().expect_err("ambiguous").is_configuration());

        let none = RunConfig::default();
        assert!(none.equilibrium_source().expect_err("missing").is_configuration());
    }

    #[test]
    fn components_need_exactly_one_condition() {
        let config = RunConfig {
            comp1: Some("benzene".to_string()),
            comp2: Some("toluene".to_string()),
            pressure: Some(1.0),
            temperature: Some(350.0),
            ..RunConfig::default()
        };
        assert!(matches!(
            config.equilibrium_source(),
            Err(McCabeError::Configuration(ConfigError::ConflictingConditions))
        ));
    }

    #[test]
    fn fit_and_interaction_keys() {
        let config = RunConfig::from_toml_str(
            r#"
            comp1 = "methanol"
            comp2 = "water"
            temperature = 340.0
            kij = -0.08
            fit = "piecewise_linear"
            degree = 12
            "#,
        )
        .expect("config");

        assert_eq!(config.curve_fit(), CurveFit::PiecewiseLinear);
        assert!(matches!(
            config.equilibrium_source().expect("source"),
            EquilibriumSource::Components { kij, .. } if kij == -0.08
        ));

        let polynomial = RunConfig {
            fit: Some(FitMethod::Polynomial),
            degree: Some(12),
            ..RunConfig::default()
        };
        assert_eq!(polynomial.curve_fit(), CurveFit::Polynomial { degree: 12 });
    }

    #[test]
    fn interaction_needs_components() {
        let config = RunConfig {
            alpha: Some(2.5),
            kij: Some(0.1),
            ..RunConfig::default()
        };
        assert!(config.equilibrium_source().expect_err("kij").is_configuration());
    }

    #[test]
    fn partial_feed_is_rejected() {
        let config = RunConfig {
            xd: Some(0.9),
            xb: Some(0.1),
            reflux: Some(2.0),
            ..RunConfig::default()
        };
        assert!(matches!(
            config.column(),
            Err(McCabeError::Configuration(ConfigError::IncompleteFeed(_)))
        ));
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = RunConfig::default();
        assert_eq!(config.sample_points(), DEFAULT_POINTS);
        assert_eq!(config.curve_fit(), CurveFit::default());
        assert_eq!(config.stepper().config().max_stages, DEFAULT_MAX_STAGES);
        assert!(config.show_points());
    }
}
