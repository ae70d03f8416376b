//! # Vapor-Liquid Equilibrium
//!
//! Equilibrium samples for a binary mixture, generated from a
//! [`PengRobinson`] model at fixed pressure or fixed temperature.
//!
//! The stepping engine never depends on this module: it consumes an
//! [`EquilibriumCurve`](crate::equilibrium::EquilibriumCurve) built from the
//! samples through [`CurveFit`](crate::equilibrium::CurveFit).

mod component;
mod peng_robinson;

pub use component::{Component, ComponentDatabase};
pub use peng_robinson::{
    BubblePoint, GAS_CONSTANT, PengRobinson, Phase, cubic_roots, wilson_vapor_pressure,
};

use crate::types::{ConfigError, McCabeResult, ensure_finite};
use serde::{Deserialize, Serialize};

/// Default number of samples on an equilibrium curve.
pub const DEFAULT_POINTS: usize = 101;

/// The state variable held fixed while the other is solved for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conditions {
    /// Fixed pressure [Pa]; bubble temperatures are solved.
    Isobaric { pressure: f64 },
    /// Fixed temperature [K]; bubble pressures are solved.
    Isothermal { temperature: f64 },
}

impl Conditions {
    /// Build from optional pressure [Pa] and temperature [K]. Exactly one
    /// must be present.
    pub fn from_parts(pressure: Option<f64>, temperature: Option<f64>) -> Result<Self, ConfigError> {
        match (pressure, temperature) {
            (None, None) => Err(ConfigError::MissingConditions),
            (Some(_), Some(_)) => Err(ConfigError::ConflictingConditions),
            (Some(pressure), None) => {
                let pressure = positive("pressure", pressure)?;
                Ok(Self::Isobaric { pressure })
            }
            (None, Some(temperature)) => {
                let temperature = positive("temperature", temperature)?;
                Ok(Self::Isothermal { temperature })
            }
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    let value = ensure_finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

/// Source of (x, y) equilibrium samples.
pub trait EquilibriumDataProvider {
    /// `points` samples sorted ascending by x, including x = 0 and x = 1.
    fn equilibrium_curve(&self, points: usize) -> McCabeResult<Vec<(f64, f64)>>;
}

/// Evenly spaced liquid compositions from 0 to 1 inclusive.
fn compositions(points: usize) -> Result<Vec<f64>, ConfigError> {
    if points < 2 {
        return Err(ConfigError::InvalidSamples(format!(
            "need at least 2 points, got {}",
            points
        )));
    }
    let last = (points - 1) as f64;
    Ok((0..points).map(|i| i as f64 / last).collect())
}

/// Equilibrium data from a Peng-Robinson mixture at fixed conditions.
#[derive(Debug, Clone)]
pub struct PengRobinsonProvider {
    model: PengRobinson,
    conditions: Conditions,
}

impl PengRobinsonProvider {
    #[must_use]
    pub fn new(model: PengRobinson, conditions: Conditions) -> Self {
        Self { model, conditions }
    }

    /// Look both components up in `database`.
    pub fn from_database(
        database: &ComponentDatabase,
        first: &str,
        second: &str,
        conditions: Conditions,
    ) -> McCabeResult<Self> {
        let model = PengRobinson::new(
            database.lookup(first)?.clone(),
            database.lookup(second)?.clone(),
        );
        Ok(Self::new(model, conditions))
    }

    /// Same components with a binary interaction parameter.
    pub fn with_interaction(self, kij: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            model: self.model.with_interaction(kij)?,
            conditions: self.conditions,
        })
    }

    #[must_use]
    pub fn model(&self) -> &PengRobinson {
        &self.model
    }

    #[must_use]
    pub fn conditions(&self) -> Conditions {
        self.conditions
    }

    /// Bubble point at liquid composition `x` under the fixed conditions.
    pub fn bubble_point(&self, x: f64) -> McCabeResult<BubblePoint> {
        match self.conditions {
            Conditions::Isobaric { pressure } => self.model.bubble_temperature(pressure, x),
            Conditions::Isothermal { temperature } => self.model.bubble_pressure(temperature, x),
        }
    }

    /// Pressure-composition diagram at `temperature` [K].
    pub fn pxy(&self, temperature: f64, points: usize) -> McCabeResult<Vec<BubblePoint>> {
        compositions(points)?
            .into_iter()
            .map(|x| self.model.bubble_pressure(temperature, x))
            .collect()
    }

    /// Temperature-composition diagram at `pressure` [Pa].
    pub fn txy(&self, pressure: f64, points: usize) -> McCabeResult<Vec<BubblePoint>> {
        compositions(points)?
            .into_iter()
            .map(|x| self.model.bubble_temperature(pressure, x))
            .collect()
    }
}

impl EquilibriumDataProvider for PengRobinsonProvider {
    fn equilibrium_curve(&self, points: usize) -> McCabeResult<Vec<(f64, f64)>> {
        compositions(points)?
            .into_iter()
            .map(|x| self.bubble_point(x).map(|point| (point.x, point.y)))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(conditions: Conditions) -> PengRobinsonProvider {
        let db = ComponentDatabase::builtin().expect("builtin");
        PengRobinsonProvider::from_database(&db, "benzene", "toluene", conditions)
            .expect("provider")
    }

    #[test]
    fn conditions_need_exactly_one_value() {
        assert_eq!(
            Conditions::from_parts(None, None),
            Err(ConfigError::MissingConditions)
        );
        assert_eq!(
            Conditions::from_parts(Some(1e5), Some(300.0)),
            Err(ConfigError::ConflictingConditions)
        );
        assert_eq!(
            Conditions::from_parts(Some(1e5), None),
            Ok(Conditions::Isobaric { pressure: 1e5 })
        );
        assert_eq!(
            Conditions::from_parts(None, Some(300.0)),
            Ok(Conditions::Isothermal { temperature: 300.0 })
        );
    }

    #[test]
    fn negative_temperature_is_rejected() {
        assert!(matches!(
            Conditions::from_parts(None, Some(-1.0)),
            Err(ConfigError::InvalidParameter(_))
        ));
    }

    #[test]
    fn unknown_component_fails_lookup() {
        let db = ComponentDatabase::builtin().expect("builtin");
        let result = PengRobinsonProvider::from_database(
            &db,
            "benzene",
            "unobtainium",
            Conditions::Isobaric { pressure: 1e5 },
        );
        assert!(matches!(result, Err(crate::McCabeError::Lookup(_))));
    }

    #[test]
    fn isobaric_curve_spans_the_unit_interval() {
        let curve = provider(Conditions::Isobaric { pressure: 101_325.0 })
            .equilibrium_curve(11)
            .expect("curve");

        assert_eq!(curve.len(), 11);
        assert_eq!(curve[0].0, 0.0);
        assert_eq!(curve[10].0, 1.0);
        assert!(curve[0].1.abs() < 1e-9);
        assert!((curve[10].1 - 1.0).abs() < 1e-9);
        for window in curve.windows(2) {
            assert!(window[1].0 > window[0].0);
            assert!(window[1].1 > window[0].1);
        }
        for &(x, y) in &curve[1..10] {
            assert!(y > x);
        }
    }

    #[test]
    fn txy_temperatures_fall_toward_the_light_component() {
        let points = provider(Conditions::Isobaric { pressure: 101_325.0 })
            .txy(101_325.0, 5)
            .expect("txy");
        // Pure toluene near 383.6 K, pure benzene near 353.0 K.
        assert!((points[0].temperature - 383.6).abs() < 1.5);
        assert!((points[4].temperature - 353.0).abs() < 1.5);
        for window in points.windows(2) {
            assert!(window[1].temperature < window[0].temperature);
        }
    }

    #[test]
    fn pxy_pressures_rise_toward_the_light_component() {
        let points = provider(Conditions::Isothermal { temperature: 360.0 })
            .pxy(360.0, 5)
            .expect("pxy");
        for window in points.windows(2) {
            assert!(window[1].pressure > window[0].pressure);
        }
    }

    #[test]
    fn interaction_parameter_moves_the_curve() {
        let conditions = Conditions::Isothermal { temperature: 360.0 };
        let ideal = provider(conditions).equilibrium_curve(5).expect("curve");
        let shifted = provider(conditions)
            .with_interaction(0.05)
            .expect("kij")
            .equilibrium_curve(5)
            .expect("curve");

        assert!((shifted[2].1 - ideal[2].1).abs() > 1e-3);
        assert!((shifted[4].1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn too_few_points_is_a_configuration_error() {
        let result = provider(Conditions::Isothermal { temperature: 360.0 }).equilibrium_curve(1);
        assert!(matches!(result, Err(e) if e.is_configuration()));
    }
}
