//! # Component Database
//!
//! Critical properties (Tc, Pc, omega) keyed by several identifiers.
//!
//! Lookup is case-insensitive for names and CAS numbers and tries, in order:
//! IUPAC name, common name, CAS index name, SMILES, CAS registry number.
//! SMILES are matched exactly since their case carries meaning
//! (`c1ccccc1` is benzene, `C1CCCCC1` is cyclohexane).

use crate::types::{McCabeError, McCabeResult};
use serde::{Deserialize, Serialize};

const BUILTIN_COMPONENTS: &str = include_str!("components.toml");

/// A pure component with its critical constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Common material name.
    pub name: String,
    #[serde(default)]
    pub cas_name: String,
    #[serde(default)]
    pub iupac_name: String,
    #[serde(default)]
    pub smiles: String,
    #[serde(default)]
    pub cas_number: String,
    /// Critical temperature [K].
    pub tc: f64,
    /// Critical pressure [Pa].
    pub pc: f64,
    /// Acentric factor.
    pub omega: f64,
}

impl Component {
    /// Name used on plots: the IUPAC name when known.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.iupac_name.is_empty() {
            &self.name
        } else {
            &self.iupac_name
        }
    }

    fn validate(&self) -> McCabeResult<()> {
        let valid = self.tc.is_finite()
            && self.tc > 0.0
            && self.pc.is_finite()
            && self.pc > 0.0
            && self.omega.is_finite();
        if valid {
            Ok(())
        } else {
            Err(McCabeError::Parse(format!(
                "component '{}' has invalid critical properties",
                self.name
            )))
        }
    }
}

#[derive(Debug, Deserialize)]
struct DatabaseDocument {
    #[serde(rename = "component", default)]
    components: Vec<Component>,
}

/// In-memory table of components.
#[derive(Debug, Clone, Default)]
pub struct ComponentDatabase {
    components: Vec<Component>,
}

impl ComponentDatabase {
    /// The components shipped with the crate.
    pub fn builtin() -> McCabeResult<Self> {
        Self::from_toml_str(BUILTIN_COMPONENTS)
    }

    /// Parse a TOML document of `[[component]]` tables.
    pub fn from_toml_str(document: &str) -> McCabeResult<Self> {
        let parsed: DatabaseDocument =
            toml::from_str(document).map_err(|e| McCabeError::Parse(e.to_string()))?;
        for component in &parsed.components {
            component.validate()?;
        }
        Ok(Self {
            components: parsed.components,
        })
    }

    /// Add components from another database. Later entries win lookups on
    /// the same identifier.
    pub fn extend(&mut self, other: ComponentDatabase) {
        let mut merged = other.components;
        merged.append(&mut self.components);
        self.components = merged;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    /// Find a component by any of its identifiers.
    pub fn lookup(&self, identifier: &str) -> McCabeResult<&Component> {
        let wanted = identifier.trim();
        let lowered = wanted.to_lowercase();
        let by_name = |field: fn(&Component) -> &str| {
            self.components
                .iter()
                .find(|c| !field(c).is_empty() && field(c).to_lowercase() == lowered)
        };

        by_name(|c| c.iupac_name.as_str())
            .or_else(|| by_name(|c| c.name.as_str()))
            .or_else(|| by_name(|c| c.cas_name.as_str()))
            .or_else(|| self.components.iter().find(|c| c.smiles == wanted))
            .or_else(|| by_name(|c| c.cas_number.as_str()))
            .ok_or_else(|| McCabeError::Lookup(identifier.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
