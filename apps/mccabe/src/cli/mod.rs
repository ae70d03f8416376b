//! # McCabe CLI Module
//!
//! This module implements the command line interface.
//!
//! ## Available Commands
//!
//! - `stages` - Step off McCabe-Thiele stages
//! - `vle` - Pxy, Txy and xy diagrams from Peng-Robinson
//! - `lookup` - Show a component from the database

mod commands;

use crate::config::{FitMethod, RunConfig};
use clap::{Args, Parser, Subcommand};
use mccabe_core::McCabeError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// McCabe-Thiele stage stepping for binary distillation.
///
/// Equilibrium data comes from a constant relative volatility or from the
/// Peng-Robinson equation of state for two database components.
#[derive(Parser, Debug)]
#[command(name = "mccabe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Extra component database (TOML, `[[component]]` tables)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Step off equilibrium stages
    Stages(StagesArgs),

    /// Generate Pxy, Txy and xy diagrams
    Vle {
        /// Light component (database identifier)
        #[arg(long)]
        comp1: String,

        /// Heavy component (database identifier)
        #[arg(long)]
        comp2: String,

        /// Temperature of the Pxy diagram [K]
        #[arg(short = 'T', long, default_value = "298")]
        temperature: f64,

        /// Pressure of the Txy diagram [bar]
        #[arg(short = 'P', long, default_value = "1")]
        pressure: f64,

        /// Binary interaction parameter
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        kij: f64,

        /// Number of liquid compositions
        #[arg(long, default_value = "51")]
        points: usize,

        /// Directory for pxy.svg, txy.svg and xy.svg
        #[arg(long)]
        plot_dir: Option<PathBuf>,
    },

    /// Show a database component
    Lookup {
        /// Name, IUPAC name, CAS name, SMILES or CAS number
        identifier: String,
    },
}

/// Options of `mccabe stages`. Unset options fall back to `--config`.
#[derive(Args, Debug, Default)]
pub struct StagesArgs {
    /// Run file (TOML) with the same keys as these options
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Light component (database identifier)
    #[arg(long)]
    pub comp1: Option<String>,

    /// Heavy component (database identifier)
    #[arg(long)]
    pub comp2: Option<String>,

    /// Constant relative volatility instead of components
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Distillate composition
    #[arg(long)]
    pub xd: Option<f64>,

    /// Bottoms composition
    #[arg(long)]
    pub xb: Option<f64>,

    /// Feed composition
    #[arg(long)]
    pub xf: Option<f64>,

    /// Reflux ratio
    #[arg(short = 'R', long, allow_negative_numbers = true)]
    pub reflux: Option<f64>,

    /// Feed quality
    #[arg(long, allow_negative_numbers = true)]
    pub q: Option<f64>,

    /// Pressure [bar]
    #[arg(short = 'P', long)]
    pub pressure: Option<f64>,

    /// Temperature [K]
    #[arg(short = 'T', long)]
    pub temperature: Option<f64>,

    /// Binary interaction parameter (components only)
    #[arg(long, allow_negative_numbers = true)]
    pub kij: Option<f64>,

    /// Murphree vapor efficiency in (0, 1]
    #[arg(short = 'E', long)]
    pub efficiency: Option<f64>,

    /// Stage cap
    #[arg(long)]
    pub max_stages: Option<usize>,

    /// How equilibrium samples are fitted
    #[arg(long, value_enum)]
    pub fit: Option<FitMethod>,

    /// Polynomial degree of the equilibrium fit
    #[arg(long)]
    pub degree: Option<usize>,

    /// Number of equilibrium samples
    #[arg(long)]
    pub points: Option<usize>,

    /// Write the diagram to this SVG file
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Do not annotate xd, xb and xf on the diagram
    #[arg(long)]
    pub no_points: bool,
}

impl StagesArgs {
    /// The options given on the command line, as a layer over a run file.
    #[must_use]
    pub fn overrides(&self) -> RunConfig {
        RunConfig {
            comp1: self.comp1.clone(),
            comp2: self.comp2.clone(),
            alpha: self.alpha,
            xd: self.xd,
            xb: self.xb,
            xf: self.xf,
            reflux: self.reflux,
            q: self.q,
            pressure: self.pressure,
            temperature: self.temperature,
            kij: self.kij,
            efficiency: self.efficiency,
            max_stages: self.max_stages,
            fit: self.fit,
            degree: self.degree,
            points: self.points,
            plot: self.plot.clone(),
            show_points: self.no_points.then_some(false),
        }
    }

    /// Run file merged with command-line options.
    pub fn resolve(&self) -> Result<RunConfig, McCabeError> {
        let base = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };
        Ok(base.merge(self.overrides()))
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), McCabeError> {
    let database = cli.database.as_deref();
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Stages(args) => cmd_stages(&args.resolve()?, database, json_mode),
        Commands::Vle {
            comp1,
            comp2,
            temperature,
            pressure,
            kij,
            points,
            plot_dir,
        } => cmd_vle(
            &VleRequest {
                comp1,
                comp2,
                temperature,
                pressure_bar: pressure,
                kij,
                points,
                plot_dir,
            },
            database,
            json_mode,
        ),
        Commands::Lookup { identifier } => cmd_lookup(&identifier, database, json_mode),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stages_with_negative_q() {
        let cli = Cli::try_parse_from([
            "mccabe", "stages", "--alpha", "2.5", "--xd", "0.9", "--xb", "0.1", "--xf", "0.5",
            "-R", "2", "--q", "-0.5",
        ])
        .expect("parse");

        let Commands::Stages(args) = cli.command else {
            unreachable!("stages subcommand");
        };
        let config = args.overrides();
        assert_eq!(config.q, Some(-0.5));
        assert_eq!(config.reflux, Some(2.0));
        assert_eq!(config.show_points, None);
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["mccabe", "lookup", "water", "--json-mode", "-q"])
            .expect("parse");
        assert!(cli.json_mode);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Lookup { identifier } if identifier == "water"));
    }

    #[test]
    fn parses_fit_and_negative_kij() {
        let cli = Cli::try_parse_from([
            "mccabe", "stages", "--comp1", "methanol", "--comp2", "water", "--kij", "-0.1",
            "--fit", "piecewise-linear",
        ])
        .expect("parse");
        let Commands::Stages(args) = cli.command else {
            unreachable!("stages subcommand");
        };
        let config = args.overrides();
        assert_eq!(config.kij, Some(-0.1));
        assert_eq!(config.fit, Some(FitMethod::PiecewiseLinear));

        let cli = Cli::try_parse_from(["mccabe", "vle", "--comp1", "a", "--comp2", "b"])
            .expect("parse");
        assert!(matches!(cli.command, Commands::Vle { kij, .. } if kij == 0.0));
    }

    #[test]
    fn no_points_disables_annotations() {
        let cli = Cli::try_parse_from(["mccabe", "stages", "--no-points"]).expect("parse");
        let Commands::Stages(args) = cli.command else {
            unreachable!("stages subcommand");
        };
        assert_eq!(args.overrides().show_points, Some(false));
    }
}
