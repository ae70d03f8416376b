//! # mccabe
//!
//! Command line front end for the McCabe-Thiele engine - THE BINARY.
//!
//! - `cli`: clap commands and their implementations
//! - `config`: TOML run files layered under command-line options
//! - `output`: JSON output types for `--json-mode`
//! - `render`: SVG diagrams

pub mod cli;
pub mod config;
pub mod output;
pub mod render;
