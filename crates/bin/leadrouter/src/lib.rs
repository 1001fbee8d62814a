//! # leadrouter
//!
//! Composition root that wires the rule source and console adapters
//! together and runs a reconciliation.
//!
//! ## Responsibilities
//! - Parse configuration (CLI args, env vars, config file)
//! - Build the configured rule source (sheets API or values file)
//! - Start the console surface (WebDriver browser or virtual console)
//! - Resolve the run options once and wait for the operator to log in
//! - Run the routing engine and render the summary
//! - Map the run verdict to the process exit code
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no routing logic belongs here.

pub mod cli;
pub mod config;
pub mod operator;
pub mod report;
pub mod runner;
