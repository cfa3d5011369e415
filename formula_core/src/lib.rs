//! # formula_core - Engineering Formula Solver
//!
//! `formula_core` solves engineering equations for whichever variable is
//! missing. Every formula is rearranged symbolically once, when it is built,
//! into one closed-form solver per variable; afterwards a solve is a single
//! numeric evaluation.
//!
//! ## Design Philosophy
//!
//! - **Any unknown**: Give all but one variable, get the last one back
//! - **JSON-First**: Results, plot series and errors implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **No hidden state**: The catalog is immutable; defaults are a value you own
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use formula_core::Formula;
//!
//! let circle = Formula::parse("CircleArea", ["A", "r"], "A = pi * r^2")?;
//! let knowns = HashMap::from([("A".to_string(), 12.566)]);
//! let solution = circle.solve_for(&knowns)?;
//!
//! assert_eq!(solution.variable, "r");
//! assert!((solution.value - 2.0).abs() < 1e-3);
//! # Ok::<(), formula_core::FormulaError>(())
//! ```
//!
//! ## Modules
//!
//! - [`expr`] - Expression tree, parser, isolation and compilation
//! - [`formula`] - Named formulas with precompiled solvers
//! - [`catalog`] - Registry of built-in formulas by topic
//! - [`plot`] - Parameter sweeps
//! - [`defaults`] - User default values per variable
//! - [`file_io`] - Defaults persistence with atomic saves and locking
//! - [`errors`] - Structured error types

pub mod catalog;
pub mod defaults;
pub mod errors;
pub mod expr;
pub mod file_io;
pub mod formula;
pub mod plot;

// Re-export commonly used types at crate root for convenience
pub use catalog::{catalog, solve_by_id, Catalog, CatalogEntry, FormulaDefinition, Topic};
pub use defaults::DefaultValues;
pub use errors::{FormulaError, FormulaResult};
pub use file_io::{load_defaults, save_defaults, FileLock};
pub use formula::{Formula, FormulaSolver, Solution};
pub use plot::{sweep, PlotRequest, PlotSeries};
