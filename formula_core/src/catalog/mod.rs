//! # Formula Catalog
//!
//! The process-wide registry of every formula the explorer knows about,
//! grouped by topic. Each entry pairs static metadata (names, units,
//! assumptions) with a built [`Formula`].
//!
//! ## Modules
//!
//! - [`general`] - Textbook relations (molar ideal gas, circle area)
//! - [`thermodynamics`] - Specific gas law and adiabatic relations
//! - [`propulsion`] - Rocket thrust, exhaust velocity and nozzle figures
//! - [`aerodynamics`] - Reynolds number and viscosity
//! - [`docs`] - Markdown reference generation
//!
//! ## Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use formula_core::catalog::{catalog, solve_by_id};
//!
//! let circle = catalog()?.get("CircleArea")?;
//! assert_eq!(circle.formula.variables(), ["A", "r"]);
//!
//! let knowns = HashMap::from([("A".to_string(), 12.566)]);
//! let r = solve_by_id("CircleArea", &knowns)?;
//! assert!((r.value - 2.0).abs() < 1e-3);
//! # Ok::<(), formula_core::errors::FormulaError>(())
//! ```

pub mod aerodynamics;
pub mod docs;
pub mod general;
pub mod propulsion;
pub mod thermodynamics;

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{FormulaError, FormulaResult};
use crate::formula::{Formula, Solution};

pub use docs::generate_catalog_markdown;

// ============================================================================
// Topics
// ============================================================================

/// Subject area used to group formulas in listings and docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Topic {
    General,
    Thermodynamics,
    Propulsion,
    Aerodynamics,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::General,
        Topic::Thermodynamics,
        Topic::Propulsion,
        Topic::Aerodynamics,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Topic::General => "General",
            Topic::Thermodynamics => "Thermodynamics",
            Topic::Propulsion => "Propulsion",
            Topic::Aerodynamics => "Aerodynamics",
        }
    }

    /// Sort order for listings (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            Topic::General => 1,
            Topic::Thermodynamics => 2,
            Topic::Propulsion => 3,
            Topic::Aerodynamics => 4,
        }
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Topic> {
        Topic::ALL
            .into_iter()
            .find(|t| t.display_name().eq_ignore_ascii_case(name.trim()))
    }
}

// ============================================================================
// Metadata
// ============================================================================

/// Description of one variable of a formula.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableInfo {
    /// Symbol as it appears in the equation (e.g., "m_dot")
    pub symbol: &'static str,
    pub description: &'static str,
    /// SI units (e.g., "kg/s"); "-" for dimensionless
    pub units: &'static str,
}

impl VariableInfo {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }
}

/// Static metadata for a catalog formula.
#[derive(Debug, Clone, Serialize)]
pub struct FormulaDefinition {
    /// Stable identifier used on the command line (e.g., "IdealGasLaw")
    pub id: &'static str,
    /// Human-readable name
    pub name: &'static str,
    pub description: &'static str,
    pub topic: Topic,
    /// Equation text in the expression grammar
    pub equation: &'static str,
    /// Variables in solving order
    pub variables: Vec<VariableInfo>,
    pub assumptions: Vec<&'static str>,
}

impl FormulaDefinition {
    pub fn variable(&self, symbol: &str) -> Option<&VariableInfo> {
        self.variables.iter().find(|v| v.symbol == symbol)
    }

    /// Build the solvable formula from this definition.
    pub fn build(&self) -> FormulaResult<Formula> {
        Formula::parse(self.id, self.variables.iter().map(|v| v.symbol), self.equation)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// A definition together with its built formula.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub definition: FormulaDefinition,
    pub formula: Formula,
}

/// All known formulas, in definition order.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build every definition of every topic.
    pub fn build() -> FormulaResult<Catalog> {
        Catalog::from_definitions(all_definitions())
    }

    /// Build from an explicit list of definitions. Ids must be unique.
    pub fn from_definitions(definitions: Vec<FormulaDefinition>) -> FormulaResult<Catalog> {
        let mut entries: Vec<CatalogEntry> = Vec::with_capacity(definitions.len());
        for definition in definitions {
            if entries.iter().any(|e| e.definition.id == definition.id) {
                return Err(FormulaError::invalid_input(
                    "id",
                    definition.id,
                    "duplicate formula id in catalog",
                ));
            }
            let formula = definition.build()?;
            entries.push(CatalogEntry { definition, formula });
        }
        Ok(Catalog { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by id. An exact match wins; otherwise a unique
    /// case-insensitive match is accepted.
    pub fn get(&self, id: &str) -> FormulaResult<&CatalogEntry> {
        if let Some(entry) = self.entries.iter().find(|e| e.definition.id == id) {
            return Ok(entry);
        }
        let mut folded = self
            .entries
            .iter()
            .filter(|e| e.definition.id.eq_ignore_ascii_case(id));
        match (folded.next(), folded.next()) {
            (Some(entry), None) => Ok(entry),
            _ => Err(FormulaError::formula_not_found(id)),
        }
    }

    pub fn formula(&self, id: &str) -> FormulaResult<&Formula> {
        self.get(id).map(|e| &e.formula)
    }

    pub fn definition(&self, id: &str) -> FormulaResult<&FormulaDefinition> {
        self.get(id).map(|e| &e.definition)
    }

    /// Ids in definition order
    pub fn ids(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.definition.id).collect()
    }

    /// Topics in sort order with their entries; empty topics are skipped.
    pub fn by_topic(&self) -> Vec<(Topic, Vec<&CatalogEntry>)> {
        let mut topics = Topic::ALL.to_vec();
        topics.sort_by_key(|t| t.sort_order());
        topics
            .into_iter()
            .filter_map(|topic| {
                let entries: Vec<&CatalogEntry> = self
                    .entries
                    .iter()
                    .filter(|e| e.definition.topic == topic)
                    .collect();
                (!entries.is_empty()).then_some((topic, entries))
            })
            .collect()
    }

    /// Sorted, deduplicated union of all variable names.
    pub fn all_variables(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|e| e.formula.variables().iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn all_definitions() -> Vec<FormulaDefinition> {
    let mut definitions = general::definitions();
    definitions.extend(thermodynamics::definitions());
    definitions.extend(propulsion::definitions());
    definitions.extend(aerodynamics::definitions());
    definitions
}

static CATALOG: Lazy<FormulaResult<Catalog>> = Lazy::new(Catalog::build);

/// The process-wide catalog, built on first use.
pub fn catalog() -> FormulaResult<&'static Catalog> {
    CATALOG.as_ref().map_err(Clone::clone)
}

/// Solve the catalog formula `id` for its single missing variable.
pub fn solve_by_id(id: &str, knowns: &HashMap<String, f64>) -> FormulaResult<Solution> {
    catalog()?.formula(id)?.solve_for(knowns)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic positive sample value for a variable.
    fn sample_value(index: usize, symbol: &str) -> f64 {
        match symbol {
            // Adiabatic exponent must stay away from 1 for the exponent forms
            "kappa" => 1.4,
            _ => 1.5 + 0.37 * index as f64,
        }
    }

    #[test]
    fn test_every_entry_builds() {
        let catalog = catalog().unwrap();
        assert_eq!(catalog.len(), 21);
        for entry in catalog.entries() {
            assert_eq!(entry.formula.name(), entry.definition.id);
            assert!(!entry.definition.description.is_empty(), "{} has no description", entry.definition.id);
            for var in entry.formula.variables() {
                assert!(
                    entry.definition.variable(var).is_some(),
                    "{} lacks metadata for {}",
                    entry.definition.id,
                    var
                );
            }
        }
    }

    #[test]
    fn test_every_solver_round_trips() {
        let catalog = catalog().unwrap();
        for entry in catalog.entries() {
            let formula = &entry.formula;
            let vars = formula.variables();

            // Pick values for all but the first variable, derive the first,
            // then check every other variable can be recovered.
            let mut point: HashMap<String, f64> = vars
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, v)| (v.clone(), sample_value(i, v)))
                .collect();
            let first = formula.solve(&point).unwrap();
            point.insert(vars[0].clone(), first);

            for var in vars {
                let mut knowns = point.clone();
                let expected = knowns.remove(var).unwrap();
                let value = formula
                    .solve(&knowns)
                    .unwrap_or_else(|e| panic!("{} for {}: {}", entry.definition.id, var, e));
                let tolerance = 1e-9 * expected.abs().max(1.0);
                assert!(
                    (value - expected).abs() < tolerance,
                    "{} for {}: {} != {}",
                    entry.definition.id,
                    var,
                    value,
                    expected
                );
            }
        }
    }

    #[test]
    fn test_lookup() {
        let catalog = catalog().unwrap();
        assert_eq!(catalog.get("ReynoldsNumber").unwrap().definition.topic, Topic::Aerodynamics);
        assert_eq!(catalog.get("reynoldsnumber").unwrap().definition.id, "ReynoldsNumber");
        assert_eq!(
            catalog.get("Nope").unwrap_err(),
            FormulaError::formula_not_found("Nope")
        );
        assert_eq!(catalog.ids()[0], "IdealGasMolar");
    }

    #[test]
    fn test_by_topic_order() {
        let catalog = catalog().unwrap();
        let topics: Vec<Topic> = catalog.by_topic().into_iter().map(|(t, _)| t).collect();
        assert_eq!(topics, Topic::ALL.to_vec());
        let count: usize = catalog.by_topic().iter().map(|(_, e)| e.len()).sum();
        assert_eq!(count, catalog.len());
    }

    #[test]
    fn test_all_variables_sorted_and_unique() {
        let vars = catalog().unwrap().all_variables();
        let mut sorted = vars.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(vars, sorted);
        assert!(vars.contains(&"m_dot".to_string()));
        assert!(vars.contains(&"kappa".to_string()));
    }

    #[test]
    fn test_topic_from_name() {
        assert_eq!(Topic::from_name("propulsion"), Some(Topic::Propulsion));
        assert_eq!(Topic::from_name(" General "), Some(Topic::General));
        assert_eq!(Topic::from_name("optics"), None);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut definitions = general::definitions();
        definitions.extend(general::definitions());
        let err = Catalog::from_definitions(definitions).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_exhaust_velocity_and_impulse_identities() {
        let knowns = |pairs: &[(&str, f64)]| -> HashMap<String, f64> {
            pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
        };

        let c_star = solve_by_id("ExhaustVelocityCoefficients", &knowns(&[("c_e", 3000.0), ("c_f", 1.6)])).unwrap();
        assert_eq!(c_star.variable, "c_star");
        assert!((c_star.value - 1875.0).abs() < 1e-9);

        let isp = solve_by_id(
            "SpecificImpulseThrust",
            &knowns(&[("F", 29430.0), ("m_dot", 10.0), ("g0", 9.81)]),
        )
        .unwrap();
        assert_eq!(isp.variable, "I_s");
        assert!((isp.value - 300.0).abs() < 1e-9);

        let m_dot = solve_by_id(
            "SpecificImpulseThrust",
            &knowns(&[("I_s", 300.0), ("F", 29430.0), ("g0", 9.81)]),
        )
        .unwrap();
        assert!((m_dot.value - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_solve_by_id() {
        let knowns: HashMap<String, f64> = [("P", 1.0), ("n", 1.0), ("R", 8.314), ("T", 300.0)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        let solution = solve_by_id("IdealGasMolar", &knowns).unwrap();
        assert_eq!(solution.variable, "V");
        assert!((solution.value - 2494.2).abs() < 0.01);
        assert_eq!(solve_by_id("Missing", &knowns).unwrap_err().error_code(), "FORMULA_NOT_FOUND");
    }
}
