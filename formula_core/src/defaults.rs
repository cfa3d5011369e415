//! # Default Values
//!
//! A user-maintained table of preferred values per variable name (for
//! example `g0 = 9.80665`). Entries are kept as the text the user typed; a
//! blank entry means "no default". The store is an ordinary value that
//! callers own and pass around; persistence lives in [`crate::file_io`].
//!
//! ```rust
//! use std::collections::HashMap;
//! use formula_core::catalog::catalog;
//! use formula_core::defaults::DefaultValues;
//!
//! let mut defaults = DefaultValues::new();
//! defaults.set("g0", "9.80665");
//!
//! let isp = catalog()?.formula("SpecificImpulse")?;
//! let mut inputs = HashMap::from([("c_e".to_string(), "2943".to_string())]);
//! defaults.apply_to(isp, &mut inputs, &["g0"])?;
//!
//! let solution = isp.solve_form(&inputs)?;
//! assert!((solution.value - 300.1).abs() < 0.1);
//! # Ok::<(), formula_core::errors::FormulaError>(())
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::catalog::catalog;
use crate::errors::{FormulaError, FormulaResult};
use crate::formula::{parse_number, Formula};

/// Variable name to default text, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultValues {
    values: BTreeMap<String, String>,
}

impl DefaultValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// One blank entry for every variable that appears in the catalog.
    pub fn seeded_from_catalog() -> FormulaResult<Self> {
        let values = catalog()?
            .all_variables()
            .into_iter()
            .map(|name| (name, String::new()))
            .collect();
        Ok(DefaultValues { values })
    }

    pub fn from_map(values: BTreeMap<String, String>) -> Self {
        DefaultValues { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw text for `variable`, if an entry exists (it may be blank).
    pub fn get(&self, variable: &str) -> Option<&str> {
        self.values.get(variable).map(String::as_str)
    }

    pub fn set(&mut self, variable: impl Into<String>, text: impl Into<String>) {
        self.values.insert(variable.into(), text.into().trim().to_string());
    }

    /// Blank the entry for `variable`. Returns whether it held a value.
    pub fn clear(&mut self, variable: &str) -> bool {
        match self.values.get_mut(variable) {
            Some(text) if !text.is_empty() => {
                text.clear();
                true
            }
            _ => false,
        }
    }

    /// Entries in name order, including blank ones.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Numeric default for `variable`.
    ///
    /// `None` when there is no entry or it is blank; `Some(Err(InvalidNumber))`
    /// when the text does not parse.
    pub fn value(&self, variable: &str) -> Option<FormulaResult<f64>> {
        let text = self.get(variable)?;
        if text.is_empty() {
            return None;
        }
        Some(parse_number(variable, text))
    }

    /// Fill the blank `inputs` entries named in `variables` from the defaults.
    ///
    /// Returns the names that were filled. Non-blank inputs are left alone.
    ///
    /// # Errors
    ///
    /// - `UnknownVariable` if a name is not a variable of `formula`
    /// - `MissingField` if a requested default is absent or blank
    /// - `InvalidNumber` if the stored default does not parse
    pub fn apply_to(
        &self,
        formula: &Formula,
        inputs: &mut HashMap<String, String>,
        variables: &[&str],
    ) -> FormulaResult<Vec<String>> {
        let unknown: Vec<&str> = variables
            .iter()
            .copied()
            .filter(|v| !formula.has_variable(v))
            .collect();
        if !unknown.is_empty() {
            return Err(FormulaError::unknown_variable(formula.name(), unknown));
        }

        let mut filled = Vec::new();
        for &variable in variables {
            let blank = inputs.get(variable).map_or(true, |t| t.trim().is_empty());
            if !blank {
                continue;
            }
            let value = self
                .value(variable)
                .ok_or_else(|| FormulaError::missing_field(format!("default for {}", variable)))??;
            inputs.insert(variable.to_string(), value.to_string());
            filled.push(variable.to_string());
        }
        Ok(filled)
    }

    /// Copy every entry of `other` over this store.
    pub fn merge(&mut self, other: DefaultValues) {
        self.values.extend(other.values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_from_catalog_is_blank() {
        let defaults = DefaultValues::seeded_from_catalog().unwrap();
        assert!(!defaults.is_empty());
        assert!(defaults.iter().all(|(_, v)| v.is_empty()));
        assert_eq!(defaults.get("kappa"), Some(""));
        assert!(defaults.value("kappa").is_none());
    }

    #[test]
    fn test_set_value_and_clear() {
        let mut defaults = DefaultValues::new();
        defaults.set("kappa", " 1.4 ");
        assert_eq!(defaults.get("kappa"), Some("1.4"));
        assert!((defaults.value("kappa").unwrap().unwrap() - 1.4).abs() < 1e-12);

        defaults.set("R", "air");
        assert_eq!(
            defaults.value("R").unwrap().unwrap_err(),
            FormulaError::invalid_number("R", "air")
        );

        assert!(defaults.clear("kappa"));
        assert!(!defaults.clear("kappa"));
        assert!(defaults.value("kappa").is_none());
        assert!(defaults.value("missing").is_none());
    }

    #[test]
    fn test_iter_in_name_order() {
        let mut defaults = DefaultValues::new();
        defaults.set("b", "2");
        defaults.set("a", "1");
        let names: Vec<&str> = defaults.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_apply_to_fills_only_blank_inputs() {
        let formula = Formula::parse("IdealGasLaw", ["p", "rho", "R", "T"], "p = rho * R * T").unwrap();
        let mut defaults = DefaultValues::new();
        defaults.set("R", "287");
        defaults.set("T", "288.15");

        let mut inputs: HashMap<String, String> = HashMap::new();
        inputs.insert("rho".into(), "1.225".into());
        inputs.insert("T".into(), "300".into());

        let filled = defaults.apply_to(&formula, &mut inputs, &["R", "T"]).unwrap();
        assert_eq!(filled, vec!["R".to_string()]);
        assert_eq!(inputs["R"], "287");
        assert_eq!(inputs["T"], "300");

        let solution = formula.solve_form(&inputs).unwrap();
        assert_eq!(solution.variable, "p");
        assert!((solution.value - 1.225 * 287.0 * 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_apply_to_errors() {
        let formula = Formula::parse("IdealGasLaw", ["p", "rho", "R", "T"], "p = rho * R * T").unwrap();
        let defaults = DefaultValues::new();
        let mut inputs = HashMap::new();

        let err = defaults.apply_to(&formula, &mut inputs, &["g0"]).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_VARIABLE");

        let err = defaults.apply_to(&formula, &mut inputs, &["R"]).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
    }

    #[test]
    fn test_merge_overrides() {
        let mut defaults = DefaultValues::seeded_from_catalog().unwrap();
        let mut loaded = DefaultValues::new();
        loaded.set("g0", "9.81");
        loaded.set("custom", "1");
        defaults.merge(loaded);
        assert_eq!(defaults.get("g0"), Some("9.81"));
        assert_eq!(defaults.get("custom"), Some("1"));
        assert_eq!(defaults.get("kappa"), Some(""));
    }
}
