//! # Formula
//!
//! A [`Formula`] is an ordered list of variable names plus one equation
//! relating them. At construction time the equation is isolated for every
//! variable and each closed form is compiled once; solving afterwards is a
//! table lookup plus a numeric evaluation.
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use formula_core::formula::Formula;
//!
//! let gas = Formula::parse("IdealGasMolar", ["P", "V", "n", "R", "T"], "P * V = n * R * T")?;
//!
//! let knowns = HashMap::from([
//!     ("P".to_string(), 1.0),
//!     ("n".to_string(), 1.0),
//!     ("R".to_string(), 8.314),
//!     ("T".to_string(), 300.0),
//! ]);
//! let v = gas.solve(&knowns)?;
//! assert!((v - 2494.2).abs() < 0.01);
//! # Ok::<(), formula_core::errors::FormulaError>(())
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{FormulaError, FormulaResult};
use crate::expr::isolate::isolate;
use crate::expr::{CompiledExpr, Equation, Expr};

/// The outcome of a solve: which variable was missing and its value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub variable: String,
    pub value: f64,
}

/// Closed form for one variable.
#[derive(Debug, Clone)]
struct Solver {
    expression: Expr,
    program: CompiledExpr,
}

/// A named equation with one precompiled solver per variable.
#[derive(Debug, Clone)]
pub struct Formula {
    name: String,
    variables: Vec<String>,
    equation: Equation,
    /// Index-aligned with `variables`
    solvers: Vec<Solver>,
}

impl Formula {
    /// Build a formula from variable names and an equation.
    ///
    /// `pi` and `e` in the equation are constants unless declared as
    /// variables. Fails when:
    /// - fewer than two variables are given, or a name repeats
    /// - the equation uses a symbol that is not declared
    /// - some variable has no closed-form isolation (including a declared
    ///   variable the equation never mentions)
    pub fn new<I, S>(name: impl Into<String>, variables: I, equation: Equation) -> FormulaResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let variables: Vec<String> = variables.into_iter().map(Into::into).collect();

        if variables.len() < 2 {
            return Err(FormulaError::invalid_input(
                "variables",
                variables.join(", "),
                "a formula needs at least two variables",
            ));
        }
        let mut seen = HashSet::new();
        for var in &variables {
            if !seen.insert(var.as_str()) {
                return Err(FormulaError::invalid_input(
                    "variables",
                    var.clone(),
                    "duplicate variable name",
                ));
            }
        }

        let equation = equation.bind_constants(&variables);
        if let Some(stray) = equation.variables().into_iter().find(|s| !seen.contains(s.as_str())) {
            return Err(FormulaError::invalid_input(
                "equation",
                stray,
                format!("symbol is not a declared variable of '{}'", name),
            ));
        }

        let mut solvers = Vec::with_capacity(variables.len());
        for target in &variables {
            let expression = isolate(&equation, target)
                .ok_or_else(|| FormulaError::no_closed_form(&name, target))?;
            let slots: Vec<&str> = variables
                .iter()
                .filter(|v| *v != target)
                .map(String::as_str)
                .collect();
            let program = CompiledExpr::compile(&expression, &slots)?;
            solvers.push(Solver { expression, program });
        }

        Ok(Formula {
            name,
            variables,
            equation,
            solvers,
        })
    }

    /// Build a formula from equation text such as `"P * V = n * R * T"`.
    pub fn parse<I, S>(name: impl Into<String>, variables: I, equation: &str) -> FormulaResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Formula::new(name, variables, Equation::parse(equation)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variable names in their fixed order
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn equation(&self) -> &Equation {
        &self.equation
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == name)
    }

    /// The isolated expression for `variable`, e.g. `sqrt(A / pi)` for `r`.
    pub fn solved_expression(&self, variable: &str) -> Option<&Expr> {
        self.index_of(variable).map(|i| &self.solvers[i].expression)
    }

    /// Solve for the single variable missing from `knowns`.
    ///
    /// # Errors
    ///
    /// - `UnknownVariable` if a key is not a variable of this formula
    /// - `WrongKnownCount` unless exactly `variables - 1` values are given
    /// - `InvalidInput` if a supplied value is NaN or infinite
    /// - `NonFiniteResult` if the closed form evaluates to NaN or infinity
    pub fn solve_for(&self, knowns: &HashMap<String, f64>) -> FormulaResult<Solution> {
        let unknown: Vec<&str> = knowns
            .keys()
            .map(String::as_str)
            .filter(|k| !self.has_variable(k))
            .collect();
        if !unknown.is_empty() {
            return Err(FormulaError::unknown_variable(&self.name, unknown));
        }

        let expected = self.variables.len() - 1;
        if knowns.len() != expected {
            let mut missing: Vec<String> = self
                .variables
                .iter()
                .filter(|v| !knowns.contains_key(*v))
                .cloned()
                .collect();
            missing.sort();
            return Err(FormulaError::WrongKnownCount {
                formula: self.name.clone(),
                expected,
                got: knowns.len(),
                missing,
            });
        }

        let mut target = None;
        let mut args = Vec::with_capacity(expected);
        for (i, var) in self.variables.iter().enumerate() {
            match knowns.get(var) {
                Some(value) if !value.is_finite() => {
                    return Err(FormulaError::invalid_input(var, value.to_string(), "value must be finite"));
                }
                Some(value) => args.push(*value),
                None => target = Some(i),
            }
        }
        let target = target.ok_or_else(|| FormulaError::internal("no unknown variable left to solve for"))?;

        let variable = &self.variables[target];
        let value = self.solvers[target].program.eval(&args);
        if !value.is_finite() {
            return Err(FormulaError::NonFiniteResult {
                formula: self.name.clone(),
                variable: variable.clone(),
            });
        }
        Ok(Solution {
            variable: variable.clone(),
            value,
        })
    }

    /// Solve and return just the value of the missing variable.
    pub fn solve(&self, knowns: &HashMap<String, f64>) -> FormulaResult<f64> {
        self.solve_for(knowns).map(|s| s.value)
    }

    /// Solve from text inputs where exactly one entry is blank.
    ///
    /// Entries absent from `inputs` count as blank. Non-blank text must parse
    /// as a finite number.
    pub fn solve_form(&self, inputs: &HashMap<String, String>) -> FormulaResult<Solution> {
        let unknown: Vec<&str> = inputs
            .keys()
            .map(String::as_str)
            .filter(|k| !self.has_variable(k))
            .collect();
        if !unknown.is_empty() {
            return Err(FormulaError::unknown_variable(&self.name, unknown));
        }

        let mut knowns = HashMap::with_capacity(self.variables.len());
        let mut blank = 0;
        for var in &self.variables {
            let text = inputs.get(var).map(|t| t.trim()).unwrap_or("");
            if text.is_empty() {
                blank += 1;
                continue;
            }
            let value = parse_number(var, text)?;
            knowns.insert(var.clone(), value);
        }

        if blank != 1 {
            return Err(FormulaError::WrongUnknownCount {
                formula: self.name.clone(),
                blank,
            });
        }
        self.solve_for(&knowns)
    }
}

/// Parse user-entered text as a finite number.
pub fn parse_number(variable: &str, text: &str) -> FormulaResult<f64> {
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FormulaError::invalid_number(variable, text)),
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.equation)
    }
}

// ============================================================================
// Solve dispatcher
// ============================================================================

/// Thin adapter giving any formula a uniform `solve` entry point.
#[derive(Debug, Clone, Copy)]
pub struct FormulaSolver<'a> {
    formula: &'a Formula,
}

impl<'a> FormulaSolver<'a> {
    pub fn new(formula: &'a Formula) -> Self {
        FormulaSolver { formula }
    }

    pub fn formula(&self) -> &'a Formula {
        self.formula
    }

    /// Solve for the unknown variable using the provided values.
    pub fn solve(&self, values: &HashMap<String, f64>) -> FormulaResult<f64> {
        self.formula.solve(values)
    }
}
