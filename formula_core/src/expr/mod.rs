//! # Symbolic Expressions
//!
//! A small expression tree that is just rich enough for the physics and
//! engineering relations in the catalog. Equations are parsed from text,
//! rearranged for each variable by [`isolate`], and turned into numeric
//! evaluators by [`compile`].
//!
//! ## Modules
//!
//! - [`parse`] - Tokenizer and recursive descent parser for equation text
//! - [`isolate`] - Closed-form rearrangement of an equation for one variable
//! - [`compile`] - Stack-machine evaluator over positional arguments
//!
//! ## Example
//!
//! ```rust
//! use formula_core::expr::{Equation, isolate::isolate};
//!
//! let eq = Equation::parse("A = pi * r^2").unwrap();
//! let r = isolate(&eq, "r").unwrap();
//! assert_eq!(r.to_string(), "sqrt(A / pi)");
//! ```

pub mod compile;
pub mod isolate;
pub mod parse;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::FormulaResult;

pub use compile::CompiledExpr;

// ============================================================================
// Named constants and functions
// ============================================================================

/// Mathematical constants recognised by name in equation text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Constant::Pi => "pi",
            Constant::E => "e",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            _ => None,
        }
    }
}

/// Single-argument functions. Each one has an inverse usable by the isolator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    Sqrt,
    Exp,
    Ln,
    Log10,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::Sqrt => "sqrt",
            Function::Exp => "exp",
            Function::Ln => "ln",
            Function::Log10 => "log10",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
        }
    }

    /// Look up a function by name. `log` is accepted as an alias for `ln`.
    pub fn from_name(name: &str) -> Option<Self> {
        let function = match name {
            "sqrt" => Function::Sqrt,
            "exp" => Function::Exp,
            "ln" | "log" => Function::Ln,
            "log10" => Function::Log10,
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            _ => return None,
        };
        Some(function)
    }

    pub fn apply(self, x: f64) -> f64 {
        match self {
            Function::Sqrt => x.sqrt(),
            Function::Exp => x.exp(),
            Function::Ln => x.ln(),
            Function::Log10 => x.log10(),
            Function::Sin => x.sin(),
            Function::Cos => x.cos(),
            Function::Tan => x.tan(),
            Function::Asin => x.asin(),
            Function::Acos => x.acos(),
            Function::Atan => x.atan(),
        }
    }

    /// Build `f⁻¹(value)`. Trigonometric inverses return the principal branch.
    pub fn invert(self, value: Expr) -> Expr {
        match self {
            Function::Sqrt => value.pow(Expr::Number(2.0)),
            Function::Exp => Expr::call(Function::Ln, value),
            Function::Ln => Expr::call(Function::Exp, value),
            Function::Log10 => Expr::Number(10.0).pow(value),
            Function::Sin => Expr::call(Function::Asin, value),
            Function::Cos => Expr::call(Function::Acos, value),
            Function::Tan => Expr::call(Function::Atan, value),
            Function::Asin => Expr::call(Function::Sin, value),
            Function::Acos => Expr::call(Function::Cos, value),
            Function::Atan => Expr::call(Function::Tan, value),
        }
    }
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => a.powf(b),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
            BinaryOp::Pow => 4,
        }
    }
}

// ============================================================================
// Expression tree
// ============================================================================

/// A symbolic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Constant(Constant),
    Variable(String),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(Function, Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Expr {
        Expr::Variable(name.into())
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn call(function: Function, arg: Expr) -> Expr {
        Expr::Call(function, Box::new(arg))
    }

    pub fn pow(self, exponent: Expr) -> Expr {
        Expr::binary(BinaryOp::Pow, self, exponent)
    }

    pub fn sqrt(self) -> Expr {
        Expr::call(Function::Sqrt, self)
    }

    pub fn ln(self) -> Expr {
        Expr::call(Function::Ln, self)
    }

    /// Parse a standalone expression (no `=`).
    pub fn parse(input: &str) -> FormulaResult<Expr> {
        parse::parse_expression(input)
    }

    /// Whether `name` occurs anywhere in the expression.
    pub fn contains(&self, name: &str) -> bool {
        self.occurrences(name) > 0
    }

    /// Number of times the variable `name` occurs.
    pub fn occurrences(&self, name: &str) -> usize {
        match self {
            Expr::Variable(v) => usize::from(v == name),
            Expr::Number(_) | Expr::Constant(_) => 0,
            Expr::Neg(a) | Expr::Call(_, a) => a.occurrences(name),
            Expr::Binary(_, a, b) => a.occurrences(name) + b.occurrences(name),
        }
    }

    /// Distinct variable names, sorted.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Variable(v) => {
                out.insert(v.clone());
            }
            Expr::Number(_) | Expr::Constant(_) => {}
            Expr::Neg(a) | Expr::Call(_, a) => a.collect_variables(out),
            Expr::Binary(_, a, b) => {
                a.collect_variables(out);
                b.collect_variables(out);
            }
        }
    }

    /// Replace `pi`/`e` variables with constants unless they are declared
    /// as variables.
    pub fn bind_constants(self, declared: &[String]) -> Expr {
        match self {
            Expr::Variable(name) => match Constant::from_name(&name) {
                Some(c) if !declared.iter().any(|d| d == &name) => Expr::Constant(c),
                _ => Expr::Variable(name),
            },
            Expr::Neg(a) => Expr::Neg(Box::new(a.bind_constants(declared))),
            Expr::Call(f, a) => Expr::Call(f, Box::new(a.bind_constants(declared))),
            Expr::Binary(op, a, b) => Expr::Binary(
                op,
                Box::new(a.bind_constants(declared)),
                Box::new(b.bind_constants(declared)),
            ),
            other => other,
        }
    }

    /// Constant folding and trivial identities.
    ///
    /// Only rewrites that hold for finite operands are applied, so the value
    /// of the expression is unchanged wherever it was defined.
    pub fn simplify(&self) -> Expr {
        match self {
            Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) => self.clone(),
            Expr::Neg(a) => match a.simplify() {
                Expr::Number(v) => Expr::Number(-v),
                Expr::Neg(inner) => *inner,
                other => Expr::Neg(Box::new(other)),
            },
            Expr::Call(f, a) => Expr::call(*f, a.simplify()),
            Expr::Binary(op, a, b) => simplify_binary(*op, a.simplify(), b.simplify()),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Expr::Number(v) => Some(*v),
            _ => None,
        }
    }

    fn is_number(&self, value: f64) -> bool {
        self.as_number() == Some(value)
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Number(v) if *v < 0.0 => 3,
            Expr::Number(_) | Expr::Constant(_) | Expr::Variable(_) | Expr::Call(..) => 5,
            Expr::Neg(_) => 3,
            Expr::Binary(op, _, _) => op.precedence(),
        }
    }

    fn fmt_with(&self, f: &mut fmt::Formatter<'_>, min_precedence: u8) -> fmt::Result {
        let parens = self.precedence() < min_precedence;
        if parens {
            write!(f, "(")?;
        }
        match self {
            Expr::Number(v) => write!(f, "{}", v)?,
            Expr::Constant(c) => write!(f, "{}", c.name())?,
            Expr::Variable(name) => write!(f, "{}", name)?,
            Expr::Neg(a) => {
                write!(f, "-")?;
                a.fmt_with(f, 3)?;
            }
            Expr::Call(func, a) => {
                write!(f, "{}(", func.name())?;
                a.fmt_with(f, 0)?;
                write!(f, ")")?;
            }
            Expr::Binary(op, a, b) => {
                let (left, right) = match op {
                    BinaryOp::Add => (1, 1),
                    BinaryOp::Sub => (1, 2),
                    BinaryOp::Mul => (2, 2),
                    BinaryOp::Div => (2, 3),
                    BinaryOp::Pow => (5, 4),
                };
                a.fmt_with(f, left)?;
                if *op == BinaryOp::Pow {
                    write!(f, "^")?;
                } else {
                    write!(f, " {} ", op.symbol())?;
                }
                b.fmt_with(f, right)?;
            }
        }
        if parens {
            write!(f, ")")?;
        }
        Ok(())
    }
}

fn simplify_binary(op: BinaryOp, a: Expr, b: Expr) -> Expr {
    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        let folded = op.apply(x, y);
        if folded.is_finite() {
            return Expr::Number(folded);
        }
    }
    match op {
        BinaryOp::Add if a.is_number(0.0) => b,
        BinaryOp::Add | BinaryOp::Sub if b.is_number(0.0) => a,
        BinaryOp::Sub if a.is_number(0.0) => Expr::Neg(Box::new(b)).simplify(),
        BinaryOp::Add => match b {
            Expr::Neg(inner) => Expr::Binary(BinaryOp::Sub, Box::new(a), inner),
            b => Expr::binary(op, a, b),
        },
        BinaryOp::Sub => match b {
            Expr::Neg(inner) => Expr::Binary(BinaryOp::Add, Box::new(a), inner),
            b => Expr::binary(op, a, b),
        },
        BinaryOp::Mul if a.is_number(0.0) || b.is_number(0.0) => Expr::Number(0.0),
        BinaryOp::Mul if a.is_number(1.0) => b,
        BinaryOp::Mul if b.is_number(1.0) => a,
        BinaryOp::Mul if a.is_number(-1.0) => Expr::Neg(Box::new(b)).simplify(),
        BinaryOp::Mul if b.is_number(-1.0) => Expr::Neg(Box::new(a)).simplify(),
        BinaryOp::Div if b.is_number(1.0) => a,
        BinaryOp::Div if a.is_number(0.0) => Expr::Number(0.0),
        BinaryOp::Pow if b.is_number(1.0) => a,
        BinaryOp::Pow if b.is_number(0.0) => Expr::Number(1.0),
        _ => Expr::binary(op, a, b),
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_with(f, 0)
    }
}

impl std::ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Add, self, rhs)
    }
}

impl std::ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Sub, self, rhs)
    }
}

impl std::ops::Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Mul, self, rhs)
    }
}

impl std::ops::Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOp::Div, self, rhs)
    }
}

impl std::ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self))
    }
}

// ============================================================================
// Equation
// ============================================================================

/// An equality `lhs = rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub lhs: Expr,
    pub rhs: Expr,
}

impl Equation {
    pub fn new(lhs: Expr, rhs: Expr) -> Self {
        Equation { lhs, rhs }
    }

    /// Parse `lhs = rhs` text.
    pub fn parse(input: &str) -> FormulaResult<Equation> {
        parse::parse_equation(input)
    }

    /// Distinct variable names on either side, sorted.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = self.lhs.variables();
        out.extend(self.rhs.variables());
        out
    }

    pub fn bind_constants(self, declared: &[String]) -> Equation {
        Equation {
            lhs: self.lhs.bind_constants(declared),
            rhs: self.rhs.bind_constants(declared),
        }
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::var("x")
    }

    #[test]
    fn test_display_minimal_parentheses() {
        let e = (x() + Expr::var("y")) * Expr::var("z");
        assert_eq!(e.to_string(), "(x + y) * z");

        let e = Expr::var("a") / (Expr::var("b") * Expr::var("c"));
        assert_eq!(e.to_string(), "a / (b * c)");

        let e = Expr::var("a") - (Expr::var("b") - Expr::var("c"));
        assert_eq!(e.to_string(), "a - (b - c)");

        let e = (Expr::var("a") * Expr::var("b")).pow(Expr::Number(2.0));
        assert_eq!(e.to_string(), "(a * b)^2");
    }

    #[test]
    fn test_occurrences_and_variables() {
        let e = x() * x() + Expr::var("y");
        assert_eq!(e.occurrences("x"), 2);
        assert_eq!(e.occurrences("y"), 1);
        assert!(!e.contains("z"));
        let vars: Vec<String> = e.variables().into_iter().collect();
        assert_eq!(vars, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_bind_constants_respects_declared_names() {
        let e = Expr::var("pi") * Expr::var("e");
        let bound = e.clone().bind_constants(&[]);
        assert_eq!(bound, Expr::Constant(Constant::Pi) * Expr::Constant(Constant::E));

        let declared = vec!["e".to_string()];
        let bound = e.bind_constants(&declared);
        assert_eq!(bound, Expr::Constant(Constant::Pi) * Expr::var("e"));
    }

    #[test]
    fn test_simplify_identities() {
        assert_eq!((x() + Expr::Number(0.0)).simplify(), x());
        assert_eq!((Expr::Number(1.0) * x()).simplify(), x());
        assert_eq!((x() * Expr::Number(0.0)).simplify(), Expr::Number(0.0));
        assert_eq!((x() / Expr::Number(1.0)).simplify(), x());
        assert_eq!(x().pow(Expr::Number(1.0)).simplify(), x());
        assert_eq!((-(-x())).simplify(), x());
        assert_eq!((Expr::Number(2.0) * Expr::Number(3.0)).simplify(), Expr::Number(6.0));
        assert_eq!((x() - (-Expr::var("y"))).simplify(), x() + Expr::var("y"));
    }

    #[test]
    fn test_simplify_keeps_division_by_zero() {
        let e = Expr::Number(1.0) / Expr::Number(0.0);
        assert_eq!(e.simplify(), e);
    }

    #[test]
    fn test_function_inverse_roundtrip() {
        for f in [Function::Exp, Function::Ln, Function::Sin, Function::Atan, Function::Log10] {
            let inverse = f.invert(Expr::var("c"));
            let program = CompiledExpr::compile(&inverse, &["c"]).unwrap();
            let y = f.apply(0.3);
            assert!((program.eval(&[y]) - 0.3).abs() < 1e-12, "{:?}", f);
        }
    }
}
