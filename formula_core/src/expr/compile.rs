//! Compile expressions into flat postfix programs.
//!
//! A [`CompiledExpr`] binds every variable to a positional argument slot
//! once, so evaluation is a linear walk over instructions with no name
//! lookups.

use super::{BinaryOp, Expr, Function};
use crate::errors::{FormulaError, FormulaResult};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Instruction {
    Push(f64),
    Load(usize),
    Negate,
    Apply(BinaryOp),
    Call(Function),
}

/// A numeric evaluator over positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    program: Vec<Instruction>,
    stack_depth: usize,
    arity: usize,
}

impl CompiledExpr {
    /// Compile `expr`, mapping each variable to its index in `slots`.
    ///
    /// Fails if the expression references a name that has no slot.
    pub fn compile(expr: &Expr, slots: &[&str]) -> FormulaResult<CompiledExpr> {
        let mut program = Vec::new();
        let stack_depth = emit(expr, slots, &mut program)?;
        Ok(CompiledExpr {
            program,
            stack_depth,
            arity: slots.len(),
        })
    }

    /// Number of arguments expected by [`eval`](Self::eval).
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Evaluate with `args` in slot order. A short argument list yields NaN.
    pub fn eval(&self, args: &[f64]) -> f64 {
        let mut stack: Vec<f64> = Vec::with_capacity(self.stack_depth);
        for instruction in &self.program {
            match *instruction {
                Instruction::Push(v) => stack.push(v),
                Instruction::Load(slot) => stack.push(args.get(slot).copied().unwrap_or(f64::NAN)),
                Instruction::Negate => {
                    let a = stack.pop().unwrap_or(f64::NAN);
                    stack.push(-a);
                }
                Instruction::Apply(op) => {
                    let b = stack.pop().unwrap_or(f64::NAN);
                    let a = stack.pop().unwrap_or(f64::NAN);
                    stack.push(op.apply(a, b));
                }
                Instruction::Call(function) => {
                    let a = stack.pop().unwrap_or(f64::NAN);
                    stack.push(function.apply(a));
                }
            }
        }
        stack.pop().unwrap_or(f64::NAN)
    }
}

/// Append instructions for `expr`; returns the stack depth it needs.
fn emit(expr: &Expr, slots: &[&str], program: &mut Vec<Instruction>) -> FormulaResult<usize> {
    match expr {
        Expr::Number(v) => {
            program.push(Instruction::Push(*v));
            Ok(1)
        }
        Expr::Constant(c) => {
            program.push(Instruction::Push(c.value()));
            Ok(1)
        }
        Expr::Variable(name) => {
            let slot = slots.iter().position(|s| s == name).ok_or_else(|| {
                FormulaError::internal(format!("variable '{}' has no argument slot", name))
            })?;
            program.push(Instruction::Load(slot));
            Ok(1)
        }
        Expr::Neg(a) => {
            let depth = emit(a, slots, program)?;
            program.push(Instruction::Negate);
            Ok(depth)
        }
        Expr::Call(function, a) => {
            let depth = emit(a, slots, program)?;
            program.push(Instruction::Call(*function));
            Ok(depth)
        }
        Expr::Binary(op, a, b) => {
            let left = emit(a, slots, program)?;
            let right = emit(b, slots, program)?;
            program.push(Instruction::Apply(*op));
            Ok(left.max(right + 1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_in_slot_order() {
        let expr = Expr::parse("n * R * T / P").unwrap();
        let program = CompiledExpr::compile(&expr, &["P", "n", "R", "T"]).unwrap();
        assert_eq!(program.arity(), 4);
        let v = program.eval(&[1.0, 1.0, 8.314, 300.0]);
        assert!((v - 2494.2).abs() < 1e-9);
    }

    #[test]
    fn test_constants_are_inlined() {
        let expr = Expr::parse("pi * r^2").unwrap().bind_constants(&["r".to_string()]);
        let program = CompiledExpr::compile(&expr, &["r"]).unwrap();
        assert!((program.eval(&[2.0]) - 4.0 * std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_missing_slot_is_an_error() {
        let expr = Expr::parse("a + b").unwrap();
        let err = CompiledExpr::compile(&expr, &["a"]).unwrap_err();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_short_argument_list_gives_nan() {
        let expr = Expr::parse("a + b").unwrap();
        let program = CompiledExpr::compile(&expr, &["a", "b"]).unwrap();
        assert!(program.eval(&[1.0]).is_nan());
    }

    #[test]
    fn test_stack_depth_for_nested_expression() {
        let expr = Expr::parse("a - (b - (c - d))").unwrap();
        let program = CompiledExpr::compile(&expr, &["a", "b", "c", "d"]).unwrap();
        assert_eq!(program.stack_depth, 4);
        assert_eq!(program.eval(&[10.0, 5.0, 3.0, 1.0]), 10.0 - (5.0 - (3.0 - 1.0)));
    }
}
