//! Closed-form isolation of one variable in an equation.
//!
//! The isolator walks down the side that contains the target, inverting one
//! operator per step onto the other side. When both operands of a node
//! contain the target, it falls back to solving an affine (`a·x + b`) or
//! affine-over-affine relation. Anything beyond that has no closed form here.
//!
//! Even powers take the principal root, so `A = pi * r^2` gives
//! `r = sqrt(A / pi)`.

use super::{BinaryOp, Equation, Expr};

/// Rearrange `equation` into `target = expr`.
///
/// Returns `None` when the target does not occur or cannot be isolated.
///
/// # Example
///
/// ```rust
/// use formula_core::expr::{Equation, isolate::isolate};
///
/// let eq = Equation::parse("P * V = n * R * T").unwrap();
/// assert_eq!(isolate(&eq, "V").unwrap().to_string(), "n * R * T / P");
/// assert!(isolate(&eq, "X").is_none());
/// ```
pub fn isolate(equation: &Equation, target: &str) -> Option<Expr> {
    let in_lhs = equation.lhs.contains(target);
    let in_rhs = equation.rhs.contains(target);
    let solved = match (in_lhs, in_rhs) {
        (false, false) => return None,
        (true, false) => peel(equation.lhs.clone(), equation.rhs.clone(), target)?,
        (false, true) => peel(equation.rhs.clone(), equation.lhs.clone(), target)?,
        (true, true) => {
            let difference = equation.lhs.clone() - equation.rhs.clone();
            solve_linear(&difference, Expr::Number(0.0), target)?
        }
    };
    Some(solved.simplify())
}

/// Solve `f = c` for `target`, where only `f` contains it.
fn peel(mut f: Expr, mut c: Expr, target: &str) -> Option<Expr> {
    loop {
        let (next_f, next_c) = match f {
            Expr::Variable(ref name) if name == target => return Some(c),
            Expr::Neg(a) => (*a, -c),
            Expr::Call(function, a) => (*a, function.invert(c)),
            Expr::Binary(op, a, b) => match (a.contains(target), b.contains(target)) {
                (true, false) => {
                    let c = match op {
                        BinaryOp::Add => c - *b,
                        BinaryOp::Sub => c + *b,
                        BinaryOp::Mul => c / *b,
                        BinaryOp::Div => c * *b,
                        BinaryOp::Pow => root(c, *b),
                    };
                    (*a, c)
                }
                (false, true) => {
                    let c = match op {
                        BinaryOp::Add => c - *a,
                        BinaryOp::Sub => *a - c,
                        BinaryOp::Mul => c / *a,
                        BinaryOp::Div => *a / c,
                        BinaryOp::Pow => c.ln() / a.ln(),
                    };
                    (*b, c)
                }
                (true, true) => return solve_linear(&Expr::Binary(op, a, b), c, target),
                (false, false) => return None,
            },
            _ => return None,
        };
        f = next_f;
        c = next_c;
    }
}

/// `value^(1/exponent)`, using `sqrt` for squares.
fn root(value: Expr, exponent: Expr) -> Expr {
    match exponent {
        Expr::Number(n) if n == 2.0 => value.sqrt(),
        Expr::Number(n) => value.pow(Expr::Number(1.0 / n)),
        other => value.pow(Expr::Number(1.0) / other),
    }
}

/// Solve `f = c` when `f` is affine in `target`, or a ratio of two affine
/// expressions.
fn solve_linear(f: &Expr, c: Expr, target: &str) -> Option<Expr> {
    if let Expr::Binary(BinaryOp::Div, num, den) = f {
        if den.contains(target) {
            // (an·x + bn) / (ad·x + bd) = c  =>  x = (c·bd - bn) / (an - c·ad)
            let (an, bn) = affine(num, target)?;
            let (ad, bd) = affine(den, target)?;
            let coefficient = (an - c.clone() * ad).simplify();
            if is_zero(&coefficient) {
                return None;
            }
            return Some((c * bd - bn) / coefficient);
        }
    }

    let (a, b) = affine(f, target)?;
    let a = a.simplify();
    if is_zero(&a) {
        return None;
    }
    Some((c - b) / a)
}

fn is_zero(expr: &Expr) -> bool {
    matches!(expr, Expr::Number(v) if *v == 0.0)
}

/// Decompose `expr` into `(a, b)` with `expr = a·target + b`.
fn affine(expr: &Expr, target: &str) -> Option<(Expr, Expr)> {
    if !expr.contains(target) {
        return Some((Expr::Number(0.0), expr.clone()));
    }
    match expr {
        Expr::Variable(_) => Some((Expr::Number(1.0), Expr::Number(0.0))),
        Expr::Neg(u) => {
            let (a, b) = affine(u, target)?;
            Some((-a, -b))
        }
        Expr::Binary(BinaryOp::Add, u, v) => {
            let (au, bu) = affine(u, target)?;
            let (av, bv) = affine(v, target)?;
            Some((au + av, bu + bv))
        }
        Expr::Binary(BinaryOp::Sub, u, v) => {
            let (au, bu) = affine(u, target)?;
            let (av, bv) = affine(v, target)?;
            Some((au - av, bu - bv))
        }
        Expr::Binary(BinaryOp::Mul, u, v) if !u.contains(target) => {
            let (a, b) = affine(v, target)?;
            Some(((**u).clone() * a, (**u).clone() * b))
        }
        Expr::Binary(BinaryOp::Mul, u, v) if !v.contains(target) => {
            let (a, b) = affine(u, target)?;
            Some((a * (**v).clone(), b * (**v).clone()))
        }
        Expr::Binary(BinaryOp::Div, u, v) if !v.contains(target) => {
            let (a, b) = affine(u, target)?;
            Some((a / (**v).clone(), b / (**v).clone()))
        }
        Expr::Call(..) | Expr::Binary(..) | Expr::Number(_) | Expr::Constant(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::CompiledExpr;

    fn solve(text: &str, target: &str) -> Expr {
        isolate(&Equation::parse(text).unwrap(), target)
            .unwrap_or_else(|| panic!("no closed form for {} in {}", target, text))
    }

    fn eval(expr: &Expr, slots: &[&str], args: &[f64]) -> f64 {
        CompiledExpr::compile(&expr.clone().bind_constants(&[]), slots)
            .unwrap()
            .eval(args)
    }

    #[test]
    fn test_ideal_gas_volume() {
        let v = solve("P * V = n * R * T", "V");
        let value = eval(&v, &["P", "n", "R", "T"], &[1.0, 1.0, 8.314, 300.0]);
        assert!((value - 2494.2).abs() < 0.01);
    }

    #[test]
    fn test_circle_radius_principal_root() {
        let r = solve("A = pi * r^2", "r");
        assert_eq!(r.to_string(), "sqrt(A / pi)");
        let value = eval(&r, &["A"], &[12.566]);
        assert!((value - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_subtraction_and_division_on_right_operand() {
        let x = solve("y = a - b / x", "x");
        // a - b/x = y  =>  x = b / (a - y)
        let value = eval(&x, &["y", "a", "b"], &[1.0, 3.0, 4.0]);
        assert!((value - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_exponent_isolation() {
        let kappa = solve("p * v^kappa = C", "kappa");
        let value = eval(&kappa, &["p", "v", "C"], &[2.0, 3.0, 2.0 * 3.0_f64.powf(1.4)]);
        assert!((value - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_general_root() {
        let v = solve("p * v^kappa = C", "v");
        let value = eval(&v, &["p", "kappa", "C"], &[2.0, 1.4, 2.0 * 3.0_f64.powf(1.4)]);
        assert!((value - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_function_inversion() {
        let x = solve("y = exp(2 * x)", "x");
        let value = eval(&x, &["y"], &[1.0_f64.exp().powi(2)]);
        assert!((value - 1.0).abs() < 1e-12);

        let t = solve("c_star = sqrt(R * T0 / Gamma)", "T0");
        let value = eval(&t, &["c_star", "R", "Gamma"], &[10.0, 2.0, 0.5]);
        assert!((value - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_collection() {
        let x = solve("a * x + b * x = c", "x");
        let value = eval(&x, &["a", "b", "c"], &[2.0, 3.0, 10.0]);
        assert!((value - 2.0).abs() < 1e-12);

        // Target on both sides
        let x = solve("2 * x + 1 = x + 4", "x");
        assert!((eval(&x, &[], &[]) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rational_affine_exponent() {
        let kappa = solve("T * p^((1 - kappa) / kappa) = C", "kappa");
        let (t, p, k) = (300.0, 2.0_f64, 1.4);
        let c = t * p.powf((1.0 - k) / k);
        let value = eval(&kappa, &["T", "p", "C"], &[t, p, c]);
        assert!((value - k).abs() < 1e-9);
    }

    #[test]
    fn test_no_closed_form() {
        let eq = Equation::parse("Gamma = sqrt(kappa * (2/(kappa+1))^((kappa+1)/(kappa-1)))").unwrap();
        assert!(isolate(&eq, "kappa").is_none());
        assert!(isolate(&eq, "Gamma").is_some());

        let eq = Equation::parse("y = x * x").unwrap();
        assert!(isolate(&eq, "x").is_none());
    }

    #[test]
    fn test_cancelling_target_has_no_solution() {
        let eq = Equation::parse("x + a = x + b").unwrap();
        assert!(isolate(&eq, "x").is_none());
    }

    #[test]
    fn test_missing_target() {
        let eq = Equation::parse("F = m_dot * c_e").unwrap();
        assert!(isolate(&eq, "A_l").is_none());
    }
}
