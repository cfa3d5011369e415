//! # Plot Sweep
//!
//! Sweeps one variable of a formula over an evenly spaced range and solves
//! for another at each step, holding the rest constant. The result is a
//! serializable series ready for tabulation or charting.
//!
//! The sweep stops at the first point that cannot be solved (for example a
//! division by zero at `x = 0`) and keeps what was collected up to there.
//!
//! ```rust
//! use std::collections::HashMap;
//! use formula_core::catalog::catalog;
//! use formula_core::plot::{sweep, PlotRequest};
//!
//! let circle = catalog()?.formula("CircleArea")?;
//! let request = PlotRequest {
//!     x_variable: "r".into(),
//!     y_variable: "A".into(),
//!     start: 0.0,
//!     end: 3.0,
//!     step: 1.0,
//!     constants: HashMap::new(),
//! };
//! let series = sweep(circle, &request)?;
//! assert_eq!(series.points.len(), 4);
//! # Ok::<(), formula_core::errors::FormulaError>(())
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{FormulaError, FormulaResult};
use crate::formula::Formula;

/// Upper bound on the number of points in one sweep
pub const MAX_PLOT_POINTS: usize = 100_000;

/// Which variable to sweep, over what range, and the fixed values of the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRequest {
    pub x_variable: String,
    pub y_variable: String,
    pub start: f64,
    pub end: f64,
    pub step: f64,
    /// Values for every variable other than x and y
    #[serde(default)]
    pub constants: HashMap<String, f64>,
}

impl PlotRequest {
    /// Number of points the range produces, `start` and (within rounding) `end`
    /// included.
    pub fn point_count(&self) -> usize {
        let span = (self.end - self.start) / self.step;
        // Tolerate float noise such as 0.3 / 0.1 = 2.9999999999999996
        (span + 1e-9).floor() as usize + 1
    }

    /// The i-th x value.
    pub fn x_at(&self, i: usize) -> f64 {
        self.start + i as f64 * self.step
    }

    /// Check the request against `formula`.
    pub fn validate(&self, formula: &Formula) -> FormulaResult<()> {
        let unknown: Vec<&str> = [self.x_variable.as_str(), self.y_variable.as_str()]
            .into_iter()
            .chain(self.constants.keys().map(String::as_str))
            .filter(|v| !formula.has_variable(v))
            .collect();
        if !unknown.is_empty() {
            return Err(FormulaError::unknown_variable(formula.name(), unknown));
        }

        if self.x_variable == self.y_variable {
            return Err(FormulaError::invalid_input(
                "y_variable",
                self.y_variable.clone(),
                "x and y must be different variables",
            ));
        }
        for (field, value) in [("start", self.start), ("end", self.end), ("step", self.step)] {
            if !value.is_finite() {
                return Err(FormulaError::invalid_input(field, value.to_string(), "must be finite"));
            }
        }
        if self.step <= 0.0 {
            return Err(FormulaError::invalid_input("step", self.step.to_string(), "must be positive"));
        }
        if self.end < self.start {
            return Err(FormulaError::invalid_input(
                "end",
                self.end.to_string(),
                format!("must not be less than start ({})", self.start),
            ));
        }
        if self.point_count() > MAX_PLOT_POINTS {
            return Err(FormulaError::invalid_input(
                "step",
                self.step.to_string(),
                format!("range would produce more than {} points", MAX_PLOT_POINTS),
            ));
        }

        for var in [&self.x_variable, &self.y_variable] {
            if self.constants.contains_key(var) {
                return Err(FormulaError::invalid_input(
                    "constants",
                    var.clone(),
                    "swept variables cannot also be constants",
                ));
            }
        }
        let mut missing: Vec<&String> = formula
            .variables()
            .iter()
            .filter(|v| **v != self.x_variable && **v != self.y_variable)
            .filter(|v| !self.constants.contains_key(*v))
            .collect();
        missing.sort();
        if let Some(first) = missing.first() {
            return Err(FormulaError::missing_field(format!("constants.{}", first)));
        }
        Ok(())
    }
}

/// One solved sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

/// Output of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSeries {
    pub formula: String,
    pub x_variable: String,
    pub y_variable: String,
    pub points: Vec<PlotPoint>,
    /// Why the sweep ended before `end`, if it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopped_early: Option<FormulaError>,
}

impl PlotSeries {
    pub fn is_complete(&self) -> bool {
        self.stopped_early.is_none()
    }

    /// Render as CSV with a header row of the variable names.
    pub fn to_csv(&self) -> String {
        let mut out = format!("{},{}\n", self.x_variable, self.y_variable);
        for point in &self.points {
            out.push_str(&format!("{},{}\n", point.x, point.y));
        }
        out
    }
}

/// Solve `formula` for `request.y_variable` across the x range.
///
/// Validation failures are returned as errors. A solve failure part way
/// through ends the sweep and is recorded in [`PlotSeries::stopped_early`].
pub fn sweep(formula: &Formula, request: &PlotRequest) -> FormulaResult<PlotSeries> {
    request.validate(formula)?;

    let count = request.point_count();
    let mut knowns = request.constants.clone();
    let mut points = Vec::with_capacity(count);
    let mut stopped_early = None;

    for i in 0..count {
        let x = request.x_at(i);
        knowns.insert(request.x_variable.clone(), x);
        match formula.solve(&knowns) {
            Ok(y) => points.push(PlotPoint { x, y }),
            Err(e) => {
                stopped_early = Some(e);
                break;
            }
        }
    }

    Ok(PlotSeries {
        formula: formula.name().to_string(),
        x_variable: request.x_variable.clone(),
        y_variable: request.y_variable.clone(),
        points,
        stopped_early,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn circle() -> Formula {
        Formula::parse("CircleArea", ["A", "r"], "A = pi * r^2").unwrap()
    }

    fn gas() -> Formula {
        Formula::parse("IdealGasLaw", ["p", "rho", "R", "T"], "p = rho * R * T").unwrap()
    }

    fn request(x: &str, y: &str, start: f64, end: f64, step: f64) -> PlotRequest {
        PlotRequest {
            x_variable: x.into(),
            y_variable: y.into(),
            start,
            end,
            step,
            constants: HashMap::new(),
        }
    }

    #[test]
    fn test_circle_sweep() {
        let series = sweep(&circle(), &request("r", "A", 0.0, 3.0, 1.0)).unwrap();
        assert!(series.is_complete());
        assert_eq!(series.points.len(), 4);
        for (i, point) in series.points.iter().enumerate() {
            let r = i as f64;
            assert!((point.x - r).abs() < 1e-12);
            assert!((point.y - PI * r * r).abs() < 1e-9);
        }
    }

    #[test]
    fn test_fractional_step_includes_end() {
        let req = request("r", "A", 0.0, 0.3, 0.1);
        assert_eq!(req.point_count(), 4);
        let series = sweep(&circle(), &req).unwrap();
        assert!((series.points[3].x - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_single_point_range() {
        let series = sweep(&circle(), &request("r", "A", 2.0, 2.0, 0.5)).unwrap();
        assert_eq!(series.points.len(), 1);
    }

    #[test]
    fn test_stops_at_first_failure() {
        // r = sqrt(A / pi) is undefined for negative areas
        let series = sweep(&circle(), &request("A", "r", -2.0, 2.0, 1.0)).unwrap();
        assert!(series.points.is_empty());
        assert_eq!(series.stopped_early.unwrap().error_code(), "NON_FINITE_RESULT");
    }

    #[test]
    fn test_partial_series_kept() {
        // rho = p / (R * T) with T swept through zero
        let mut req = request("T", "rho", -2.0, 2.0, 1.0);
        req.constants.insert("p".into(), 101325.0);
        req.constants.insert("R".into(), 287.0);
        let series = sweep(&gas(), &req).unwrap();
        assert_eq!(series.points.len(), 2);
        assert!(!series.is_complete());
    }

    #[test]
    fn test_constants_required() {
        let mut req = request("T", "p", 200.0, 300.0, 10.0);
        req.constants.insert("R".into(), 287.0);
        let err = sweep(&gas(), &req).unwrap_err();
        assert_eq!(err, FormulaError::missing_field("constants.rho"));

        req.constants.insert("rho".into(), 1.2);
        req.constants.insert("T".into(), 1.2);
        assert_eq!(sweep(&gas(), &req).unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_invalid_ranges() {
        let c = circle();
        let cases = [
            request("r", "r", 0.0, 1.0, 1.0),
            request("r", "A", 0.0, 1.0, 0.0),
            request("r", "A", 0.0, 1.0, -1.0),
            request("r", "A", 1.0, 0.0, 0.5),
            request("r", "A", 0.0, f64::INFINITY, 1.0),
            request("r", "A", 0.0, 1.0, 1e-6),
        ];
        for req in &cases {
            assert_eq!(sweep(&c, req).unwrap_err().error_code(), "INVALID_INPUT", "{:?}", req);
        }
    }

    #[test]
    fn test_point_limit_boundary() {
        let line = Formula::parse("Line", ["y", "x"], "y = 2 * x").unwrap();

        let at_limit = request("x", "y", 0.0, 99_999.0, 1.0);
        assert_eq!(at_limit.point_count(), MAX_PLOT_POINTS);
        let series = sweep(&line, &at_limit).unwrap();
        assert_eq!(series.points.len(), MAX_PLOT_POINTS);

        // Within the rounding tolerance of one more step
        let nearly_over = request("x", "y", 0.0, 99_999.999_999_999_9, 1.0);
        assert_eq!(sweep(&line, &nearly_over).unwrap_err().error_code(), "INVALID_INPUT");

        let over = request("x", "y", 0.0, 100_000.0, 1.0);
        assert_eq!(sweep(&line, &over).unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_unknown_variables() {
        let err = sweep(&circle(), &request("d", "A", 0.0, 1.0, 1.0)).unwrap_err();
        assert_eq!(err, FormulaError::unknown_variable("CircleArea", ["d"]));
    }

    #[test]
    fn test_csv_and_json() {
        let series = sweep(&circle(), &request("r", "A", 0.0, 1.0, 1.0)).unwrap();
        let csv = series.to_csv();
        assert!(csv.starts_with("r,A\n0,0\n1,3.14159"));

        let json = serde_json::to_string(&series).unwrap();
        assert!(!json.contains("stopped_early"));
        let back: PlotSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(back, series);
    }
}
