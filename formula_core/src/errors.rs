//! # Error Types
//!
//! Structured error types for formula_core. Every failure a caller can hit
//! (bad equation text, unknown variable names, wrong number of knowns,
//! non-numeric input, unsolvable equations, file problems) maps to one
//! variant carrying enough context to report or fix it programmatically.
//!
//! ## Example
//!
//! ```rust
//! use formula_core::errors::{FormulaError, FormulaResult};
//!
//! fn parse_known(variable: &str, text: &str) -> FormulaResult<f64> {
//!     text.trim()
//!         .parse()
//!         .map_err(|_| FormulaError::invalid_number(variable, text))
//! }
//!
//! assert!(parse_known("T", "300").is_ok());
//! assert_eq!(parse_known("T", "hot").unwrap_err().error_code(), "INVALID_NUMBER");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for formula_core operations
pub type FormulaResult<T> = Result<T, FormulaError>;

/// Structured error type for formula construction, solving and persistence.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum FormulaError {
    /// One or more supplied names are not variables of the formula
    #[error("Unknown variable(s) for '{formula}': {}", .names.join(", "))]
    UnknownVariable { formula: String, names: Vec<String> },

    /// A solve call did not supply exactly one fewer value than there are variables
    #[error(
        "Wrong number of known variables for '{formula}': expected {expected}, got {got}{}",
        missing_suffix(.missing)
    )]
    WrongKnownCount {
        formula: String,
        expected: usize,
        got: usize,
        missing: Vec<String>,
    },

    /// A form-style solve did not leave exactly one input blank
    #[error("Leave exactly one variable of '{formula}' empty (currently {blank})")]
    WrongUnknownCount { formula: String, blank: usize },

    /// An input could not be read as a number
    #[error("Invalid value for {variable}: '{value}'")]
    InvalidNumber { variable: String, value: String },

    /// The equation cannot be rearranged for a variable
    #[error("No closed-form solution for '{variable}' in '{formula}'")]
    NoClosedForm { formula: String, variable: String },

    /// Evaluation produced NaN or infinity
    #[error("Solving '{formula}' for '{variable}' gave a non-finite result")]
    NonFiniteResult { formula: String, variable: String },

    /// Equation text is malformed
    #[error("Parse error in '{input}' at position {position}: {reason}")]
    ParseError {
        input: String,
        position: usize,
        reason: String,
    },

    /// No formula with this id in the catalog
    #[error("Formula not found: {name}")]
    FormulaNotFound { name: String },

    /// An input value is invalid (out of range, wrong type, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another process
    #[error("File locked: '{path}' is being written by another process")]
    FileLocked { path: String },

    /// JSON/YAML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn missing_suffix(missing: &[String]) -> String {
    if missing.is_empty() {
        String::new()
    } else {
        format!(" ({} missing: {})", missing.len(), missing.join(", "))
    }
}

impl FormulaError {
    /// Create an UnknownVariable error. Names are sorted for stable messages.
    pub fn unknown_variable<I, S>(formula: impl Into<String>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        FormulaError::UnknownVariable {
            formula: formula.into(),
            names,
        }
    }

    /// Create an InvalidNumber error
    pub fn invalid_number(variable: impl Into<String>, value: impl Into<String>) -> Self {
        FormulaError::InvalidNumber {
            variable: variable.into(),
            value: value.into(),
        }
    }

    /// Create a NoClosedForm error
    pub fn no_closed_form(formula: impl Into<String>, variable: impl Into<String>) -> Self {
        FormulaError::NoClosedForm {
            formula: formula.into(),
            variable: variable.into(),
        }
    }

    /// Create a ParseError
    pub fn parse(input: impl Into<String>, position: usize, reason: impl Into<String>) -> Self {
        FormulaError::ParseError {
            input: input.into(),
            position,
            reason: reason.into(),
        }
    }

    /// Create a FormulaNotFound error
    pub fn formula_not_found(name: impl Into<String>) -> Self {
        FormulaError::FormulaNotFound { name: name.into() }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        FormulaError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        FormulaError::MissingField {
            field: field.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        FormulaError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        FormulaError::Internal {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FormulaError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            FormulaError::UnknownVariable { .. } => "UNKNOWN_VARIABLE",
            FormulaError::WrongKnownCount { .. } => "WRONG_KNOWN_COUNT",
            FormulaError::WrongUnknownCount { .. } => "WRONG_UNKNOWN_COUNT",
            FormulaError::InvalidNumber { .. } => "INVALID_NUMBER",
            FormulaError::NoClosedForm { .. } => "NO_CLOSED_FORM",
            FormulaError::NonFiniteResult { .. } => "NON_FINITE_RESULT",
            FormulaError::ParseError { .. } => "PARSE_ERROR",
            FormulaError::FormulaNotFound { .. } => "FORMULA_NOT_FOUND",
            FormulaError::InvalidInput { .. } => "INVALID_INPUT",
            FormulaError::MissingField { .. } => "MISSING_FIELD",
            FormulaError::FileError { .. } => "FILE_ERROR",
            FormulaError::FileLocked { .. } => "FILE_LOCKED",
            FormulaError::SerializationError { .. } => "SERIALIZATION_ERROR",
            FormulaError::VersionMismatch { .. } => "VERSION_MISMATCH",
            FormulaError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = FormulaError::unknown_variable("IdealGasMolar", ["X"]);
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"UnknownVariable\""));
        let roundtrip: FormulaError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(FormulaError::missing_field("x").error_code(), "MISSING_FIELD");
        assert_eq!(FormulaError::no_closed_form("Gamma", "kappa").error_code(), "NO_CLOSED_FORM");
        assert_eq!(FormulaError::formula_not_found("Nope").error_code(), "FORMULA_NOT_FOUND");
    }

    #[test]
    fn test_unknown_variable_names_sorted() {
        let error = FormulaError::unknown_variable("F", ["z", "a", "m"]);
        assert_eq!(error.to_string(), "Unknown variable(s) for 'F': a, m, z");
    }

    #[test]
    fn test_wrong_count_message_lists_missing() {
        let error = FormulaError::WrongKnownCount {
            formula: "IdealGasMolar".to_string(),
            expected: 4,
            got: 3,
            missing: vec!["P".to_string(), "V".to_string()],
        };
        let message = error.to_string();
        assert!(message.contains("expected 4, got 3"));
        assert!(message.contains("2 missing: P, V"));
    }

    #[test]
    fn test_only_lock_errors_are_recoverable() {
        assert!(FormulaError::FileLocked { path: "d.json".into() }.is_recoverable());
        assert!(!FormulaError::internal("boom").is_recoverable());
    }
}
