// Copyright 2025 Filterql Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types for filterql
//!
//! Every failure the engine can produce — structural parse errors,
//! resolution errors, and evaluation errors — surfaces as a variant of the
//! single [`Error`] enum, each carrying the offending expression or
//! identifier text in its message.

use thiserror::Error;

/// Result type alias for filterql operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for filter-expression parsing and evaluation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No dataset has been assigned to the parser handle
    #[error("cannot evaluate filter expression, no dataset has been defined")]
    NoDataSet,

    /// Measurement table not found in the dataset
    #[error("failed to find measurement table '{0}'")]
    TableNotFound(String),

    /// Column not found in a measurement table
    #[error("failed to find column '{column}' in table '{table}'")]
    ColumnNotFound { column: String, table: String },

    /// No ID-field mapping registered for a measurement table
    #[error("failed to find ID fields record for measurement table '{0}'")]
    IdFieldsNotFound(String),

    /// Signal ID column named by the ID-field mapping is missing
    #[error("failed to find signal ID field '{column}' for measurement table '{table}'")]
    SignalIdColumnNotFound { column: String, table: String },

    /// Malformed filter statement or expression text
    #[error("filter expression parse error: {0}")]
    Parse(String),

    /// Expression tree evaluation failure
    #[error("filter expression evaluation error: {0}")]
    Evaluation(String),

    /// Integer or decimal division by zero
    #[error("division by zero")]
    DivisionByZero,

    /// Row cell count does not match the table schema
    #[error("row cell count does not match table schema, expected {expected}, got {got}")]
    RowWidthMismatch { expected: usize, got: usize },

    /// A row cell value cannot be stored under the column's data type
    #[error("invalid value for column '{column}': cannot store {value_type} in a {data_type} column")]
    InvalidCellValue {
        column: String,
        value_type: String,
        data_type: String,
    },
}

impl Error {
    /// Create a new Parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse(message.into())
    }

    /// Create a new Evaluation error
    pub fn evaluation(message: impl Into<String>) -> Self {
        Error::Evaluation(message.into())
    }

    /// Create a new ColumnNotFound error
    pub fn column_not_found(column: impl Into<String>, table: impl Into<String>) -> Self {
        Error::ColumnNotFound {
            column: column.into(),
            table: table.into(),
        }
    }

    /// Check if this is a "not found" resolution error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::TableNotFound(_)
                | Error::ColumnNotFound { .. }
                | Error::IdFieldsNotFound(_)
                | Error::SignalIdColumnNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::TableNotFound("ActiveMeasurements".to_string()).to_string(),
            "failed to find measurement table 'ActiveMeasurements'"
        );
        assert_eq!(
            Error::column_not_found("SignalType", "ActiveMeasurements").to_string(),
            "failed to find column 'SignalType' in table 'ActiveMeasurements'"
        );
        assert_eq!(
            Error::NoDataSet.to_string(),
            "cannot evaluate filter expression, no dataset has been defined"
        );
        assert_eq!(Error::DivisionByZero.to_string(), "division by zero");
    }

    #[test]
    fn test_error_helpers() {
        let err = Error::parse("unexpected token ')'");
        assert!(err.to_string().contains("unexpected token ')'"));

        let err = Error::evaluation("cannot compare String with Int32");
        assert!(err.to_string().contains("cannot compare String with Int32"));
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::TableNotFound("t".to_string()).is_not_found());
        assert!(Error::IdFieldsNotFound("t".to_string()).is_not_found());
        assert!(!Error::NoDataSet.is_not_found());
        assert!(!Error::parse("x").is_not_found());
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(
            Error::RowWidthMismatch {
                expected: 5,
                got: 3
            },
            Error::RowWidthMismatch {
                expected: 5,
                got: 3
            }
        );
        assert_ne!(Error::parse("a"), Error::parse("b"));
    }
}
